//! 工具输出解析
//!
//! 把 iperf / ping 的控制台文本转成数值。所有函数都是全函数：
//! 空输入、格式不符都返回 `None`，不会 panic。

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static BANDWIDTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s+([GM])bits/sec").expect("bandwidth regex")
});

static RTT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:rtt|round-trip)\s+min/avg/max(?:/(?:mdev|stddev))?\s*=\s*([0-9.]+)/([0-9.]+)/([0-9.]+)",
    )
    .expect("rtt regex")
});

static RECEIVED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s+packets transmitted,\s+(\d+)\s+(?:packets\s+)?received")
        .expect("received regex")
});

/// 带宽样本，统一为 Gbit/s
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Bandwidth {
    pub gbits_per_sec: f64,
}

impl Bandwidth {
    pub const UNIT: &'static str = "Gbit/s";

    pub fn from_gbits(gbits_per_sec: f64) -> Self {
        Self { gbits_per_sec }
    }
}

/// ping 的往返时延统计（毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RttStats {
    pub min_ms: f64,
    pub max_ms: f64,
}

/// 提取 `<float> <Gbits|Mbits>/sec`。
///
/// iperf 在汇总行之前可能打印逐区间的行，取最后一次出现的值。
/// Mbits 除以 1000 归一化为 Gbit/s。
pub fn parse_bandwidth(text: &str) -> Option<Bandwidth> {
    let caps = BANDWIDTH_RE.captures_iter(text).last()?;
    let value: f64 = caps[1].parse().ok()?;
    let gbits = match &caps[2] {
        "G" => value,
        "M" => value / 1000.0,
        _ => return None,
    };
    Some(Bandwidth::from_gbits(gbits))
}

/// 提取 `rtt min/avg/max/mdev = a/b/c/d` 中的 min 与 max
pub fn parse_rtt(text: &str) -> Option<RttStats> {
    let caps = RTT_RE.captures(text)?;
    let min_ms: f64 = caps[1].parse().ok()?;
    let max_ms: f64 = caps[3].parse().ok()?;
    Some(RttStats { min_ms, max_ms })
}

/// 提取 ping 汇总行中的 (transmitted, received)
pub fn parse_ping_counts(text: &str) -> Option<(u32, u32)> {
    let caps = RECEIVED_RE.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// 保留两位小数
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
