//! 测量编排
//!
//! 两轮扫描，顺序固定：
//! 1. 全互带宽扫描：按 i < j 遍历所有无序主机对，每对一次 TCP 带宽试验；
//! 2. 定点扫描：固定一对主机，按请求包数升序，每个包数各做一次
//!    UDP 传输试验和一次 ping 试验。
//!
//! 两轮互不复用样本。所有试验串行执行。

use tracing::{debug, info};

use crate::config::{MissPolicy, PairPolicy, RunConfig};
use crate::emu::Endpoint;
use crate::error::{BenchError, Result};
use crate::parse::Bandwidth;
use crate::registry::HostRegistry;
use crate::report::SweepSummary;
use crate::trial::TrialRunner;

/// 一对主机的带宽试验结果
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseResult {
    pub src: String,
    pub dst: String,
    pub bandwidth: Option<Bandwidth>,
}

/// 定点扫描结果，三个序列与包数序列按位置对齐
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScaledResults {
    pub packet_counts: Vec<u32>,
    pub ptr: Vec<Option<f64>>,
    pub rtt_min: Vec<Option<f64>>,
    pub rtt_max: Vec<Option<f64>>,
}

/// 带宽极值（Gbit/s）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extremes {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// 最小值所在结果的下标（相等时保留先出现的）
    pub min_at: Option<usize>,
    pub max_at: Option<usize>,
}

/// 扫描全部结果求极值。
///
/// 使用严格比较，相等不更新，因此并列时保留遍历顺序中先出现的一项。
pub fn bandwidth_extremes(results: &[PairwiseResult], policy: MissPolicy) -> Extremes {
    let mut ext = Extremes::default();
    for (idx, r) in results.iter().enumerate() {
        let value = match (r.bandwidth, policy) {
            (Some(bw), _) => bw.gbits_per_sec,
            (None, MissPolicy::Zero) => 0.0,
            (None, MissPolicy::Exclude) => continue,
        };
        if ext.min.is_none_or(|m| value < m) {
            ext.min = Some(value);
            ext.min_at = Some(idx);
        }
        if ext.max.is_none_or(|m| value > m) {
            ext.max = Some(value);
            ext.max_at = Some(idx);
        }
    }
    ext
}

pub struct Orchestrator<'a> {
    registry: &'a HostRegistry<'a>,
    runner: TrialRunner<'a>,
    cfg: &'a RunConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a HostRegistry<'a>, cfg: &'a RunConfig) -> Self {
        Self {
            registry,
            runner: TrialRunner::new(&cfg.trial),
            cfg,
        }
    }

    /// 全互带宽扫描；单对失败不影响其余主机对
    pub fn all_pairs(&self) -> Vec<PairwiseResult> {
        let hosts = self.registry.hosts();
        let total = hosts.len() * hosts.len().saturating_sub(1) / 2;
        info!(pairs = total, "📶 开始全互带宽扫描");

        let mut results = Vec::with_capacity(total);
        for (i, src) in hosts.iter().enumerate() {
            for dst in &hosts[i + 1..] {
                let bandwidth = self.runner.bandwidth(*src, *dst);
                debug!(
                    src = src.name(),
                    dst = dst.name(),
                    gbits_per_sec = bandwidth.map(|b| b.gbits_per_sec),
                    done = results.len() + 1,
                    total,
                    "主机对完成"
                );
                results.push(PairwiseResult {
                    src: src.name().to_string(),
                    dst: dst.name().to_string(),
                    bandwidth,
                });
            }
        }
        results
    }

    /// 定点扫描使用的主机对
    pub fn fixed_pair(&self) -> Result<(&'a dyn Endpoint, &'a dyn Endpoint)> {
        let policy = match self.cfg.pair {
            PairPolicy::Auto if self.registry.len() >= 16 => PairPolicy::FirstLast,
            PairPolicy::Auto => PairPolicy::FirstSecond,
            other => other,
        };
        let src = self.registry.first();
        let dst = match policy {
            PairPolicy::FirstLast => self.registry.last(),
            _ => self.registry.nth(2),
        };
        match (src, dst) {
            (Some(src), Some(dst)) if src.name() != dst.name() => Ok((src, dst)),
            _ => Err(BenchError::Config(format!(
                "fixed-pair sweep needs at least 2 hosts, topology has {}",
                self.registry.len()
            ))),
        }
    }

    /// 定点扫描：每个包数依次做一次 UDP 传输和一次 ping
    pub fn scaled(&self, src: &dyn Endpoint, dst: &dyn Endpoint) -> ScaledResults {
        info!(
            src = src.name(),
            dst = dst.name(),
            counts = ?self.cfg.packet_counts,
            "⏱️  开始定点扫描"
        );
        let mut out = ScaledResults {
            packet_counts: self.cfg.packet_counts.clone(),
            ..ScaledResults::default()
        };
        for &count in &self.cfg.packet_counts {
            let ptr = self.runner.packet_transfer(src, dst, count);
            let rtt = self.runner.latency(src, dst, count);
            out.ptr.push(ptr);
            out.rtt_min.push(rtt.map(|r| r.min_ms));
            out.rtt_max.push(rtt.map(|r| r.max_ms));
        }
        out
    }

    /// 依次执行两轮扫描并汇总。定点主机对先解析，主机不足时不做任何试验。
    pub fn run(&self, topology: &str) -> Result<SweepSummary> {
        let (src, dst) = self.fixed_pair()?;

        let pairs = self.all_pairs();
        let ext = bandwidth_extremes(&pairs, self.cfg.miss_policy);
        if let (Some(lo), Some(hi)) = (ext.min_at, ext.max_at) {
            info!(
                min_pair = %format!("{}-{}", pairs[lo].src, pairs[lo].dst),
                max_pair = %format!("{}-{}", pairs[hi].src, pairs[hi].dst),
                min_gbits = ext.min,
                max_gbits = ext.max,
                "带宽扫描完成"
            );
        }

        let scaled = self.scaled(src, dst);

        Ok(SweepSummary {
            max_bandwidth: ext.max,
            min_bandwidth: ext.min,
            ptr: scaled.ptr,
            rtt_min: scaled.rtt_min,
            rtt_max: scaled.rtt_max,
            topology: topology.to_string(),
        })
    }
}
