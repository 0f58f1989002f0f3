//! 运行配置
//!
//! 替代交互式全局状态：一次运行的全部参数集中在 [`RunConfig`] 中，
//! 可由 JSON 文件提供，再被命令行参数覆盖。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};
use crate::topo::{TopoOpts, TopologyKind};

/// 定点扫描的请求包数（升序）。
///
/// 注意这只是时间预算标签：UDP 发送时长按 `count / 5` 秒计算，
/// 实际发送的包数并不保证等于该值。
pub const PACKET_COUNTS: [u32; 6] = [5, 10, 20, 30, 50, 100];

/// iperf 默认端口
pub const DEFAULT_PORT: u16 = 5001;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// 未设置时由交互菜单选择
    pub topology: Option<TopologyKind>,
    /// Single 拓扑主机数
    pub single_hosts: usize,
    /// 结果 JSON 输出目录
    pub out_dir: PathBuf,
    pub pair: PairPolicy,
    pub miss_policy: MissPolicy,
    pub packet_counts: Vec<u32>,
    /// 扫描前是否做一次全互 ping 连通性检查
    pub pingall: bool,
    pub trial: TrialConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            topology: None,
            single_hosts: 4,
            out_dir: PathBuf::from("."),
            pair: PairPolicy::Auto,
            miss_policy: MissPolicy::Exclude,
            packet_counts: PACKET_COUNTS.to_vec(),
            pingall: true,
            trial: TrialConfig::default(),
        }
    }
}

impl RunConfig {
    /// 从 JSON 文件读取；缺省字段取默认值
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| BenchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: RunConfig = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.single_hosts < 2 {
            return Err(BenchError::Config(format!(
                "single_hosts must be >= 2, got {}",
                self.single_hosts
            )));
        }
        if self.packet_counts.is_empty() {
            return Err(BenchError::Config("packet_counts is empty".into()));
        }
        if self.packet_counts.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BenchError::Config(format!(
                "packet_counts must be strictly ascending: {:?}",
                self.packet_counts
            )));
        }
        if self.trial.port == 0 {
            return Err(BenchError::Config("port must be non-zero".into()));
        }
        Ok(())
    }

    pub fn topo_opts(&self) -> TopoOpts {
        TopoOpts {
            single_hosts: self.single_hosts,
        }
    }
}

/// 定点扫描使用的主机对
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairPolicy {
    /// 16 台及以上主机取首尾，否则取前两台
    Auto,
    FirstSecond,
    FirstLast,
}

/// 带宽解析未命中时如何参与最小/最大值统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// 不参与统计
    Exclude,
    /// 按 0.0 Gbit/s 参与统计
    Zero,
}

/// TCP 带宽试验的传输方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandwidthMode {
    /// 固定时长（`-t <duration_secs>`）
    Duration,
    /// 固定字节数（`-n <transfer_size>`）
    Bytes,
}

/// 服务端就绪等待方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Readiness {
    /// 固定等待
    Settle { ms: u64 },
    /// 在目的主机上用 `ss` 轮询监听端口，最多 `attempts` 次
    Poll { attempts: u32, interval_ms: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    pub iperf: String,
    pub ping: String,
    pub port: u16,
    pub bandwidth_mode: BandwidthMode,
    pub duration_secs: u64,
    pub transfer_size: String,
    /// UDP 目标速率（iperf `-b`）
    pub udp_rate: String,
    /// UDP 负载大小（iperf `-l`）
    pub payload_bytes: u32,
    pub readiness: Readiness,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            iperf: "iperf".into(),
            ping: "ping".into(),
            port: DEFAULT_PORT,
            bandwidth_mode: BandwidthMode::Duration,
            duration_secs: 3,
            transfer_size: "2G".into(),
            udp_rate: "10M".into(),
            payload_bytes: 1400,
            readiness: Readiness::Poll {
                attempts: 20,
                interval_ms: 100,
            },
        }
    }
}
