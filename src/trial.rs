//! 单次试验
//!
//! 每个试验只调用一次外部工具并返回解析后的样本。工具调用失败、
//! 输出为空或解析未命中都返回 `None`，由上层决定如何统计。

use std::net::IpAddr;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::{BandwidthMode, Readiness, TrialConfig};
use crate::emu::{Background, Endpoint};
use crate::error::Result;
use crate::parse::{Bandwidth, RttStats, parse_bandwidth, parse_rtt, round2};

/// 服务端协议
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proto {
    Tcp,
    Udp,
}

/// 后台服务端的作用域守卫：离开作用域（成功、解析失败、提前返回）时终止进程
pub struct ServerGuard {
    process: Box<dyn Background>,
    label: String,
}

impl ServerGuard {
    pub fn new(process: Box<dyn Background>, label: impl Into<String>) -> Self {
        Self {
            process,
            label: label.into(),
        }
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        debug!(label = %self.label, pid = ?self.process.pid(), "终止后台服务端");
        if let Err(e) = self.process.terminate() {
            warn!(label = %self.label, error = %e, "终止后台服务端失败");
        }
    }
}

/// UDP 发送时长（秒）：`count / 5`，整数除法，至少 1 秒。
///
/// 这是按时间近似包数，并不保证真的发送 `count` 个包。
pub fn transfer_secs(count: u32) -> u32 {
    (count / 5).max(1)
}

pub struct TrialRunner<'a> {
    cfg: &'a TrialConfig,
}

impl<'a> TrialRunner<'a> {
    pub fn new(cfg: &'a TrialConfig) -> Self {
        Self { cfg }
    }

    pub fn server_command(&self, proto: Proto) -> String {
        match proto {
            Proto::Tcp => format!("{} -s -p {}", self.cfg.iperf, self.cfg.port),
            Proto::Udp => format!("{} -s -u -p {}", self.cfg.iperf, self.cfg.port),
        }
    }

    pub fn bandwidth_command(&self, dst: IpAddr) -> String {
        let amount = match self.cfg.bandwidth_mode {
            BandwidthMode::Duration => format!("-t {}", self.cfg.duration_secs),
            BandwidthMode::Bytes => format!("-n {}", self.cfg.transfer_size),
        };
        format!("{} -c {dst} -p {} {amount}", self.cfg.iperf, self.cfg.port)
    }

    pub fn packet_transfer_command(&self, dst: IpAddr, count: u32) -> String {
        format!(
            "{} -u -c {dst} -p {} -b {} -l {} -t {}",
            self.cfg.iperf,
            self.cfg.port,
            self.cfg.udp_rate,
            self.cfg.payload_bytes,
            transfer_secs(count)
        )
    }

    pub fn latency_command(&self, dst: IpAddr, count: u32) -> String {
        format!("{} -c {count} {dst}", self.cfg.ping)
    }

    /// TCP 带宽试验：目的端起服务端，源端起客户端
    #[tracing::instrument(skip_all, fields(src = src.name(), dst = dst.name()))]
    pub fn bandwidth(&self, src: &dyn Endpoint, dst: &dyn Endpoint) -> Option<Bandwidth> {
        let _server = self.start_server(dst, Proto::Tcp).ok()?;
        let out = invoke(src, &self.bandwidth_command(dst.ip()))?;
        let bw = parse_bandwidth(&out);
        match bw {
            Some(bw) => debug!(gbits_per_sec = bw.gbits_per_sec, "带宽样本"),
            None => warn!("iperf 输出中没有带宽值"),
        }
        bw
    }

    /// UDP 定速发送，返回客户端运行的墙钟时间（毫秒，两位小数）
    #[tracing::instrument(skip_all, fields(src = src.name(), dst = dst.name(), count = count))]
    pub fn packet_transfer(&self, src: &dyn Endpoint, dst: &dyn Endpoint, count: u32) -> Option<f64> {
        let _server = self.start_server(dst, Proto::Udp).ok()?;
        let cmd = self.packet_transfer_command(dst.ip(), count);
        let start = Instant::now();
        let out = invoke(src, &cmd);
        let elapsed_ms = round2(start.elapsed().as_secs_f64() * 1000.0);
        out?;
        debug!(elapsed_ms, "传输耗时");
        Some(elapsed_ms)
    }

    /// ping `count` 次，返回 RTT 最小/最大值
    #[tracing::instrument(skip_all, fields(src = src.name(), dst = dst.name(), count = count))]
    pub fn latency(&self, src: &dyn Endpoint, dst: &dyn Endpoint, count: u32) -> Option<RttStats> {
        let out = invoke(src, &self.latency_command(dst.ip(), count))?;
        let rtt = parse_rtt(&out);
        if rtt.is_none() {
            warn!("ping 输出中没有 rtt 统计");
        }
        rtt
    }

    fn start_server(&self, host: &dyn Endpoint, proto: Proto) -> Result<ServerGuard> {
        let cmd = self.server_command(proto);
        let process = host.spawn(&cmd).inspect_err(|e| {
            warn!(host = host.name(), error = %e, "服务端启动失败");
        })?;
        let guard = ServerGuard::new(process, format!("{cmd} on {}", host.name()));
        self.wait_ready(host, proto);
        Ok(guard)
    }

    /// 等待服务端开始监听。轮询耗尽时只告警，客户端失败会体现为缺失样本。
    fn wait_ready(&self, host: &dyn Endpoint, proto: Proto) {
        match self.cfg.readiness {
            Readiness::Settle { ms } => thread::sleep(Duration::from_millis(ms)),
            Readiness::Poll {
                attempts,
                interval_ms,
            } => {
                let probe = listen_probe_command(proto, self.cfg.port);
                for attempt in 1..=attempts {
                    if host.cmd(&probe).is_ok_and(|out| !out.trim().is_empty()) {
                        debug!(attempt, "服务端已就绪");
                        return;
                    }
                    thread::sleep(Duration::from_millis(interval_ms));
                }
                warn!(host = host.name(), attempts, "服务端未在轮询次数内就绪");
            }
        }
    }
}

/// 查询监听端口的 `ss` 命令；有输出即表示已监听
pub fn listen_probe_command(proto: Proto, port: u16) -> String {
    let flag = match proto {
        Proto::Tcp => "t",
        Proto::Udp => "u",
    };
    format!("ss -Hln{flag} 'sport = :{port}'")
}

/// 执行一次工具调用；失败或空输出返回 `None`
fn invoke(host: &dyn Endpoint, command: &str) -> Option<String> {
    match host.cmd(command) {
        Ok(out) if !out.trim().is_empty() => Some(out),
        Ok(_) => {
            warn!(host = host.name(), command, "工具输出为空");
            None
        }
        Err(e) => {
            warn!(host = host.name(), error = %e, "工具调用失败");
            None
        }
    }
}
