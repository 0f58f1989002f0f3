//! 连通性检查
//!
//! 扫描前对每个有序主机对 ping 一次，统计丢包比例。

use tracing::{info, warn};

use crate::parse::parse_ping_counts;
use crate::registry::HostRegistry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingAllReport {
    pub sent: u32,
    pub received: u32,
}

impl PingAllReport {
    pub fn dropped(&self) -> u32 {
        self.sent - self.received
    }

    /// 丢包百分比（0..=100）
    pub fn dropped_pct(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        f64::from(self.dropped()) * 100.0 / f64::from(self.sent)
    }
}

/// 每个有序主机对 `ping -c 1 -W 1` 一次
pub fn ping_all(registry: &HostRegistry<'_>, ping: &str) -> PingAllReport {
    let mut report = PingAllReport::default();
    for src in registry.hosts() {
        for dst in registry.hosts() {
            if src.name() == dst.name() {
                continue;
            }
            report.sent += 1;
            let cmd = format!("{ping} -c 1 -W 1 {}", dst.ip());
            let ok = src
                .cmd(&cmd)
                .ok()
                .and_then(|out| parse_ping_counts(&out))
                .is_some_and(|(_, received)| received > 0);
            if ok {
                report.received += 1;
            } else {
                warn!(src = src.name(), dst = dst.name(), "ping 不通");
            }
        }
    }
    info!(
        sent = report.sent,
        received = report.received,
        dropped_pct = report.dropped_pct(),
        "🔌 连通性检查完成"
    );
    report
}
