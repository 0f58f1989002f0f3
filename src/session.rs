//! 一次完整运行
//!
//! 连通性检查、两轮扫描、写结果文件，然后可选进入控制台。
//! 结果文件写入之后，控制台的任何错误都只记录日志，不影响本次运行的结果。

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::warn;

use crate::config::RunConfig;
use crate::connectivity::ping_all;
use crate::emu::Network;
use crate::error::Result;
use crate::registry::HostRegistry;
use crate::report;
use crate::shell::run_shell;
use crate::sweep::Orchestrator;

/// 在已实例化的网络上跑完一次测量，返回结果文件路径
pub fn run_session<R: BufRead, W: Write>(
    net: &dyn Network,
    cfg: &RunConfig,
    shell: Option<(R, W)>,
) -> Result<PathBuf> {
    let registry = HostRegistry::resolve(net)?;
    if cfg.pingall {
        ping_all(&registry, &cfg.trial.ping);
    }

    let summary = Orchestrator::new(&registry, cfg).run(net.topology().name())?;
    let path = report::persist(&summary, &cfg.out_dir)?;

    if let Some((input, output)) = shell {
        if let Err(e) = run_shell(net, &cfg.trial.ping, input, output) {
            warn!(error = %e, path = %path.display(), "控制台异常退出，结果已写入");
        }
    }
    Ok(path)
}
