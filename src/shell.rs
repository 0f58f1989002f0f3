//! 交互式控制台
//!
//! 扫描结束后可选进入。每行一条命令：
//! - `<host> <command...>`：在该主机上执行，命令中的其他主机名替换为其 IP
//! - `nodes`：列出节点
//! - `pingall`：连通性检查
//! - `help` / `exit` / `quit`

use std::io::{BufRead, Write};

use crate::connectivity::ping_all;
use crate::emu::Network;
use crate::error::Result;
use crate::registry::HostRegistry;

const PROMPT: &str = "sdn-bench> ";

/// 运行控制台直到 `exit` 或输入结束
pub fn run_shell<R: BufRead, W: Write>(
    net: &dyn Network,
    ping: &str,
    input: R,
    mut output: W,
) -> Result<()> {
    let registry = HostRegistry::resolve(net)?;
    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        let mut words = line.split_whitespace();
        match words.next() {
            None => {}
            Some("exit" | "quit") => break,
            Some("help") => {
                writeln!(output, "commands: <host> <cmd...> | nodes | pingall | exit")?;
            }
            Some("nodes") => {
                let names: Vec<&str> = net
                    .topology()
                    .nodes()
                    .iter()
                    .map(|n| n.name.as_str())
                    .collect();
                writeln!(output, "available nodes are:\n{}", names.join(" "))?;
            }
            Some("pingall") => {
                let report = ping_all(&registry, ping);
                writeln!(
                    output,
                    "*** Results: {:.0}% dropped ({}/{} received)",
                    report.dropped_pct(),
                    report.received,
                    report.sent
                )?;
            }
            Some(host) => match registry.get(host) {
                Ok(endpoint) => {
                    let command = substitute_hosts(&registry, words);
                    match endpoint.cmd(&command) {
                        Ok(out) => write!(output, "{out}")?,
                        Err(e) => writeln!(output, "*** {e}")?,
                    }
                }
                Err(_) => writeln!(output, "*** Unknown command: {line}")?,
            },
        }
        write!(output, "{PROMPT}")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}

/// 把命令中的主机名单词替换成对应 IP
fn substitute_hosts<'w>(
    registry: &HostRegistry<'_>,
    words: impl Iterator<Item = &'w str>,
) -> String {
    words
        .map(|w| match registry.get(w) {
            Ok(host) => host.ip().to_string(),
            Err(_) => w.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
