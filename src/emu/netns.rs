//! 基于 Linux network namespace 的仿真器
//!
//! 每个主机、每个交换机各占一个 namespace：
//! - 交换机 namespace 内建一个 Linux bridge（`br0`）
//! - 每条链路是一对 veth，两端分别移入对应 namespace；
//!   交换机一端挂到 `br0`，主机一端配置 `10.0.0.<序号>/8`
//!
//! 三种拓扑都无环，因此不需要开启 STP。需要 root 或免密 sudo。

use std::net::{IpAddr, Ipv4Addr};
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use super::{Background, Emulator, Endpoint, Network};
use crate::error::{BenchError, Result};
use crate::net::{NodeId, NodeKind, Topology};

const BRIDGE: &str = "br0";
const TERM_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct NetnsOpts {
    /// namespace 名前缀，避免与系统中已有 namespace 冲突
    pub prefix: String,
    /// 是否经由 `sudo` 执行 `ip` / `kill`
    pub sudo: bool,
}

impl Default for NetnsOpts {
    fn default() -> Self {
        Self {
            prefix: "sdnb-".into(),
            sudo: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct NetnsEmulator {
    opts: NetnsOpts,
}

impl NetnsEmulator {
    pub fn new(opts: NetnsOpts) -> Self {
        Self { opts }
    }
}

impl Emulator for NetnsEmulator {
    #[tracing::instrument(skip_all, fields(topology = topo.name()))]
    fn instantiate(&self, topo: &Topology) -> Result<Box<dyn Network>> {
        info!(
            hosts = topo.host_count(),
            switches = topo.switch_count(),
            links = topo.links().len(),
            "🏗️  实例化拓扑"
        );

        // 先构造出网络对象，任何一步失败时由 Drop 清理已创建的 namespace
        let mut net = NetnsNetwork {
            topo: topo.clone(),
            hosts: Vec::new(),
            namespaces: Vec::new(),
            runner: Runner {
                sudo: self.opts.sudo,
            },
            stopped: false,
        };

        for node in topo.nodes() {
            let ns = format!("{}{}", self.opts.prefix, node.name);
            net.add_namespace(&ns)?;
            if node.kind == NodeKind::Switch {
                net.runner
                    .checked(&["ip", "-n", &ns, "link", "add", BRIDGE, "type", "bridge"])?;
                net.runner
                    .checked(&["ip", "-n", &ns, "link", "set", BRIDGE, "up"])?;
            }
        }

        let tag = std::process::id() % 10_000;
        for link in topo.links() {
            let a_if = format!("sb{tag}l{}a", link.id.0);
            let b_if = format!("sb{tag}l{}b", link.id.0);
            // 清理残留（幂等）
            let _ = net.runner.run(&["ip", "link", "del", &a_if]);
            net.runner.checked(&[
                "ip", "link", "add", &a_if, "type", "veth", "peer", "name", &b_if,
            ])?;
            net.attach(&self.opts.prefix, link.a, &a_if)?;
            net.attach(&self.opts.prefix, link.b, &b_if)?;
            trace!(link = link.id.0, a = %a_if, b = %b_if, "veth 已连接");
        }

        for host in topo.hosts() {
            net.hosts.push(NetnsHost {
                name: host.name.clone(),
                ns: format!("{}{}", self.opts.prefix, host.name),
                ip: host_ip(host.index),
                runner: net.runner,
            });
        }

        info!("✅ 拓扑已实例化");
        Ok(Box::new(net))
    }
}

/// 第 `index` 台主机（从 1 开始）的地址
pub fn host_ip(index: usize) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(
        10,
        0,
        ((index >> 8) & 0xff) as u8,
        (index & 0xff) as u8,
    ))
}

pub struct NetnsNetwork {
    topo: Topology,
    hosts: Vec<NetnsHost>,
    namespaces: Vec<String>,
    runner: Runner,
    stopped: bool,
}

impl NetnsNetwork {
    fn add_namespace(&mut self, ns: &str) -> Result<()> {
        // 清理同名残留（幂等）
        let _ = self.runner.run(&["ip", "netns", "del", ns]);
        self.runner.checked(&["ip", "netns", "add", ns])?;
        self.namespaces.push(ns.to_string());
        // loopback 尽力而为
        let _ = self.runner.run(&["ip", "-n", ns, "link", "set", "lo", "up"]);
        debug!(ns, "创建 namespace");
        Ok(())
    }

    /// 把 veth 一端移入节点所在 namespace 并完成配置
    fn attach(&self, prefix: &str, node: NodeId, iface: &str) -> Result<()> {
        let node = self.topo.node(node);
        let ns = format!("{prefix}{}", node.name);
        self.runner
            .checked(&["ip", "link", "set", iface, "netns", &ns])?;
        match node.kind {
            NodeKind::Switch => {
                self.runner
                    .checked(&["ip", "-n", &ns, "link", "set", iface, "master", BRIDGE])?;
            }
            NodeKind::Host => {
                let addr = format!("{}/8", host_ip(node.index));
                self.runner
                    .checked(&["ip", "-n", &ns, "addr", "add", &addr, "dev", iface])?;
            }
        }
        self.runner
            .checked(&["ip", "-n", &ns, "link", "set", iface, "up"])?;
        Ok(())
    }
}

impl Network for NetnsNetwork {
    fn topology(&self) -> &Topology {
        &self.topo
    }

    fn host(&self, name: &str) -> Option<&dyn Endpoint> {
        self.hosts
            .iter()
            .find(|h| h.name == name)
            .map(|h| h as &dyn Endpoint)
    }

    fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        info!(namespaces = self.namespaces.len(), "🧹 拆除网络");
        // 删除 namespace 会一并销毁其中的 veth 与 bridge
        let mut first_err = None;
        for ns in self.namespaces.drain(..).rev() {
            if let Err(e) = self.runner.checked(&["ip", "netns", "del", &ns]) {
                warn!(%ns, error = %e, "删除 namespace 失败");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl Drop for NetnsNetwork {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "drop 时拆除网络失败");
        }
    }
}

pub struct NetnsHost {
    name: String,
    ns: String,
    ip: IpAddr,
    runner: Runner,
}

impl Endpoint for NetnsHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn ip(&self) -> IpAddr {
        self.ip
    }

    fn cmd(&self, command: &str) -> Result<String> {
        trace!(host = %self.name, command, "执行命令");
        let output = self
            .runner
            .run(&["ip", "netns", "exec", &self.ns, "sh", "-c", command])
            .map_err(|e| self.invocation_error(command, e.to_string()))?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() && stdout.trim().is_empty() {
            return Err(self.invocation_error(
                command,
                format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(stdout)
    }

    fn spawn(&self, command: &str) -> Result<Box<dyn Background>> {
        let mut cmd = self
            .runner
            .command(&["ip", "netns", "exec", &self.ns, "sh", "-c", command]);
        // 独立进程组，终止时连同 sh 的子进程一起发信号
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0);
        let child = cmd
            .spawn()
            .map_err(|e| self.invocation_error(command, e.to_string()))?;
        debug!(host = %self.name, command, pid = child.id(), "后台进程已启动");
        Ok(Box::new(NetnsProcess {
            child,
            label: format!("{command} on {}", self.name),
            runner: self.runner,
            done: false,
        }))
    }
}

impl NetnsHost {
    fn invocation_error(&self, command: &str, reason: String) -> BenchError {
        BenchError::ToolInvocation {
            host: self.name.clone(),
            command: command.to_string(),
            reason,
        }
    }
}

/// namespace 内的后台进程
pub struct NetnsProcess {
    child: Child,
    label: String,
    runner: Runner,
    done: bool,
}

impl Background for NetnsProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.child.id())
    }

    fn terminate(&mut self) -> Result<()> {
        if self.done {
            return Ok(());
        }
        self.done = true;

        if self.child.try_wait()?.is_some() {
            return Ok(());
        }

        let group = format!("-{}", self.child.id());
        let _ = self.runner.run(&["kill", "-TERM", "--", &group]);

        let deadline = Instant::now() + TERM_GRACE;
        while Instant::now() < deadline {
            if self.child.try_wait()?.is_some() {
                debug!(label = %self.label, "后台进程已退出");
                return Ok(());
            }
            thread::sleep(Duration::from_millis(50));
        }

        warn!(label = %self.label, "SIGTERM 超时，改用 SIGKILL");
        let _ = self.runner.run(&["kill", "-KILL", "--", &group]);
        self.child.wait()?;
        Ok(())
    }
}

/// 统一处理是否加 `sudo` 前缀
#[derive(Debug, Clone, Copy)]
struct Runner {
    sudo: bool,
}

impl Runner {
    fn command(&self, args: &[&str]) -> Command {
        let (program, rest) = if self.sudo {
            ("sudo", args)
        } else {
            (args[0], &args[1..])
        };
        let mut cmd = Command::new(program);
        cmd.args(rest);
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        self.command(args)
            .output()
            .map_err(|e| BenchError::Emulator(format!("{}: {e}", args.join(" "))))
    }

    /// 退出码非零时带上 stderr 报错
    fn checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(BenchError::Emulator(format!(
                "command failed: {}\n{}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output)
    }
}
