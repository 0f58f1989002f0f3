//! 测试用的内存仿真器：记录每次调用，按脚本返回工具输出。

use std::cell::RefCell;
use std::net::IpAddr;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{Readiness, RunConfig};
use crate::emu::netns::host_ip;
use crate::emu::{Background, Endpoint, Network};
use crate::error::Result;
use crate::net::Topology;

type Script = Rc<dyn Fn(&str, &str) -> Result<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Cmd { host: String, command: String },
    Spawn { host: String, command: String },
    Kill { host: String, command: String },
}

impl Call {
    pub(crate) fn command(&self) -> &str {
        match self {
            Call::Cmd { command, .. } | Call::Spawn { command, .. } | Call::Kill { command, .. } => {
                command
            }
        }
    }

    pub(crate) fn host(&self) -> &str {
        match self {
            Call::Cmd { host, .. } | Call::Spawn { host, .. } | Call::Kill { host, .. } => host,
        }
    }
}

pub(crate) struct FakeNetwork {
    topo: Topology,
    hosts: Vec<FakeHost>,
    log: Rc<RefCell<Vec<Call>>>,
}

impl FakeNetwork {
    /// `script(host, command)` 决定每条同步命令的输出
    pub(crate) fn new(topo: Topology, script: impl Fn(&str, &str) -> Result<String> + 'static) -> Self {
        let script: Script = Rc::new(script);
        let log = Rc::new(RefCell::new(Vec::new()));
        let hosts = topo
            .hosts()
            .map(|h| FakeHost {
                name: h.name.clone(),
                ip: host_ip(h.index),
                script: Rc::clone(&script),
                log: Rc::clone(&log),
            })
            .collect();
        Self {
            topo,
            hosts,
            log,
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    /// 同步命令中以 `prefix` 开头的那些
    pub(crate) fn cmds_starting_with(&self, prefix: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Cmd { .. }) && c.command().starts_with(prefix))
            .collect()
    }
}

impl Network for FakeNetwork {
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
        Ok(())
    }
}

struct FakeHost {
    name: String,
    ip: IpAddr,
    script: Script,
    log: Rc<RefCell<Vec<Call>>>,
}

impl Endpoint for FakeHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn ip(&self) -> IpAddr {
        self.ip
    }

    fn cmd(&self, command: &str) -> Result<String> {
        self.log.borrow_mut().push(Call::Cmd {
            host: self.name.clone(),
            command: command.to_string(),
        });
        (self.script)(&self.name, command)
    }

    fn spawn(&self, command: &str) -> Result<Box<dyn Background>> {
        self.log.borrow_mut().push(Call::Spawn {
            host: self.name.clone(),
            command: command.to_string(),
        });
        Ok(Box::new(FakeProcess {
            host: self.name.clone(),
            command: command.to_string(),
            log: Rc::clone(&self.log),
            done: false,
        }))
    }
}

struct FakeProcess {
    host: String,
    command: String,
    log: Rc<RefCell<Vec<Call>>>,
    done: bool,
}

impl Background for FakeProcess {
    fn pid(&self) -> Option<u32> {
        None
    }

    fn terminate(&mut self) -> Result<()> {
        if !self.done {
            self.done = true;
            self.log.borrow_mut().push(Call::Kill {
                host: self.host.clone(),
                command: self.command.clone(),
            });
        }
        Ok(())
    }
}

/// 不等待、不做连通性检查的配置
pub(crate) fn test_config() -> RunConfig {
    let mut cfg = RunConfig::default();
    cfg.trial.readiness = Readiness::Settle { ms: 0 };
    cfg.pingall = false;
    cfg
}

pub(crate) fn iperf_tcp_output(dst: &str, value: &str, unit: &str) -> String {
    format!(
        "------------------------------------------------------------\n\
         Client connecting to {dst}, TCP port 5001\n\
         TCP window size: 85.0 KByte (default)\n\
         ------------------------------------------------------------\n\
         [  3] local 10.0.0.1 port 52344 connected with {dst} port 5001\n\
         [ ID] Interval       Transfer     Bandwidth\n\
         [  3]  0.0- 3.0 sec  3.29 GBytes  {value} {unit}/sec\n"
    )
}

pub(crate) fn iperf_udp_output(dst: &str) -> String {
    format!(
        "------------------------------------------------------------\n\
         Client connecting to {dst}, UDP port 5001\n\
         Sending 1400 byte datagrams, IPG target: 1120.00 us (kalman adjust)\n\
         ------------------------------------------------------------\n\
         [  3]  0.0- 4.0 sec  4.77 MBytes  10.0 Mbits/sec\n\
         [  3] Sent 3572 datagrams\n"
    )
}

pub(crate) fn ping_output(dst: &str, count: u32, min: f64, max: f64) -> String {
    format!(
        "PING {dst} ({dst}) 56(84) bytes of data.\n\
         64 bytes from {dst}: icmp_seq=1 ttl=64 time={min} ms\n\
         \n\
         --- {dst} ping statistics ---\n\
         {count} packets transmitted, {count} received, 0% packet loss, time 4005ms\n\
         rtt min/avg/max/mdev = {min:.3}/{avg:.3}/{max:.3}/0.012 ms\n",
        avg = (min + max) / 2.0
    )
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "sdn-bench-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}
