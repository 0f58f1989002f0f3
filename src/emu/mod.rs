//! 网络仿真器能力接口
//!
//! 测量逻辑只通过这几个 trait 使用仿真器：实例化拓扑、按名取主机、
//! 在主机上执行命令（同步取回标准输出，或后台启动）以及拆除网络。
//! [`netns`] 提供基于 Linux network namespace 的实现。

pub mod netns;

use std::net::IpAddr;

use crate::error::Result;
use crate::net::Topology;

pub use netns::{NetnsEmulator, NetnsOpts};

/// 后台进程句柄（例如 iperf 服务端）
pub trait Background {
    /// 进程号（若有）
    fn pid(&self) -> Option<u32>;

    /// 终止进程；重复调用应当无副作用
    fn terminate(&mut self) -> Result<()>;
}

/// 实例化后的主机：可寻址、可执行命令
pub trait Endpoint {
    fn name(&self) -> &str;

    fn ip(&self) -> IpAddr;

    /// 在主机上执行 shell 命令并返回标准输出文本
    fn cmd(&self, command: &str) -> Result<String>;

    /// 在主机上后台启动 shell 命令
    fn spawn(&self, command: &str) -> Result<Box<dyn Background>>;
}

/// 运行中的网络
pub trait Network {
    fn topology(&self) -> &Topology;

    fn host(&self, name: &str) -> Option<&dyn Endpoint>;

    /// 拆除网络；重复调用应当无副作用
    fn stop(&mut self) -> Result<()>;
}

/// 仿真器：把拓扑描述变成运行中的网络
pub trait Emulator {
    fn instantiate(&self, topo: &Topology) -> Result<Box<dyn Network>>;
}
