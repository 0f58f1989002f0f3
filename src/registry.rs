//! 主机注册表
//!
//! 拓扑实例化之后，把符号主机名解析为可执行命令的端点，
//! 并保持主机序号的升序，供扫描按 i < j 遍历。

use crate::emu::{Endpoint, Network};
use crate::error::{BenchError, Result};

pub struct HostRegistry<'a> {
    hosts: Vec<&'a dyn Endpoint>,
}

impl<'a> HostRegistry<'a> {
    /// 按拓扑中的主机顺序解析全部主机；任何主机缺失都视为仿真器错误
    pub fn resolve(net: &'a dyn Network) -> Result<Self> {
        let hosts = net
            .topology()
            .hosts()
            .map(|h| {
                net.host(&h.name)
                    .ok_or_else(|| BenchError::UnknownHost(h.name.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(hosts = hosts.len(), "主机解析完成");
        Ok(Self { hosts })
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// 升序的全部主机
    pub fn hosts(&self) -> &[&'a dyn Endpoint] {
        &self.hosts
    }

    /// 按名字查找
    pub fn get(&self, name: &str) -> Result<&'a dyn Endpoint> {
        self.hosts
            .iter()
            .copied()
            .find(|h| h.name() == name)
            .ok_or_else(|| BenchError::UnknownHost(name.to_string()))
    }

    /// 按 1 起始的序号查找
    pub fn nth(&self, index: usize) -> Option<&'a dyn Endpoint> {
        index.checked_sub(1).and_then(|i| self.hosts.get(i)).copied()
    }

    pub fn first(&self) -> Option<&'a dyn Endpoint> {
        self.hosts.first().copied()
    }

    pub fn last(&self) -> Option<&'a dyn Endpoint> {
        self.hosts.last().copied()
    }
}
