//! 拓扑构建
//!
//! 三种固定形状：星形（Single）、链形（Linear）、两级树形（Tree）。
//! 构建函数是纯函数：同一输入总是得到命名一致、结构同构的描述。

pub mod linear;
pub mod single;
pub mod tree;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::net::Topology;

pub use linear::{LINEAR_HOSTS, build_linear};
pub use single::build_single;
pub use tree::{TREE_AGG_SWITCHES, TREE_HOSTS_PER_AGG, TreeLayout, build_tree};

/// 拓扑类型，每次运行选定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyKind {
    Single,
    Linear,
    Tree,
}

impl TopologyKind {
    pub const ALL: [TopologyKind; 3] = [TopologyKind::Single, TopologyKind::Linear, TopologyKind::Tree];

    /// 写入结果文件的拓扑名
    pub fn display_name(self) -> &'static str {
        match self {
            TopologyKind::Single => "Single Topology",
            TopologyKind::Linear => "Linear Topology",
            TopologyKind::Tree => "Tree Topology",
        }
    }

    /// 交互菜单里的编号（1..=3）
    pub fn menu_number(self) -> u8 {
        match self {
            TopologyKind::Single => 1,
            TopologyKind::Linear => 2,
            TopologyKind::Tree => 3,
        }
    }

    /// 解析交互菜单输入；只接受 "1" / "2" / "3"
    pub fn from_choice(choice: &str) -> Result<Self, BenchError> {
        match choice.trim() {
            "1" => Ok(TopologyKind::Single),
            "2" => Ok(TopologyKind::Linear),
            "3" => Ok(TopologyKind::Tree),
            other => Err(BenchError::InvalidTopologyKind(other.to_string())),
        }
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TopologyKind {
    type Err = BenchError;

    /// 接受名称（大小写不敏感）或菜单编号
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(TopologyKind::Single),
            "linear" => Ok(TopologyKind::Linear),
            "tree" => Ok(TopologyKind::Tree),
            other => TopologyKind::from_choice(other),
        }
    }
}

/// 拓扑构建选项
#[derive(Debug, Clone)]
pub struct TopoOpts {
    /// Single 拓扑的主机数（4 或 16，由调用方决定）
    pub single_hosts: usize,
}

impl Default for TopoOpts {
    fn default() -> Self {
        Self { single_hosts: 4 }
    }
}

/// 按类型构建拓扑描述
pub fn build(kind: TopologyKind, opts: &TopoOpts) -> Topology {
    let mut topo = Topology::new(kind.display_name());
    match kind {
        TopologyKind::Single => {
            build_single(&mut topo, opts.single_hosts);
        }
        TopologyKind::Linear => {
            build_linear(&mut topo, LINEAR_HOSTS);
        }
        TopologyKind::Tree => {
            build_tree(&mut topo);
        }
    }
    tracing::debug!(
        topology = topo.name(),
        hosts = topo.host_count(),
        switches = topo.switch_count(),
        links = topo.links().len(),
        "拓扑构建完成"
    );
    topo
}
