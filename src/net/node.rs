//! 节点类型
//!
//! 拓扑中的节点只有两类：主机（测量端点）与交换机（纯连通性元素）。

use serde::{Deserialize, Serialize};

use super::id::NodeId;

/// 节点类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Host,
    Switch,
}

/// 拓扑节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// 同类节点内从 1 开始的序号（h1 -> 1, s3 -> 3）
    pub index: usize,
}

impl Node {
    pub fn is_host(&self) -> bool {
        self.kind == NodeKind::Host
    }

    pub fn is_switch(&self) -> bool {
        self.kind == NodeKind::Switch
    }
}
