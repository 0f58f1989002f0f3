//! 链路类型

use serde::{Deserialize, Serialize};

use super::id::{LinkId, NodeId};

/// 无向链路（仿真器实例化时会变成一对 veth）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub a: NodeId,
    pub b: NodeId,
}

impl Link {
    /// 给定一端，返回另一端；`node` 不在链路上时返回 `None`
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}
