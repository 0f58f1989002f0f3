//! 标识符类型
//!
//! 定义拓扑描述中节点和链路的唯一标识符。

use serde::{Deserialize, Serialize};

/// 节点标识符（在拓扑内按添加顺序分配）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// 链路标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub usize);
