//! 拓扑结构描述
//!
//! 此模块只描述主机、交换机与链路的结构（id 与连接关系），
//! 不涉及任何实例化副作用；实例化交给 `crate::emu`。

mod id;
mod link;
mod node;
#[cfg(test)]
mod routing;
mod topology;

pub use id::{LinkId, NodeId};
pub use link::Link;
pub use node::{Node, NodeKind};
#[cfg(test)]
pub(crate) use routing::shortest_paths;
pub use topology::Topology;
