//! 拓扑描述
//!
//! 由 `crate::topo` 的构建函数填充；构建完成后只读。

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::BenchError;

use super::id::{LinkId, NodeId};
use super::link::Link;
use super::node::{Node, NodeKind};

/// 一次运行所用的拓扑：节点、无向链路以及邻接表
///
/// 反序列化经由 [`TopologyRepr`]：校验链路端点并重建邻接表。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "TopologyRepr")]
pub struct Topology {
    name: String,
    nodes: Vec<Node>,
    links: Vec<Link>,
    #[serde(skip)]
    adj: Vec<Vec<NodeId>>,
}

impl Topology {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 拓扑名（如 "Single Topology"），结果文件名由它派生
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 添加主机节点
    pub fn add_host(&mut self, name: impl Into<String>) -> NodeId {
        self.add_node(name.into(), NodeKind::Host)
    }

    /// 添加交换机节点
    pub fn add_switch(&mut self, name: impl Into<String>) -> NodeId {
        self.add_node(name.into(), NodeKind::Switch)
    }

    fn add_node(&mut self, name: String, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let index = self.nodes.iter().filter(|n| n.kind == kind).count() + 1;
        trace!(?id, %name, ?kind, index, "添加节点");
        self.nodes.push(Node {
            id,
            name,
            kind,
            index,
        });
        self.adj.push(Vec::new());
        id
    }

    /// 连接两个节点（无向链路）
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> LinkId {
        assert!(a != b, "self-loop on {a:?}");
        assert!(
            a.0 < self.nodes.len() && b.0 < self.nodes.len(),
            "connect on unknown node {a:?} <-> {b:?}"
        );
        let id = LinkId(self.links.len());
        self.links.push(Link { id, a, b });
        self.adj[a.0].push(b);
        self.adj[b.0].push(a);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// 主机，按序号升序（添加顺序即序号顺序）
    pub fn hosts(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_host())
    }

    pub fn switches(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_switch())
    }

    pub fn host_count(&self) -> usize {
        self.hosts().count()
    }

    pub fn switch_count(&self) -> usize {
        self.switches().count()
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.adj[id.0]
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.adj[id.0].len()
    }

    fn rebuild_adjacency(&mut self) {
        self.adj = vec![Vec::new(); self.nodes.len()];
        for link in &self.links {
            self.adj[link.a.0].push(link.b);
            self.adj[link.b.0].push(link.a);
        }
    }

    /// 所有节点是否连通（空拓扑视为连通）
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.nodes.first() else {
            return true;
        };
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![first.id];
        seen[first.id.0] = true;
        while let Some(v) = stack.pop() {
            for &n in &self.adj[v.0] {
                if !seen[n.0] {
                    seen[n.0] = true;
                    stack.push(n);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }

    /// 连通且无环（即一棵树）
    pub fn is_tree(&self) -> bool {
        self.is_connected() && self.links.len() + 1 == self.nodes.len()
    }
}

/// 序列化形式（不含邻接表）
#[derive(Deserialize)]
struct TopologyRepr {
    name: String,
    nodes: Vec<Node>,
    links: Vec<Link>,
}

impl TryFrom<TopologyRepr> for Topology {
    type Error = BenchError;

    fn try_from(repr: TopologyRepr) -> Result<Self, Self::Error> {
        if let Some(node) = repr.nodes.iter().enumerate().find(|(i, n)| n.id.0 != *i) {
            return Err(BenchError::Config(format!(
                "node {:?} is out of order at position {}",
                node.1.id, node.0
            )));
        }
        let n = repr.nodes.len();
        if let Some(link) = repr
            .links
            .iter()
            .find(|l| l.a == l.b || l.a.0 >= n || l.b.0 >= n)
        {
            return Err(BenchError::Config(format!(
                "link {:?} has invalid endpoints {:?} <-> {:?}",
                link.id, link.a, link.b
            )));
        }

        let mut topo = Self {
            name: repr.name,
            nodes: repr.nodes,
            links: repr.links,
            adj: Vec::new(),
        };
        topo.rebuild_adjacency();
        Ok(topo)
    }
}
