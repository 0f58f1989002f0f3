//! Tree（两级树形）拓扑构建

use crate::net::{NodeId, Topology};

/// 汇聚交换机个数
pub const TREE_AGG_SWITCHES: usize = 4;
/// 每个汇聚交换机下挂的主机数
pub const TREE_HOSTS_PER_AGG: usize = 4;

/// 树形拓扑中各层节点的 id
#[derive(Debug, Clone)]
pub struct TreeLayout {
    pub core: NodeId,
    pub aggs: Vec<NodeId>,
    /// 按汇聚交换机顺序编号的主机（h1..h16）
    pub hosts: Vec<NodeId>,
}

#[cfg(test)]
impl TreeLayout {
    /// 第 `agg` 个汇聚交换机下的第 `host` 台主机（均从 0 开始）
    pub(crate) fn host(&self, agg: usize, host: usize) -> NodeId {
        self.hosts[agg * TREE_HOSTS_PER_AGG + host]
    }

    /// 主机所属分支（汇聚交换机下标）
    pub(crate) fn branch_of(&self, host: NodeId) -> Option<usize> {
        self.hosts
            .iter()
            .position(|&h| h == host)
            .map(|idx| idx / TREE_HOSTS_PER_AGG)
    }
}

/// 构建树形拓扑：核心 s1，汇聚 s2..s5，每个汇聚下挂 4 台主机
pub fn build_tree(topo: &mut Topology) -> TreeLayout {
    let core = topo.add_switch("s1");
    let mut aggs = Vec::with_capacity(TREE_AGG_SWITCHES);
    let mut hosts = Vec::with_capacity(TREE_AGG_SWITCHES * TREE_HOSTS_PER_AGG);

    for a in 0..TREE_AGG_SWITCHES {
        let agg = topo.add_switch(format!("s{}", a + 2));
        topo.connect(agg, core);
        for _ in 0..TREE_HOSTS_PER_AGG {
            let host = topo.add_host(format!("h{}", hosts.len() + 1));
            topo.connect(host, agg);
            hosts.push(host);
        }
        aggs.push(agg);
    }

    TreeLayout { core, aggs, hosts }
}
