//! Linear（链形）拓扑构建

use crate::net::{NodeId, Topology};

/// Linear 拓扑的固定主机数
pub const LINEAR_HOSTS: usize = 16;

/// 构建链形拓扑
///
/// 拓扑结构：hi <-> si，si <-> s(i-1)（i > 1）；首尾不闭合。
/// 返回：主机 id（按序号升序）
pub fn build_linear(topo: &mut Topology, hosts: usize) -> Vec<NodeId> {
    let mut host_ids = Vec::with_capacity(hosts);
    let mut prev_switch: Option<NodeId> = None;

    for i in 1..=hosts {
        let host = topo.add_host(format!("h{i}"));
        let switch = topo.add_switch(format!("s{i}"));
        topo.connect(host, switch);
        if let Some(prev) = prev_switch {
            topo.connect(switch, prev);
        }
        prev_switch = Some(switch);
        host_ids.push(host);
    }

    host_ids
}
