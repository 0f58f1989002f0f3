//! Single（星形）拓扑构建

use crate::net::{NodeId, Topology};

/// 构建星形拓扑
///
/// 拓扑结构：h1..hN 全部直连唯一的交换机 s1
/// 返回：主机 id（按序号升序）
pub fn build_single(topo: &mut Topology, hosts: usize) -> Vec<NodeId> {
    let switch = topo.add_switch("s1");
    (1..=hosts)
        .map(|h| {
            let host = topo.add_host(format!("h{h}"));
            topo.connect(host, switch);
            host
        })
        .collect()
}
