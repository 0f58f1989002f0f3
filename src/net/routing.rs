//! 最短路径统计
//!
//! 在无向拓扑上做 BFS，同时累计等价最短路径条数。
//! 只用于检查拓扑形状（例如树形拓扑跨分支只经过核心交换机一条路），
//! 实际转发由仿真器的交换机负责。

use std::collections::VecDeque;

use super::id::NodeId;
use super::topology::Topology;

/// `src` 到 `dst` 的最短路径信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    /// 最短路径的链路数
    pub hops: usize,
    /// 等价最短路径的条数
    pub count: u64,
    /// 按节点 id 最小的前驱回溯出的一条代表路径（含两端）
    pub path: Vec<NodeId>,
}

/// 计算 `src` 到 `dst` 的最短路径；不可达时返回 `None`
pub fn shortest_paths(topo: &Topology, src: NodeId, dst: NodeId) -> Option<ShortestPaths> {
    let n = topo.nodes().len();
    let mut dist = vec![usize::MAX; n];
    let mut count = vec![0_u64; n];
    let mut pred: Vec<Option<NodeId>> = vec![None; n];
    let mut q = VecDeque::new();

    dist[src.0] = 0;
    count[src.0] = 1;
    q.push_back(src);

    while let Some(v) = q.pop_front() {
        let dv = dist[v.0];
        for &nb in topo.neighbors(v) {
            if dist[nb.0] == usize::MAX {
                dist[nb.0] = dv + 1;
                count[nb.0] = count[v.0];
                pred[nb.0] = Some(v);
                q.push_back(nb);
            } else if dist[nb.0] == dv + 1 {
                count[nb.0] = count[nb.0].saturating_add(count[v.0]);
                if pred[nb.0].is_none_or(|p| v < p) {
                    pred[nb.0] = Some(v);
                }
            }
        }
    }

    if dist[dst.0] == usize::MAX {
        return None;
    }

    let mut path = vec![dst];
    let mut cur = dst;
    while let Some(p) = pred[cur.0] {
        path.push(p);
        cur = p;
    }
    path.reverse();

    Some(ShortestPaths {
        hops: dist[dst.0],
        count: count[dst.0],
        path,
    })
}
