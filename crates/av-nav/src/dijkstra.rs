//! Shortest-path search over the road network.
//!
//! Standard Dijkstra with a binary-heap frontier.  Costs are cached link
//! distances in kilometres; ties break on `NodeId` so results are
//! deterministic.  The search exits as soon as the destination pops.
//!
//! The predecessor map records `(predecessor, speed_limit_of_link_used)`
//! per settled node.  Reconstruction walks it backward and re-derives each
//! hop's distance and bearing from the endpoint coordinates — the emitted
//! geometry comes from the geodesy layer, not from the stored link.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use av_core::NodeId;
use av_spatial::RoadNetwork;

use crate::Road;

// ── Frontier ordering ─────────────────────────────────────────────────────────

/// Heap entry ordered by cost, then `NodeId` for deterministic tie-breaks.
#[derive(PartialEq)]
struct FrontierEntry {
    cost_km: f64,
    node:    NodeId,
}

impl Eq for FrontierEntry {}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost_km
            .total_cmp(&other.cost_km)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Shortest path from `from` to `to` by total link distance.
///
/// Returns the ordered hop sequence, `Some(vec![])` when `from == to`, and
/// `None` when no path exists — absence is a result here, not a fault.
/// Endpoints unknown to the network route nowhere.
pub fn shortest_path(network: &RoadNetwork, from: NodeId, to: NodeId) -> Option<Vec<Road>> {
    if !network.contains(from) || !network.contains(to) {
        return None;
    }
    if from == to {
        return Some(Vec::new());
    }

    let n = network.node_count();
    // dist[v] = best known cost (km) to reach v.
    let mut dist = vec![f64::INFINITY; n];
    // prev[v] = (node we reached v from, speed limit of the link used).
    let mut prev: Vec<Option<(NodeId, u32)>> = vec![None; n];

    dist[from.index()] = 0.0;

    // Reverse makes BinaryHeap (max) behave as a min-heap.
    let mut heap: BinaryHeap<Reverse<FrontierEntry>> = BinaryHeap::new();
    heap.push(Reverse(FrontierEntry { cost_km: 0.0, node: from }));

    while let Some(Reverse(FrontierEntry { cost_km, node })) = heap.pop() {
        if node == to {
            return reconstruct(network, &prev, from, to);
        }

        // Skip stale heap entries.
        if cost_km > dist[node.index()] {
            continue;
        }

        for link in network.out_links(node) {
            let new_cost = cost_km + link.distance_km;
            if new_cost < dist[link.to.index()] {
                dist[link.to.index()] = new_cost;
                prev[link.to.index()] = Some((node, link.speed_limit_kmh));
                heap.push(Reverse(FrontierEntry { cost_km: new_cost, node: link.to }));
            }
        }
    }

    None
}

fn reconstruct(
    network: &RoadNetwork,
    prev:    &[Option<(NodeId, u32)>],
    from:    NodeId,
    to:      NodeId,
) -> Option<Vec<Road>> {
    let mut hops = Vec::new();
    let mut current = to;

    while current != from {
        let (predecessor, speed_limit) = prev[current.index()]?;
        let a = network.node(predecessor)?.pos;
        let b = network.node(current)?.pos;
        hops.push(Road {
            from:        a,
            to:          b,
            distance:    a.distance_km(b),
            bearing_deg: a.initial_bearing_deg(b),
            speed_limit,
        });
        current = predecessor;
    }

    hops.reverse();
    Some(hops)
}
