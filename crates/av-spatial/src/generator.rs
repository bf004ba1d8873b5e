//! Procedural road-network generation.
//!
//! # Algorithm
//!
//! One invocation produces one connected network, in four phases:
//!
//! 1. **Placement** — sample a node count from the configured range and
//!    scatter the nodes with small random jitter around a random center
//!    point, emulating a local cluster of addresses.
//! 2. **Wiring** — for each node still below the target degree, take its
//!    nearest not-yet-maxed candidates by geodesic distance and connect a
//!    random subset of them, subject to a distance band and the degree
//!    caps.  Degree counters on both endpoints update with the road.
//! 3. **Isolation repair** — any node left with zero roads is
//!    force-connected to its single nearest neighbour, ignoring the band.
//! 4. **Component repair** — compute connected components over the
//!    undirected view; while more than one remains, bridge the closest
//!    pair of nodes between the first two components.
//!
//! Nearest-candidate selection breaks distance ties by insertion order
//! (stable sort), so a fixed seed reproduces the map exactly.
//!
//! The in-progress graph, its degree table, and the linked-pair set live in
//! a transient arena that is discarded on completion; the returned
//! [`RoadNetwork`] is immutable-by-convention from then on.

use log::{debug, info};
use rustc_hash::FxHashSet;

use av_core::{GeoPoint, NodeId, SimRng};

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

/// Fallback speed limit if the configured set is empty.
const DEFAULT_SPEED_KMH: u32 = 50;

/// Cluster centers are drawn from this latitude band; beyond it the
/// lat/lon jitter box becomes too distorted to resemble a street cluster.
const CENTER_LAT_LIMIT: f64 = 55.0;

// ── GeneratorConfig ───────────────────────────────────────────────────────────

/// Tunables for one generation run.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneratorConfig {
    /// Inclusive node-count range to sample from.
    pub min_nodes: usize,
    pub max_nodes: usize,

    /// Wiring visits nodes whose degree is still below this.
    pub target_degree: usize,

    /// Hard degree cap for wiring candidates.  Also bounds the random
    /// subset size (1 to `max_degree - 1` roads per visited node), so it
    /// must be at least 2.
    pub max_degree: usize,

    /// How many nearest candidates to consider per visited node.
    pub candidate_pool: usize,

    /// Distance band (km) a wiring candidate must fall inside.  The
    /// isolation-repair phase ignores it.
    pub min_link_km: f64,
    pub max_link_km: f64,

    /// Per-node scatter around the cluster center, in degrees.
    pub jitter_deg: f64,

    /// Speed limits (km/h) drawn uniformly per road.
    pub speed_limits_kmh: Vec<u32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_nodes:        35,
            max_nodes:        45,
            target_degree:    2,
            max_degree:       4,
            candidate_pool:   5,
            min_link_km:      0.3,
            max_link_km:      10.0,
            jitter_deg:       0.05,
            speed_limits_kmh: vec![30, 50, 70, 90, 110],
        }
    }
}

// ── Generation arena ──────────────────────────────────────────────────────────

/// Transient generation state: the in-progress network plus the undirected
/// degree table and linked-pair set the phases consult.  Dropped once the
/// network is handed out.
struct GeneratorArena {
    network: RoadNetwork,
    degree:  Vec<usize>,
    linked:  FxHashSet<(u32, u32)>,
}

impl GeneratorArena {
    fn new(network: RoadNetwork) -> Self {
        let degree = vec![0; network.node_count()];
        Self { network, degree, linked: FxHashSet::default() }
    }

    /// Insert a bidirectional road and bump both degree counters.
    fn connect(&mut self, a: NodeId, b: NodeId, speed_limit_kmh: u32) -> SpatialResult<()> {
        self.network.add_road(a, b, speed_limit_kmh)?;
        self.degree[a.index()] += 1;
        self.degree[b.index()] += 1;
        self.linked.insert(pair_key(a, b));
        Ok(())
    }

    fn is_linked(&self, a: NodeId, b: NodeId) -> bool {
        self.linked.contains(&pair_key(a, b))
    }
}

fn pair_key(a: NodeId, b: NodeId) -> (u32, u32) {
    (a.0.min(b.0), a.0.max(b.0))
}

// ── NetworkGenerator ──────────────────────────────────────────────────────────

/// Builds random, connected, sparse road networks.
pub struct NetworkGenerator {
    config: GeneratorConfig,
}

impl NetworkGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one network.  All randomness comes from `rng`; a fixed seed
    /// reproduces the map exactly.
    ///
    /// # Errors
    ///
    /// `DisconnectedAfterRepair` / `IsolatedNode` if the post-repair
    /// invariants do not hold.  Both indicate a configuration broken badly
    /// enough that the repair phases could not converge, and no routing
    /// over the result would be meaningful.
    pub fn generate(&self, rng: &mut SimRng) -> SpatialResult<RoadNetwork> {
        let mut arena = GeneratorArena::new(self.place_nodes(rng));

        self.wire_cluster(&mut arena, rng)?;
        self.connect_isolated(&mut arena, rng)?;
        let bridges = self.bridge_components(&mut arena, rng)?;

        // The repair phases should leave no isolated node and exactly one
        // component; check rather than hope.
        if let Some(i) = arena.degree.iter().position(|&d| d == 0) {
            return Err(SpatialError::IsolatedNode(NodeId(i as u32)));
        }
        let components = undirected_components(&arena.network).len();
        if components != 1 {
            return Err(SpatialError::DisconnectedAfterRepair { components });
        }

        info!(
            "generated road network: {} nodes, {} links, {} bridge roads",
            arena.network.node_count(),
            arena.network.link_count(),
            bridges,
        );
        Ok(arena.network)
    }

    // ── Phase 1: placement ────────────────────────────────────────────────

    fn place_nodes(&self, rng: &mut SimRng) -> RoadNetwork {
        let count = rng.gen_range(self.config.min_nodes..=self.config.max_nodes);
        let center = GeoPoint::new(
            rng.gen_range(-CENTER_LAT_LIMIT..CENTER_LAT_LIMIT),
            rng.gen_range(-180.0..180.0),
        );

        let mut network = RoadNetwork::with_capacity(count);
        let j = self.config.jitter_deg;
        for i in 0..count {
            let pos = GeoPoint::new(
                center.lat + rng.gen_range(-j..=j),
                center.lon + rng.gen_range(-j..=j),
            );
            network.add_node(format!("Address {}", i + 1), pos);
        }
        debug!("placed {count} nodes around {center}");
        network
    }

    // ── Phase 2: wiring ───────────────────────────────────────────────────

    fn wire_cluster(&self, arena: &mut GeneratorArena, rng: &mut SimRng) -> SpatialResult<()> {
        let n = arena.network.node_count();
        for i in 0..n {
            let node = NodeId(i as u32);
            if arena.degree[i] >= self.config.target_degree {
                continue;
            }

            let candidates = self.nearest_candidates(arena, node);
            if candidates.is_empty() {
                continue;
            }

            // 1 to max_degree - 1 roads out of this visit.
            let want = rng.gen_range(1..self.config.max_degree);
            let mut made = 0;
            for &(candidate, dist_km) in &candidates {
                if made >= want || arena.degree[node.index()] >= self.config.target_degree {
                    break;
                }
                if dist_km < self.config.min_link_km || dist_km > self.config.max_link_km {
                    continue;
                }
                // Re-check the cap: earlier roads this visit may have
                // filled the candidate up.
                if arena.degree[candidate.index()] >= self.config.max_degree {
                    continue;
                }
                arena.connect(node, candidate, self.pick_speed(rng))?;
                made += 1;
            }
        }
        Ok(())
    }

    /// The `candidate_pool` nearest nodes to `node` that are not yet at the
    /// hard degree cap and not already linked to it, as `(id, km)` sorted
    /// by ascending distance.  Ties keep insertion order (stable sort).
    fn nearest_candidates(&self, arena: &GeneratorArena, node: NodeId) -> Vec<(NodeId, f64)> {
        let nodes = arena.network.nodes();
        let pos = nodes[node.index()].pos;

        let mut candidates: Vec<(NodeId, f64)> = nodes
            .iter()
            .filter(|other| other.id != node)
            .filter(|other| arena.degree[other.id.index()] < self.config.max_degree)
            .filter(|other| !arena.is_linked(node, other.id))
            .map(|other| (other.id, pos.distance_km(other.pos)))
            .collect();

        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
        candidates.truncate(self.config.candidate_pool);
        candidates
    }

    // ── Phase 3: isolation repair ─────────────────────────────────────────

    /// Force-connect every zero-degree node to its single nearest
    /// neighbour, regardless of the distance band or degree caps.
    fn connect_isolated(&self, arena: &mut GeneratorArena, rng: &mut SimRng) -> SpatialResult<()> {
        let n = arena.network.node_count();
        for i in 0..n {
            if arena.degree[i] > 0 {
                continue;
            }
            let node = NodeId(i as u32);
            let pos = arena.network.nodes()[i].pos;

            let mut best: Option<(NodeId, f64)> = None;
            for other in arena.network.nodes() {
                if other.id == node {
                    continue;
                }
                let d = pos.distance_km(other.pos);
                // Strict less-than keeps the first of equals (insertion order).
                if best.is_none_or(|(_, bd)| d < bd) {
                    best = Some((other.id, d));
                }
            }
            if let Some((nearest, dist_km)) = best {
                debug!("force-connecting isolated {node} to {nearest} ({dist_km:.2} km)");
                arena.connect(node, nearest, self.pick_speed(rng))?;
            }
        }
        Ok(())
    }

    // ── Phase 4: component repair ─────────────────────────────────────────

    /// Bridge the closest pair of nodes between the first two components
    /// until one component remains.  Returns the number of bridges added.
    fn bridge_components(&self, arena: &mut GeneratorArena, rng: &mut SimRng) -> SpatialResult<usize> {
        let mut bridges = 0;
        loop {
            let components = undirected_components(&arena.network);
            if components.len() <= 1 {
                return Ok(bridges);
            }

            let mut best: Option<(NodeId, NodeId, f64)> = None;
            for &a in &components[0] {
                let a_pos = arena.network.nodes()[a.index()].pos;
                for &b in &components[1] {
                    let d = a_pos.distance_km(arena.network.nodes()[b.index()].pos);
                    if best.is_none_or(|(_, _, bd)| d < bd) {
                        best = Some((a, b, d));
                    }
                }
            }
            let Some((a, b, dist_km)) = best else {
                // Components are never empty; bail to the caller's
                // defensive check if that ever stops holding.
                return Ok(bridges);
            };

            debug!("bridging components via {a} – {b} ({dist_km:.2} km)");
            arena.connect(a, b, self.pick_speed(rng))?;
            bridges += 1;
        }
    }

    fn pick_speed(&self, rng: &mut SimRng) -> u32 {
        rng.choose(&self.config.speed_limits_kmh)
            .copied()
            .unwrap_or(DEFAULT_SPEED_KMH)
    }
}

impl Default for NetworkGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

// ── Connected components ──────────────────────────────────────────────────────

/// Connected components of the undirected reachability graph, in discovery
/// order (ascending lowest node index).  Directed links count in both
/// directions.
pub fn undirected_components(network: &RoadNetwork) -> Vec<Vec<NodeId>> {
    let n = network.node_count();

    // Symmetrize the adjacency so one-way links still connect components.
    let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); n];
    for node in network.nodes() {
        for link in network.out_links(node.id) {
            neighbors[node.id.index()].push(link.to.0);
            neighbors[link.to.index()].push(node.id.0);
        }
    }

    let mut visited = vec![false; n];
    let mut components = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![start as u32];
        visited[start] = true;

        while let Some(current) = stack.pop() {
            component.push(NodeId(current));
            for &next in &neighbors[current as usize] {
                if !visited[next as usize] {
                    visited[next as usize] = true;
                    stack.push(next);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}
