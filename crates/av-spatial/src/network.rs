//! Road network representation.
//!
//! # Data layout
//!
//! Nodes live in an insertion-ordered `Vec<Node>` indexed by `NodeId`; each
//! node's outgoing links live in a parallel `Vec<Vec<RoadLink>>`, also in
//! insertion order.  Link distances are computed from the endpoint
//! coordinates once, at insertion time, and cached on the link — routing
//! never recomputes them per query.
//!
//! The network is mutable while the generator wires it and
//! immutable-by-convention afterwards: the routing and drive layers only
//! take `&RoadNetwork`.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  The
//! rendering layer uses it to snap pointer coordinates to road nodes when
//! picking a start or destination.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use av_core::{GeoPoint, NodeId};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within one generated cluster.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Node & RoadLink ───────────────────────────────────────────────────────────

/// A road-network node: stable identity, display name, and position.
///
/// Equality is by `id`; two nodes at the same coordinate are still distinct.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:   NodeId,
    pub name: String,
    pub pos:  GeoPoint,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

/// A directed link to `to`, with its cached great-circle length and the
/// road's speed limit in the network's native unit (km/h).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadLink {
    pub to:              NodeId,
    pub distance_km:     f64,
    pub speed_limit_kmh: u32,
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph with per-node outgoing adjacency and a spatial snap
/// index.
pub struct RoadNetwork {
    nodes:       Vec<Node>,
    adjacency:   Vec<Vec<RoadLink>>,
    link_count:  usize,
    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or links.
    pub fn new() -> Self {
        Self {
            nodes:       Vec::new(),
            adjacency:   Vec::new(),
            link_count:  0,
            spatial_idx: RTree::new(),
        }
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            nodes:       Vec::with_capacity(nodes),
            adjacency:   Vec::with_capacity(nodes),
            link_count:  0,
            spatial_idx: RTree::new(),
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_count
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Add a node and return its `NodeId` (sequential from 0).
    ///
    /// Ids are assigned by the network, which makes inserting a duplicate
    /// id unrepresentable rather than silently ignored.
    pub fn add_node(&mut self, name: impl Into<String>, pos: GeoPoint) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { id, name: name.into(), pos });
        self.adjacency.push(Vec::new());
        self.spatial_idx.insert(NodeEntry { point: [pos.lat, pos.lon], id });
        id
    }

    /// Add a **directed** link from `from` to `to` with the given speed
    /// limit (km/h).  The link's distance is the great-circle distance
    /// between the endpoints, computed here and cached.
    ///
    /// # Errors
    ///
    /// `SpatialError::NodeNotFound` if either endpoint has not been added.
    /// The network does not deduplicate links; callers are responsible for
    /// not double-adding.
    pub fn add_link(&mut self, from: NodeId, to: NodeId, speed_limit_kmh: u32) -> SpatialResult<()> {
        let to_pos = self
            .node(to)
            .ok_or(SpatialError::NodeNotFound(to))?
            .pos;
        let from_pos = self
            .node(from)
            .ok_or(SpatialError::NodeNotFound(from))?
            .pos;

        self.adjacency[from.index()].push(RoadLink {
            to,
            distance_km: from_pos.distance_km(to_pos),
            speed_limit_kmh,
        });
        self.link_count += 1;
        Ok(())
    }

    /// Convenience: add links in **both directions** for an undirected road
    /// with one speed limit.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, speed_limit_kmh: u32) -> SpatialResult<()> {
        self.add_link(a, b, speed_limit_kmh)?;
        self.add_link(b, a, speed_limit_kmh)
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Outgoing links of `id`, in insertion order.  Empty for unknown ids.
    pub fn out_links(&self, id: NodeId) -> &[RoadLink] {
        self.adjacency
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Out-degree of `id` (number of outgoing links).
    pub fn out_degree(&self, id: NodeId) -> usize {
        self.out_links(id).len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The `NodeId` nearest to `pos`, or `None` for an empty network.
    pub fn nearest_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    /// Up to `k` nearest nodes to `pos`, sorted by ascending distance.
    pub fn k_nearest_nodes(&self, pos: GeoPoint, k: usize) -> Vec<NodeId> {
        self.spatial_idx
            .nearest_neighbor_iter(&[pos.lat, pos.lon])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

impl Default for RoadNetwork {
    fn default() -> Self {
        Self::new()
    }
}
