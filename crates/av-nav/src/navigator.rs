//! Navigator strategies and the correction interface.

use av_core::NodeId;
use av_spatial::RoadNetwork;

use crate::Road;
use crate::dijkstra::shortest_path;

/// Statute miles per kilometre.
pub const MILES_PER_KM: f64 = 0.62137;

// ── Navigator trait ───────────────────────────────────────────────────────────

/// A navigation provider: plans routes and prescribes per-segment
/// speed/bearing corrections.
///
/// Implementations must be `Send + Sync`; the drive worker carries its
/// navigator to another thread.
pub trait Navigator: Send + Sync {
    /// Plan a route from `from` to `to`.
    ///
    /// `None` means no route exists — a legitimate, representable result
    /// to branch on, not a fault.  `from == to` yields an empty route.
    fn navigate(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Option<Vec<Road>>;

    /// Signed adjustment from `current_speed` to the segment's prescribed
    /// limit, in this navigator's rate unit.
    fn speed_correction(&self, road: &Road, current_speed: f64) -> f64 {
        road.speed_limit as f64 - current_speed
    }

    /// Signed adjustment from `current_bearing` to the segment's bearing.
    /// Not normalized to the shortest angular distance; callers handle
    /// wraparound if they need it.
    fn bearing_correction(&self, road: &Road, current_bearing: f64) -> f64 {
        road.bearing_deg - current_bearing
    }

    /// Traversal length of `road` in this navigator's distance unit.
    fn segment_distance(&self, road: &Road) -> f64 {
        road.distance
    }
}

// ── MetricNavigator ───────────────────────────────────────────────────────────

/// Ground-truth navigator: kilometres and km/h, exactly as stored in the
/// network.
pub struct MetricNavigator;

impl Navigator for MetricNavigator {
    fn navigate(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Option<Vec<Road>> {
        shortest_path(network, from, to)
    }
}

// ── ImperialNavigator ─────────────────────────────────────────────────────────

/// A navigator that emits imperial units the way a careless foreign
/// provider would: distances become miles, and the km/h speed limit is run
/// through the *distance* factor and truncated to an integer.
///
/// The truncation does not round — a 50 km/h road emits 31.  Downstream
/// anomaly detection diffs that value against the network's true km/h
/// limit, so the arithmetic here is load-bearing and must stay exactly as
/// it is.
pub struct ImperialNavigator;

impl Navigator for ImperialNavigator {
    fn navigate(&self, network: &RoadNetwork, from: NodeId, to: NodeId) -> Option<Vec<Road>> {
        shortest_path(network, from, to)
            .map(|hops| hops.into_iter().map(to_imperial).collect())
    }
}

fn to_imperial(road: Road) -> Road {
    Road {
        distance:    road.distance * MILES_PER_KM,
        speed_limit: (road.speed_limit as f64 * MILES_PER_KM) as u32,
        ..road
    }
}
