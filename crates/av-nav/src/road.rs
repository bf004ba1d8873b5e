//! The per-hop route segment handed to the motion model.

use av_core::GeoPoint;

/// One hop of a planned route, in the producing navigator's native units.
///
/// A route is an ordered `Vec<Road>`; the first segment starts at the
/// route's start node.  `distance` and `speed_limit` are kilometres and
/// km/h from [`MetricNavigator`][crate::MetricNavigator], miles and the
/// converted rate from [`ImperialNavigator`][crate::ImperialNavigator].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Road {
    pub from: GeoPoint,
    pub to:   GeoPoint,

    /// Segment length in the navigator's distance unit.
    pub distance: f64,

    /// Initial great-circle bearing from `from` to `to`, degrees [0, 360).
    pub bearing_deg: f64,

    /// Prescribed speed limit in the navigator's rate unit.
    pub speed_limit: u32,
}
