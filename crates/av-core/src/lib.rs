//! `av-core` — foundational types for the `autodrive` simulation framework.
//!
//! This crate is a dependency of every other `av-*` crate.  It intentionally
//! has no `av-*` dependencies and minimal external ones (only `rand`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module   | Contents                                                  |
//! |----------|-----------------------------------------------------------|
//! | [`ids`]  | `NodeId`                                                  |
//! | [`geo`]  | `GeoPoint`, haversine distance, bearing, forward geodesic |
//! | [`rng`]  | `SimRng` (seeded, explicitly threaded)                    |
//! | [`time`] | Tick constants, `TimeSource`, `WallClock`, `ManualClock`  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all value types.  |

pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::{EARTH_RADIUS_KM, GeoPoint};
pub use ids::NodeId;
pub use rng::SimRng;
pub use time::{MILLIS_PER_SIM_HOUR, ManualClock, TICK, TICK_MS, TimeSource, distance_per_tick, WallClock};
