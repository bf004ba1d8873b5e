//! `av-drive` — the vehicle motion model.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`state`]  | `DriveStatus`, `VehicleState` (atomic telemetry surface)  |
//! | [`cancel`] | `CancelToken`                                             |
//! | [`drive`]  | `Vehicle<N>`, `DriftConfig`, `DriveOutcome` — the loop    |
//! | [`error`]  | `DriveError`, `DriveResult<T>`                            |
//!
//! # Motion model
//!
//! A drive is a blocking loop over the planned route, one segment at a
//! time.  At each segment start the vehicle re-syncs speed and bearing to
//! the segment's prescribed values through the navigator's correction
//! functions.  Each tick it checks the cancel token, advances along the
//! current bearing by the per-tick distance (clamped to the segment
//! remainder), applies independent multiplicative drift to speed and
//! bearing, publishes the live fields, and sleeps one tick on the injected
//! [`TimeSource`][av_core::TimeSource].  Drift between corrections is what
//! walks the vehicle off the idealized path.

pub mod cancel;
pub mod drive;
pub mod error;
pub mod state;

#[cfg(test)]
mod tests;

pub use cancel::CancelToken;
pub use drive::{DriftConfig, DriveOutcome, Vehicle};
pub use error::{DriveError, DriveResult};
pub use state::{DriveStatus, ROAD_INDEX_NONE, VehicleState};
