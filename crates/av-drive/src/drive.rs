//! The vehicle and its drive loop.

use std::sync::Arc;

use log::{debug, info};

use av_core::{GeoPoint, NodeId, SimRng, TICK, TimeSource, distance_per_tick};
use av_nav::{Navigator, Road};
use av_spatial::RoadNetwork;

use crate::state::ROAD_INDEX_NONE;
use crate::{CancelToken, DriveError, DriveResult, DriveStatus, VehicleState};

// ── DriftConfig ───────────────────────────────────────────────────────────────

/// Bounds of the symmetric multiplicative noise applied to speed and
/// bearing each tick, as fractions (0.05 = ±5 %).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DriftConfig {
    pub speed_pct:   f64,
    pub bearing_pct: f64,
}

impl DriftConfig {
    /// No drift at all — deterministic motion for tests.
    pub const NONE: DriftConfig = DriftConfig { speed_pct: 0.0, bearing_pct: 0.0 };
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self { speed_pct: 0.075, bearing_pct: 0.05 }
    }
}

// ── DriveOutcome ──────────────────────────────────────────────────────────────

/// How a drive ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DriveOutcome {
    /// The route was exhausted — or never existed, which ends the drive
    /// immediately as a trivial completion.
    Completed,
    /// The cancel token fired mid-drive.
    Cancelled,
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

/// A simulated vehicle: navigator, drift noise, RNG, the active route, and
/// the shared telemetry record.
///
/// `start_driving` blocks for the duration of the drive; run it on a
/// dedicated worker and poll [`VehicleState`] from elsewhere.  Only one
/// drive may be active at a time.
pub struct Vehicle<N: Navigator> {
    navigator: N,
    drift:     DriftConfig,
    rng:       SimRng,
    state:     Arc<VehicleState>,
    route:     Vec<Road>,
    origin:    GeoPoint,
}

impl<N: Navigator> Vehicle<N> {
    pub fn new(navigator: N, seed: u64) -> Self {
        Self {
            navigator,
            drift:  DriftConfig::default(),
            rng:    SimRng::new(seed),
            state:  Arc::new(VehicleState::new()),
            route:  Vec::new(),
            origin: GeoPoint::new(0.0, 0.0),
        }
    }

    /// Replace the drift bounds (builder-style).
    pub fn with_drift(mut self, drift: DriftConfig) -> Self {
        self.drift = drift;
        self
    }

    /// Shared handle to the live telemetry record.
    pub fn state(&self) -> Arc<VehicleState> {
        Arc::clone(&self.state)
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// The most recently planned route.
    pub fn route(&self) -> &[Road] {
        &self.route
    }

    /// Replace the active route and rewind the road index to the first
    /// segment.  Does not touch the vehicle's position.
    pub fn update_route(&mut self, route: Vec<Road>) {
        self.route = route;
        self.state.set_road_index(0);
    }

    /// Return to `Idle` at the original start, keeping the planned route.
    pub fn reset(&mut self) {
        self.state.set_position(self.origin);
        self.state.set_speed(0.0);
        self.state.set_bearing(0.0);
        self.state.set_road_index(ROAD_INDEX_NONE);
        self.state.set_status(DriveStatus::Idle);
    }

    // ── Drive loop ────────────────────────────────────────────────────────

    /// Drive from `start` to `end`, blocking until the route is exhausted
    /// or `cancel` fires.
    ///
    /// Plans the route with the configured navigator; `None` ends the
    /// drive immediately as a trivial completion.  Pacing comes from
    /// `clock`, the loop's only suspension point.
    ///
    /// # Errors
    ///
    /// `AlreadyDriving` if a drive is in progress, `UnknownStart` /
    /// `UnknownDestination` if either endpoint is not in the network.
    pub fn start_driving<C: TimeSource>(
        &mut self,
        network: &RoadNetwork,
        start:   NodeId,
        end:     NodeId,
        cancel:  &CancelToken,
        clock:   &C,
    ) -> DriveResult<DriveOutcome> {
        if self.state.status() == DriveStatus::Driving {
            return Err(DriveError::AlreadyDriving);
        }
        let origin = network
            .node(start)
            .ok_or(DriveError::UnknownStart(start))?
            .pos;
        network
            .node(end)
            .ok_or(DriveError::UnknownDestination(end))?;

        self.origin = origin;
        self.state.set_position(origin);
        self.state.set_speed(0.0);
        self.state.set_bearing(0.0);
        self.state.set_road_index(ROAD_INDEX_NONE);

        match self.navigator.navigate(network, start, end) {
            Some(route) => self.route = route,
            None => {
                info!("no route from {start} to {end}; drive trivially complete");
                self.state.set_status(DriveStatus::Completed);
                return Ok(DriveOutcome::Completed);
            }
        }

        info!("drive started: {start} → {end}, {} segments", self.route.len());
        self.state.set_status(DriveStatus::Driving);

        let mut speed = 0.0;
        let mut bearing = 0.0;

        for index in 0..self.route.len() {
            let road = self.route[index];
            self.state.set_road_index(index as u32);

            // Segment-start re-sync toward the prescribed limit and bearing
            // (the periodic GPS/speedometer correction).
            speed += self.navigator.speed_correction(&road, speed);
            bearing += self.navigator.bearing_correction(&road, bearing);
            debug!(
                "segment {index}: {:.3} @ limit {}, bearing {:.1}°",
                road.distance, road.speed_limit, road.bearing_deg
            );

            let total = self.navigator.segment_distance(&road);
            let mut travelled = 0.0;

            while travelled < total {
                if cancel.is_cancelled() {
                    info!("drive cancelled on segment {index}");
                    self.state.set_status(DriveStatus::Cancelled);
                    return Ok(DriveOutcome::Cancelled);
                }

                let step = distance_per_tick(speed).min(total - travelled);
                if step <= 0.0 {
                    // A non-positive limit would never advance; skip ahead.
                    break;
                }

                let pos = self.state.position().destination_point(bearing, step);
                travelled += step;

                if self.drift.speed_pct > 0.0 {
                    let p = self.drift.speed_pct;
                    speed *= 1.0 + self.rng.gen_range(-p..=p);
                }
                if self.drift.bearing_pct > 0.0 {
                    let p = self.drift.bearing_pct;
                    bearing *= 1.0 + self.rng.gen_range(-p..=p);
                }

                self.state.set_position(pos);
                self.state.set_speed(speed);
                self.state.set_bearing(bearing);

                clock.sleep(TICK);
            }
        }

        info!("drive completed: {} segments", self.route.len());
        self.state.set_status(DriveStatus::Completed);
        Ok(DriveOutcome::Completed)
    }
}
