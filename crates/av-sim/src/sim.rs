//! The `Simulation` struct and the drive-worker lifecycle.

use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, info};

use av_core::{GeoPoint, NodeId, SimRng, TimeSource, WallClock};
use av_drive::{CancelToken, DriveOutcome, DriveResult, DriveStatus, Vehicle, VehicleState};
use av_nav::{MetricNavigator, Navigator, Road};
use av_spatial::{GeneratorConfig, NetworkGenerator, RoadNetwork};

use crate::{SimError, SimResult};

/// One simulation session: a generated map, a vehicle with its navigator,
/// and at most one running drive.
///
/// # Type parameters
///
/// - `N`: the navigator the *vehicle* drives by.  Pass
///   [`MetricNavigator`] for faithful units or
///   [`ImperialNavigator`][av_nav::ImperialNavigator] to reproduce the
///   flawed provider whose speed limits disagree with the map.
/// - `C`: the pacing source — [`WallClock`] in production, a virtual clock
///   in tests.  Clones of it are handed to each drive worker.
///
/// The network is built once per session and read-only afterwards; routing
/// and generation run on the caller's thread.  While a drive is running
/// the `Vehicle` lives on the worker thread; [`join`][Self::join] moves it
/// back.
pub struct Simulation<N, C>
where
    N: Navigator + 'static,
    C: TimeSource + Clone + 'static,
{
    network:      Arc<RoadNetwork>,
    clock:        C,
    state:        Arc<VehicleState>,
    vehicle:      Option<Vehicle<N>>,
    worker:       Option<JoinHandle<(Vehicle<N>, DriveResult<DriveOutcome>)>>,
    cancel:       CancelToken,
    active_route: Vec<Road>,
}

impl<N> Simulation<N, WallClock>
where
    N: Navigator + 'static,
{
    /// Generate a fresh map and build a session paced by the wall clock.
    pub fn generate(config: GeneratorConfig, navigator: N, seed: u64) -> SimResult<Self> {
        Self::generate_with_clock(config, navigator, WallClock, seed)
    }
}

impl<N, C> Simulation<N, C>
where
    N: Navigator + 'static,
    C: TimeSource + Clone + 'static,
{
    /// Generate a fresh map with an explicit pacing source.
    ///
    /// The map comes from the seeded generator; the vehicle's drift stream
    /// is derived from the same seed, so a whole session replays from one
    /// number.
    pub fn generate_with_clock(
        config:    GeneratorConfig,
        navigator: N,
        clock:     C,
        seed:      u64,
    ) -> SimResult<Self> {
        let mut rng = SimRng::new(seed);
        let network = NetworkGenerator::new(config).generate(&mut rng)?;
        let vehicle_seed: u64 = rng.random();
        Ok(Self::from_network(network, navigator, clock, vehicle_seed))
    }

    /// Build a session over an existing network (fixture maps, tests).
    pub fn from_network(network: RoadNetwork, navigator: N, clock: C, seed: u64) -> Self {
        let vehicle = Vehicle::new(navigator, seed);
        let state = vehicle.state();
        Self {
            network: Arc::new(network),
            clock,
            state,
            vehicle: Some(vehicle),
            worker: None,
            cancel: CancelToken::new(),
            active_route: Vec::new(),
        }
    }

    // ── Map access ────────────────────────────────────────────────────────

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Snap an arbitrary coordinate (pointer position, screen pick) to the
    /// nearest road node.
    pub fn nearest_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.network.nearest_node(pos)
    }

    // ── Route planning ────────────────────────────────────────────────────

    /// Shortest route in the map's true units (km, km/h), regardless of
    /// which navigator the vehicle drives by.
    pub fn ground_truth_route(&self, from: NodeId, to: NodeId) -> Option<Vec<Road>> {
        MetricNavigator.navigate(&self.network, from, to)
    }

    /// Plan with a caller-chosen navigator.
    pub fn route_with<M: Navigator>(&self, navigator: &M, from: NodeId, to: NodeId) -> Option<Vec<Road>> {
        navigator.navigate(&self.network, from, to)
    }

    /// The route the current (or last) drive follows, in the vehicle
    /// navigator's units.  Empty before the first drive.
    pub fn planned_route(&self) -> &[Road] {
        &self.active_route
    }

    // ── Drive lifecycle ───────────────────────────────────────────────────

    /// Start driving from `from` to `to` on a dedicated worker thread.
    ///
    /// Returns immediately; poll the live surface for progress and call
    /// [`join`][Self::join] to collect the outcome.  Fails with
    /// `AlreadyDriving` while a worker holds the vehicle.
    pub fn start_driving(&mut self, from: NodeId, to: NodeId) -> SimResult<()> {
        let mut vehicle = self
            .vehicle
            .take()
            .ok_or(av_drive::DriveError::AlreadyDriving)?;

        // Snapshot for the polling surface; the worker re-runs the same
        // deterministic search and drives the identical route.
        self.active_route = vehicle
            .navigator()
            .navigate(&self.network, from, to)
            .unwrap_or_default();

        self.cancel = CancelToken::new();
        let cancel = self.cancel.clone();
        let network = Arc::clone(&self.network);
        let clock = self.clock.clone();

        debug!("spawning drive worker: {from} → {to}");
        let handle = std::thread::Builder::new()
            .name("av-drive".into())
            .spawn(move || {
                let outcome = vehicle.start_driving(&network, from, to, &cancel, &clock);
                (vehicle, outcome)
            })?;
        self.worker = Some(handle);
        Ok(())
    }

    /// Request a cooperative stop of the running drive, if any.  The
    /// vehicle halts within one tick.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A clone of the current drive's cancel token, for collaborators that
    /// outlive this borrow.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the drive worker and take the vehicle back.
    ///
    /// `Ok(None)` when no worker was running.
    pub fn join(&mut self) -> SimResult<Option<DriveOutcome>> {
        let Some(handle) = self.worker.take() else {
            return Ok(None);
        };
        let (vehicle, outcome) = handle.join().map_err(|_| SimError::WorkerPanicked)?;
        self.vehicle = Some(vehicle);
        let outcome = outcome?;
        info!("drive worker finished: {outcome:?}");
        Ok(Some(outcome))
    }

    /// Reset the vehicle to `Idle` at its original start.  Fails while a
    /// drive worker holds it.
    pub fn reset(&mut self) -> SimResult<()> {
        let vehicle = self
            .vehicle
            .as_mut()
            .ok_or(av_drive::DriveError::AlreadyDriving)?;
        vehicle.reset();
        Ok(())
    }

    // ── Live polling surface ──────────────────────────────────────────────

    pub fn position(&self) -> GeoPoint {
        self.state.position()
    }

    pub fn bearing_deg(&self) -> f64 {
        self.state.bearing_deg()
    }

    pub fn speed(&self) -> f64 {
        self.state.speed()
    }

    pub fn road_index(&self) -> Option<usize> {
        self.state.road_index()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn status(&self) -> DriveStatus {
        self.state.status()
    }

    /// Shared handle to the telemetry record, for pollers on other threads.
    pub fn live_state(&self) -> Arc<VehicleState> {
        Arc::clone(&self.state)
    }
}

impl<N, C> Drop for Simulation<N, C>
where
    N: Navigator + 'static,
    C: TimeSource + Clone + 'static,
{
    /// Ask a still-running worker to stop; the thread detaches and exits
    /// within one tick.
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.cancel.cancel();
        }
    }
}
