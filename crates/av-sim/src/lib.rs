//! `av-sim` — the simulation facade consumed by the rendering layer.
//!
//! # Surface
//!
//! | Concern        | Entry points                                             |
//! |----------------|----------------------------------------------------------|
//! | Map            | `Simulation::generate`, `network()`, `nearest_node()`    |
//! | Routing        | `ground_truth_route()`, `route_with()`, `planned_route()`|
//! | Driving        | `start_driving()`, `cancel()`, `join()`, `reset()`       |
//! | Live polling   | `position()`, `bearing_deg()`, `speed()`, `road_index()`,|
//! |                | `is_active()`, `status()`, `live_state()`                |
//!
//! Map generation and routing run synchronously on the caller's thread.
//! `start_driving` spawns one dedicated worker per drive; the caller polls
//! the live fields at its own cadence (nothing is pushed) and stops the
//! drive cooperatively through [`cancel`][Simulation::cancel].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use av_nav::ImperialNavigator;
//! use av_sim::Simulation;
//!
//! let mut sim = Simulation::generate(GeneratorConfig::default(), ImperialNavigator, 42)?;
//! let start = sim.nearest_node(click_pos).unwrap();
//! let end = sim.nearest_node(target_pos).unwrap();
//! sim.start_driving(start, end)?;
//! loop {
//!     render(sim.position(), sim.bearing_deg(), sim.speed());
//!     if !sim.is_active() { break; }
//! }
//! sim.join()?;
//! ```

pub mod error;
pub mod sim;


pub use error::{SimError, SimResult};
pub use sim::Simulation;
