//! `av-nav` — shortest-path routing behind swappable navigator strategies.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`road`]      | `Road` — one hop of a planned route                       |
//! | [`dijkstra`]  | shortest-path search over `RoadNetwork`                   |
//! | [`navigator`] | `Navigator` trait, `MetricNavigator`, `ImperialNavigator` |
//!
//! # Pluggability
//!
//! The drive layer consumes routing via the [`Navigator`] trait, so the
//! unit-faithful [`MetricNavigator`] and the deliberately flawed
//! [`ImperialNavigator`] swap freely — which is the point: the gap between
//! the two is what the rendering layer visualizes.

pub mod dijkstra;
pub mod navigator;
pub mod road;


pub use navigator::{ImperialNavigator, MetricNavigator, MILES_PER_KM, Navigator};
pub use road::Road;
