//! `av-spatial` — road network model and procedural generation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`network`]   | `Node`, `RoadLink`, `RoadNetwork` (adjacency + R-tree)     |
//! | [`generator`] | `GeneratorConfig`, `NetworkGenerator`, connectivity repair |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                             |
//! |---------|----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on value types.  |

pub mod error;
pub mod generator;
pub mod network;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use generator::{GeneratorConfig, NetworkGenerator, undirected_components};
pub use network::{Node, RoadLink, RoadNetwork};
