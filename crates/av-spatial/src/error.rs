//! Spatial-subsystem error type.

use thiserror::Error;

use av_core::NodeId;

/// Errors produced by `av-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// A link referenced a node that was never inserted.  This is a
    /// programmer error, never silently ignored.
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    /// The generated network still had more than one connected component
    /// after the repair passes.  No route over such a map is meaningful,
    /// so this is fatal to the generation attempt.
    #[error("generated network still has {components} components after repair")]
    DisconnectedAfterRepair { components: usize },

    /// A node ended generation with no links at all.
    #[error("node {0} left isolated after repair")]
    IsolatedNode(NodeId),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
