use av_core::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveError {
    /// Only one drive may be active per vehicle; starting another is a
    /// precondition violation, not a queueing request.
    #[error("a drive is already in progress")]
    AlreadyDriving,

    #[error("start node {0} not found in network")]
    UnknownStart(NodeId),

    #[error("destination node {0} not found in network")]
    UnknownDestination(NodeId),
}

pub type DriveResult<T> = Result<T, DriveError>;
