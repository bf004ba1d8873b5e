use av_drive::DriveError;
use av_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("map generation failed: {0}")]
    Generation(#[from] SpatialError),

    #[error(transparent)]
    Drive(#[from] DriveError),

    #[error("failed to spawn the drive worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("drive worker panicked")]
    WorkerPanicked,
}

pub type SimResult<T> = Result<T, SimError>;
