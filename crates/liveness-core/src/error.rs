use thiserror::Error;

/// Failure reported by the external face detector for a single frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("face detection failed: {0}")]
    Failed(String),
    #[error("detector already closed")]
    Closed,
}

#[derive(Error, Debug)]
pub enum LivenessError {
    #[error("challenge sequence must contain at least one head movement")]
    EmptyChallengeSequence,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to spawn session thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
