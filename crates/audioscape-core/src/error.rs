use thiserror::Error;

use crate::scene::{ConeId, ObjectId, ZoneId};

/// Rejected path construction or edit. The path is left unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("a path needs at least 3 control points, got {got}")]
    TooFewPoints { got: usize },
    #[error("control point index {index} out of range for {len} points")]
    IndexOutOfRange { index: usize, len: usize },
}

/// The audio layer could not decode a sound file.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("decoding {filename} failed: {reason}")]
pub struct DecodeError {
    pub filename: String,
    pub reason: String,
}

/// Failure reported by an audio layer implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    #[error("could not create {node}: {reason}")]
    NodeCreation { node: &'static str, reason: String },
    #[error("unknown audio source {0}")]
    UnknownSource(u32),
    #[error("unknown audio buffer {0}")]
    UnknownBuffer(u32),
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no sound object with id {0:?}")]
    UnknownObject(ObjectId),
    #[error("no sound zone with id {0:?}")]
    UnknownZone(ZoneId),
    #[error("no cone with id {0:?}")]
    UnknownCone(ConeId),
    #[error("sound object {0:?} has no trajectory")]
    NoTrajectory(ObjectId),
    #[error("cone angle {0} is not a usable number of radians")]
    InvalidAngle(f64),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("invalid scene document: {0}")]
    Json(#[from] serde_json::Error),
}
