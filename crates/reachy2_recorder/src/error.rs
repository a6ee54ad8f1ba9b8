use crate::robot::CameraKind;

/// Recorder error types.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("URDF error: {0}")]
    Urdf(#[from] urdf_rs::UrdfError),

    #[error("Invalid joint name '{0}'")]
    UnknownJoint(String),

    #[error("Invalid link name '{0}'")]
    UnknownLink(String),

    #[error("URDF has no root link")]
    NoRootLink,

    #[error("Reachy is not connected.")]
    Disconnected,

    #[error("{} camera is not connected.", .0.title())]
    CameraUnavailable(CameraKind),

    #[error("Recording frequency must be positive")]
    InvalidFrequency,

    #[error("Zenoh error: {0}")]
    Zenoh(#[from] zenoh::Error),

    #[error("Robot error: {0}")]
    Robot(String),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Rerun error: {0}")]
    Rerun(#[from] rerun::RecordingStreamError),

    #[error("Tensor error: {0}")]
    Tensor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecorderError>;
