use std::path::PathBuf;

/// URDF generation error types.
#[derive(Debug, thiserror::Error)]
pub enum UrdfError {
    #[error("ROS workspace not found: {0}")]
    WorkspaceNotFound(PathBuf),

    #[error("Xacro template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Unknown robot model '{0}'. Use 'beta' or 'dvt'")]
    UnknownModel(String),

    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("xacro exited with {status}: {stderr}")]
    Xacro { status: String, stderr: String },

    #[error("xacro produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UrdfError>;
