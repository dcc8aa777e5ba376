//! Top-level error type and its mapping onto wire failure codes.

use crate::camera::{CaptureError, StartError};
use crate::files::ListError;
use crate::process::ExecError;
use crate::rpc::Reply;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("camera permissions not granted")]
    PermissionDenied,

    #[error("unknown command: {0}")]
    NotImplemented(String),

    #[error("failed to start camera: {0}")]
    Start(#[from] StartError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    List(#[from] ListError),
}

impl BridgeError {
    /// The machine-readable code carried in `Reply::Failure`.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::PermissionDenied => "PERMISSION_DENIED",
            BridgeError::NotImplemented(_) => "NOT_IMPLEMENTED",
            BridgeError::Start(_) => "CAMERA_START_FAILED",
            BridgeError::Capture(CaptureError::NotBound) => "CAMERA_NOT_INITIALIZED",
            BridgeError::Capture(_) => "CAPTURE_FAILED",
            BridgeError::Exec(ExecError::NotWhitelisted(_)) => "COMMAND_NOT_WHITELISTED",
            BridgeError::Exec(ExecError::Interrupted) => "EXECUTION_INTERRUPTED",
            BridgeError::Exec(ExecError::Io(_)) => "EXECUTION_FAILED",
            BridgeError::List(ListError::InvalidPath(_)) => "INVALID_PATH",
            BridgeError::List(ListError::Io(_)) => "LIST_FILES_FAILED",
        }
    }

    /// Optional diagnostic detail for `Reply::Failure`, carrying the
    /// underlying collaborator message where one exists.
    pub fn details(&self) -> Option<String> {
        match self {
            BridgeError::Start(StartError::Provider(m)) => Some(m.clone()),
            BridgeError::Capture(CaptureError::Device(m)) => Some(m.clone()),
            BridgeError::Capture(CaptureError::Storage(e)) => Some(e.to_string()),
            BridgeError::Exec(ExecError::Io(m)) => Some(m.clone()),
            BridgeError::List(ListError::Io(e)) => Some(e.to_string()),
            _ => None,
        }
    }
}

impl From<&BridgeError> for Reply {
    fn from(err: &BridgeError) -> Self {
        Reply::failure(err.code(), err.to_string(), err.details())
    }
}
