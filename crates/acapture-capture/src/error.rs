//! Error types for the capture module.

use std::time::Duration;

use thiserror::Error;

use acapture_types::ConfigError;

/// Errors that can occur during capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Target enumeration is unavailable.
    #[error("Target discovery unavailable: {0}")]
    Discovery(String),

    /// Capture target not found.
    #[error("Capture target not found: {0}")]
    TargetNotFound(String),

    /// Permission denied for capture.
    #[error("Permission denied for capture")]
    PermissionDenied,

    /// The backend could not acquire a capture resource.
    #[error("Capture acquisition failed: {0}")]
    Acquisition(String),

    /// No frame arrived within the bounded wait.
    #[error("No frame within {0:?}")]
    FrameTimeout(Duration),

    /// The capture source stopped producing frames.
    #[error("Capture source lost")]
    SourceLost,

    /// Frame conversion error.
    #[error("Frame conversion error: {0}")]
    FrameConversion(String),

    /// Frame requested without an active capture.
    #[error("Capture session is not running")]
    NotRunning,

    /// Operation attempted on a closed session.
    #[error("Capture session is closed")]
    Closed,

    /// Session configuration rejected.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Coarse classification of a [`CaptureError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Enumeration unavailable.
    Discovery,

    /// Resource could not be acquired or produced no frame.
    Acquisition,

    /// Frame requested before a successful reset.
    NotRunning,

    /// Operation attempted after close.
    Closed,

    /// Configuration rejected at construction.
    Config,
}

impl CaptureError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Discovery(_) => ErrorKind::Discovery,
            Self::TargetNotFound(_)
            | Self::PermissionDenied
            | Self::Acquisition(_)
            | Self::FrameTimeout(_)
            | Self::SourceLost
            | Self::FrameConversion(_) => ErrorKind::Acquisition,
            Self::NotRunning => ErrorKind::NotRunning,
            Self::Closed => ErrorKind::Closed,
            Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }
}
