//! Error types and handling
//!
//! Common error types used across the recorder.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Constraints cannot be satisfied: {0}")]
    ConstraintsUnsatisfiable(String),

    #[error("Recorder failed to start: {0}")]
    RecorderStart(String),

    #[error("Recording already in progress")]
    AlreadyRecording,

    #[error("Previous recording has not finished flushing")]
    StopPending,

    #[error("Export error: {0}")]
    Export(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Platform error: {0}")]
    Platform(String),
}

impl AppError {
    /// Stable identifier used in structured log fields
    pub fn code(&self) -> &'static str {
        match self {
            AppError::PermissionDenied(_) => "PERMISSION_DENIED",
            AppError::DeviceUnavailable(_) => "DEVICE_UNAVAILABLE",
            AppError::ConstraintsUnsatisfiable(_) => "CONSTRAINTS_UNSATISFIABLE",
            AppError::RecorderStart(_) => "RECORDER_START_ERROR",
            AppError::AlreadyRecording => "ALREADY_RECORDING",
            AppError::StopPending => "STOP_PENDING",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::Dom(_) => "DOM_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::InvalidConfig(_) => "INVALID_CONFIG",
            AppError::Platform(_) => "PLATFORM_ERROR",
        }
    }

    /// Classify a failed stream request by its `DOMException` name.
    pub fn from_media_error(name: &str, message: String) -> Self {
        match name {
            "NotAllowedError" | "SecurityError" => AppError::PermissionDenied(message),
            "NotFoundError" | "NotReadableError" | "AbortError" => {
                AppError::DeviceUnavailable(message)
            }
            "OverconstrainedError" => AppError::ConstraintsUnsatisfiable(message),
            _ => AppError::Platform(format!("{name}: {message}")),
        }
    }

    /// True for the failures a capture request can end with.
    pub fn is_capture_failure(&self) -> bool {
        matches!(
            self,
            AppError::PermissionDenied(_)
                | AppError::DeviceUnavailable(_)
                | AppError::ConstraintsUnsatisfiable(_)
        )
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
