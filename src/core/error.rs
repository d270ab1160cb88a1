//! ReelForge Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

use super::TimeSec;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Timing Errors
    // =========================================================================
    #[error("Invalid total duration: {0} seconds (must be > 0)")]
    InvalidDuration(TimeSec),

    // =========================================================================
    // Timeline Errors
    // =========================================================================
    #[error("No usable image clips to assemble")]
    NoClips,

    #[error("Segment/image count mismatch: {segments} segments, {images} images")]
    SegmentMismatch { segments: usize, images: usize },

    // =========================================================================
    // Caption Errors
    // =========================================================================
    #[error("Caption style not found: {0}")]
    StyleNotFound(String),

    // =========================================================================
    // Provider Errors
    // =========================================================================
    #[error("Provider '{name}' failed: {message}")]
    Provider { name: String, message: String },

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    // =========================================================================
    // FFmpeg Errors
    // =========================================================================
    #[error("FFmpeg not found. Install FFmpeg or set an explicit binary path in the config.")]
    FFmpegNotFound,

    #[error("FFmpeg execution failed: {0}")]
    FFmpegFailed(String),

    #[error("Media probe failed: {0}")]
    ProbeFailed(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Wraps a provider failure with the provider's registered name
    pub fn provider(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Provider {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidDuration(-1.0);
        assert!(err.to_string().contains("-1"));

        let err = CoreError::NoClips;
        assert!(err.to_string().contains("No usable image clips"));

        let err = CoreError::provider("pollinations", "status 503");
        assert!(err.to_string().contains("pollinations"));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
