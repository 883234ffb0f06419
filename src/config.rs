//! Recorder configuration
//!
//! Every field has a default, so an empty JSON object (or no config at all)
//! reproduces the stock component.

use crate::capture::traits::{MediaConstraints, Resolution};
use crate::export::ExportFormat;
use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Constraint profile for the device stream
    #[serde(default)]
    pub constraints: MediaConstraints,

    /// Container requested from the recorder and used for downloads
    #[serde(default)]
    pub format: ExportFormat,

    /// Emit a chunk every N milliseconds instead of once at stop
    #[serde(default)]
    pub timeslice_ms: Option<u32>,

    /// Delay before a download's anchor is removed and its URL revoked
    #[serde(default = "default_download_grace_ms")]
    pub download_grace_ms: u64,

    /// Size of the live and playback video surfaces
    #[serde(default = "default_surface")]
    pub surface: Resolution,

    /// tracing filter directive used when logging is initialised
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_download_grace_ms() -> u64 {
    100
}

fn default_surface() -> Resolution {
    Resolution {
        width: 600,
        height: 400,
    }
}

fn default_log_filter() -> String {
    "webcam_recorder=debug".to_string()
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            constraints: MediaConstraints::default(),
            format: ExportFormat::default(),
            timeslice_ms: None,
            download_grace_ms: default_download_grace_ms(),
            surface: default_surface(),
            log_filter: default_log_filter(),
        }
    }
}

impl RecorderConfig {
    /// Parse and validate a (possibly partial) JSON document
    pub fn from_json(json: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        let video = &self.constraints.video;
        if video.width == 0 || video.height == 0 {
            return Err(AppError::InvalidConfig(format!(
                "video constraint must be non-zero, got {}x{}",
                video.width, video.height
            )));
        }
        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(AppError::InvalidConfig(format!(
                "surface size must be non-zero, got {}x{}",
                self.surface.width, self.surface.height
            )));
        }
        if self.timeslice_ms == Some(0) {
            return Err(AppError::InvalidConfig(
                "timesliceMs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn download_grace(&self) -> Duration {
        Duration::from_millis(self.download_grace_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = RecorderConfig::from_json("{}").unwrap();
        assert_eq!(config, RecorderConfig::default());
        assert_eq!(config.download_grace(), Duration::from_millis(100));
        assert_eq!(config.format, ExportFormat::Webm);
        assert_eq!(config.timeslice_ms, None);
    }

    #[test]
    fn test_partial_document() {
        let config = RecorderConfig::from_json(
            r#"{
                "format": "mp4",
                "timesliceMs": 1000,
                "constraints": { "audio": { "echoCancellation": false } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.format, ExportFormat::Mp4);
        assert_eq!(config.timeslice_ms, Some(1000));
        assert!(!config.constraints.audio.echo_cancellation);
        assert_eq!(config.constraints.video.width, 1280);
        assert_eq!(config.surface.width, 600);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = RecorderConfig::from_json(r#"{ "timesliceMs": 0 }"#).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));

        let err =
            RecorderConfig::from_json(r#"{ "surface": { "width": 0, "height": 400 } }"#)
                .unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));

        let err = RecorderConfig::from_json("{ not json").unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
