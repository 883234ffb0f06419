//! Export types
//!
//! Container formats, assembled artifacts and object URL handles.

use crate::capture::traits::RecordedChunk;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Webm,
    Mp4,
}

impl ExportFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Webm => "webm",
            ExportFormat::Mp4 => "mp4",
        }
    }

    /// MIME type requested from the recorder and attached to downloads
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Webm => "video/webm",
            ExportFormat::Mp4 => "video/mp4",
        }
    }

    /// Random file name, `<uuid v4>.<extension>`
    pub fn download_filename(&self) -> String {
        format!("{}.{}", Uuid::new_v4(), self.extension())
    }
}

/// The chunk buffer assembled into one binary object
#[derive(Debug, Clone)]
pub struct ExportArtifact<B> {
    pub blob: B,
    pub mime_type: Option<&'static str>,
}

impl<B: RecordedChunk> ExportArtifact<B> {
    pub fn byte_len(&self) -> u64 {
        self.blob.byte_len()
    }
}

/// A live object URL. Dropping it does not revoke it; the playback manager
/// pairs every creation with exactly one revoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: String) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
