//! Playback and download of the recorded clip
//!
//! Both operations re-assemble the chunk buffer on every call. The preview
//! surface holds at most one object URL; binding a new one revokes the old
//! one, and [`PlaybackManager::release`] revokes the last.

use super::types::{ExportArtifact, ExportFormat, ObjectUrl};
use crate::capture::traits::MediaHost;
use crate::utils::error::AppResult;
use std::time::Duration;

pub struct PlaybackManager<H: MediaHost> {
    host: H,
    format: ExportFormat,
    download_grace: Duration,
    /// URL currently bound to the playback surface
    preview_url: Option<ObjectUrl>,
}

impl<H: MediaHost> PlaybackManager<H> {
    pub fn new(host: H, format: ExportFormat, download_grace: Duration) -> Self {
        Self {
            host,
            format,
            download_grace,
            preview_url: None,
        }
    }

    /// Concatenate `chunks` into a single artifact
    pub fn assemble(
        &self,
        chunks: &[H::Blob],
        mime_type: Option<&'static str>,
    ) -> AppResult<ExportArtifact<H::Blob>> {
        let blob = self.host.assemble(chunks, mime_type)?;
        Ok(ExportArtifact { blob, mime_type })
    }

    /// Bind a fresh artifact to the playback surface and start playing it.
    pub fn preview(&mut self, chunks: &[H::Blob]) -> AppResult<ExportArtifact<H::Blob>> {
        let artifact = self.assemble(chunks, None)?;
        let url = ObjectUrl::new(self.host.create_object_url(&artifact.blob)?);

        if let Err(e) = self.host.bind_playback(url.as_str()) {
            self.host.revoke_object_url(url.as_str());
            return Err(e);
        }

        if let Some(previous) = self.preview_url.replace(url) {
            self.host.revoke_object_url(previous.as_str());
        }

        tracing::info!(
            "Previewing {} bytes from {} chunks",
            artifact.byte_len(),
            chunks.len()
        );
        Ok(artifact)
    }

    /// Save the clip through a transient anchor.
    ///
    /// The anchor is removed and its URL revoked after the grace delay, so
    /// the browser has started the save before the data goes away.
    pub fn download(&self, chunks: &[H::Blob]) -> AppResult<String> {
        let artifact = self.assemble(chunks, Some(self.format.mime_type()))?;
        let url = self.host.create_object_url(&artifact.blob)?;
        let filename = self.format.download_filename();

        let anchor = match self.host.create_download_anchor(&url, &filename) {
            Ok(anchor) => anchor,
            Err(e) => {
                self.host.revoke_object_url(&url);
                return Err(e);
            }
        };

        tracing::info!("Downloading {} bytes as {}", artifact.byte_len(), filename);

        let host = self.host.clone();
        self.host.defer(
            self.download_grace,
            Box::new(move || {
                host.remove_anchor(anchor);
                host.revoke_object_url(&url);
            }),
        );

        Ok(filename)
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_ref().map(ObjectUrl::as_str)
    }

    /// Revoke the bound preview URL, if any
    pub fn release(&mut self) {
        if let Some(url) = self.preview_url.take() {
            self.host.revoke_object_url(url.as_str());
            tracing::debug!("Released preview URL");
        }
    }
}

impl<H: MediaHost> Drop for PlaybackManager<H> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;

    fn manager(host: &FakeHost) -> PlaybackManager<FakeHost> {
        PlaybackManager::new(host.clone(), ExportFormat::Webm, Duration::from_millis(100))
    }

    fn chunks() -> Vec<Vec<u8>> {
        vec![vec![1; 5], vec![2; 7]]
    }

    #[test]
    fn test_preview_concatenates_in_order() {
        let host = FakeHost::new();
        let mut playback = manager(&host);

        let artifact = playback.preview(&chunks()).unwrap();
        assert_eq!(artifact.byte_len(), 12);
        assert_eq!(&artifact.blob[..5], &[1u8; 5]);
        assert_eq!(&artifact.blob[5..], &[2u8; 7]);
        assert_eq!(artifact.mime_type, None);
        assert_eq!(host.playback_source().as_deref(), playback.preview_url());
    }

    #[test]
    fn test_preview_is_idempotent() {
        let host = FakeHost::new();
        let mut playback = manager(&host);
        let buffer = chunks();

        let first = playback.preview(&buffer).unwrap();
        let second = playback.preview(&buffer).unwrap();
        assert_eq!(first.blob, second.blob);
        assert_eq!(buffer, chunks());
    }

    #[test]
    fn test_rebind_revokes_previous_url_once() {
        let host = FakeHost::new();
        let mut playback = manager(&host);

        playback.preview(&chunks()).unwrap();
        let first = playback.preview_url().unwrap().to_string();
        playback.preview(&chunks()).unwrap();
        let second = playback.preview_url().unwrap().to_string();

        assert_ne!(first, second);
        assert_eq!(host.revoked_urls(), vec![first.clone()]);

        playback.release();
        playback.release();
        drop(playback);
        assert_eq!(host.revoked_urls(), vec![first, second]);
    }

    #[test]
    fn test_failed_bind_keeps_previous_url() {
        let host = FakeHost::new();
        let mut playback = manager(&host);

        playback.preview(&chunks()).unwrap();
        let bound = playback.preview_url().unwrap().to_string();

        host.fail_playback_bind();
        assert!(playback.preview(&chunks()).is_err());
        assert_eq!(playback.preview_url(), Some(bound.as_str()));
        assert_eq!(host.revoked_urls().len(), 1);
        assert!(host.leaked_urls().contains(&bound));
        assert_eq!(host.leaked_urls().len(), 1);
    }

    #[test]
    fn test_download_revokes_after_grace() {
        let host = FakeHost::new();
        let playback = manager(&host);

        let filename = playback.download(&chunks()).unwrap();
        assert!(filename.ends_with(".webm"));

        let anchors = host.anchors();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].filename, filename);
        assert!(!anchors[0].removed);
        assert_eq!(host.assembled_mime_types(), vec![Some("video/webm".to_string())]);
        assert!(host.revoked_urls().is_empty());
        assert_eq!(host.deferred_delays(), vec![Duration::from_millis(100)]);

        host.run_deferred();
        assert!(host.anchors()[0].removed);
        assert_eq!(host.revoked_urls(), vec![anchors[0].url.clone()]);
        assert!(host.leaked_urls().is_empty());
    }

    #[test]
    fn test_download_does_not_touch_preview() {
        let host = FakeHost::new();
        let mut playback = manager(&host);

        playback.preview(&chunks()).unwrap();
        let bound = playback.preview_url().unwrap().to_string();
        playback.download(&chunks()).unwrap();
        host.run_deferred();

        assert_eq!(playback.preview_url(), Some(bound.as_str()));
        assert_eq!(host.leaked_urls(), vec![bound]);
    }
}
