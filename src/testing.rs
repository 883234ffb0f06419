//! In-memory media host for unit tests
//!
//! Blobs are byte vectors and object URLs are counters. Every call is
//! recorded so tests can check pairing of URL creation and revocation,
//! subscriptions, and deferred work.

use crate::capture::traits::{MediaConstraints, MediaHost, RecorderSession};
use crate::recorder::{ChunkOutcome, ChunkSink};
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeStream(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeAnchor {
    pub url: String,
    pub filename: String,
    pub removed: bool,
}

type DeferredTask = (Duration, Box<dyn FnOnce()>);

#[derive(Default)]
struct FakeState {
    capture_failure: Option<String>,
    fail_recorder_start: bool,
    fail_recorder_stop: bool,
    fail_playback_bind: bool,

    requested: Option<MediaConstraints>,
    next_stream: u32,
    stopped_streams: Vec<u32>,
    live_preview_binds: usize,
    playback_source: Option<String>,

    recorders_created: usize,
    recorder_mime: Option<String>,
    sinks: HashMap<usize, ChunkSink<Vec<u8>>>,
    stop_requests: usize,
    unsubscribes: usize,

    assembled: Vec<(Vec<u8>, Option<String>)>,
    created_urls: Vec<String>,
    revoked_urls: Vec<String>,
    anchors: Vec<FakeAnchor>,
    deferred: Vec<DeferredTask>,
}

#[derive(Clone, Default)]
pub struct FakeHost {
    state: Rc<RefCell<FakeState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_stream(&self) -> FakeStream {
        let mut state = self.state.borrow_mut();
        state.next_stream += 1;
        FakeStream(state.next_stream)
    }

    /// Make the next stream request fail with the given `DOMException` name
    pub fn fail_capture(&self, name: &str) {
        self.state.borrow_mut().capture_failure = Some(name.to_string());
    }

    pub fn fail_recorder_start(&self) {
        self.state.borrow_mut().fail_recorder_start = true;
    }

    pub fn fail_recorder_stop(&self) {
        self.state.borrow_mut().fail_recorder_stop = true;
    }

    pub fn fail_playback_bind(&self) {
        self.state.borrow_mut().fail_playback_bind = true;
    }

    /// Sink subscribed to the most recently created recorder
    pub fn latest_sink(&self) -> Option<ChunkSink<Vec<u8>>> {
        let state = self.state.borrow();
        state.sinks.get(&state.recorders_created).cloned()
    }

    /// Data-available notification from the latest recorder
    pub fn deliver(&self, data: &[u8]) -> Option<ChunkOutcome> {
        let sink = self.latest_sink()?;
        Some(sink.deliver(data.to_vec()))
    }

    /// Stop notification from the latest recorder
    pub fn finish(&self) {
        if let Some(sink) = self.latest_sink() {
            sink.finish();
        }
    }

    /// Run every deferred task, as if their delays had elapsed
    pub fn run_deferred(&self) {
        let tasks = std::mem::take(&mut self.state.borrow_mut().deferred);
        for (_, task) in tasks {
            task();
        }
    }

    pub fn deferred_delays(&self) -> Vec<Duration> {
        self.state.borrow().deferred.iter().map(|(d, _)| *d).collect()
    }

    pub fn requested_constraints(&self) -> Option<MediaConstraints> {
        self.state.borrow().requested.clone()
    }

    pub fn stopped_streams(&self) -> usize {
        self.state.borrow().stopped_streams.len()
    }

    pub fn live_preview_binds(&self) -> usize {
        self.state.borrow().live_preview_binds
    }

    pub fn playback_source(&self) -> Option<String> {
        self.state.borrow().playback_source.clone()
    }

    pub fn recorders_created(&self) -> usize {
        self.state.borrow().recorders_created
    }

    pub fn recorder_mime(&self) -> Option<String> {
        self.state.borrow().recorder_mime.clone()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.state.borrow().sinks.len()
    }

    pub fn stop_requests(&self) -> usize {
        self.state.borrow().stop_requests
    }

    pub fn unsubscribes(&self) -> usize {
        self.state.borrow().unsubscribes
    }

    pub fn last_assembled(&self) -> Option<Vec<u8>> {
        self.state.borrow().assembled.last().map(|(bytes, _)| bytes.clone())
    }

    pub fn assembled_mime_types(&self) -> Vec<Option<String>> {
        self.state
            .borrow()
            .assembled
            .iter()
            .map(|(_, mime)| mime.clone())
            .collect()
    }

    pub fn created_urls(&self) -> usize {
        self.state.borrow().created_urls.len()
    }

    pub fn revoked_urls(&self) -> Vec<String> {
        self.state.borrow().revoked_urls.clone()
    }

    /// URLs created and not yet revoked
    pub fn leaked_urls(&self) -> Vec<String> {
        let state = self.state.borrow();
        state
            .created_urls
            .iter()
            .filter(|url| !state.revoked_urls.contains(url))
            .cloned()
            .collect()
    }

    pub fn anchors(&self) -> Vec<FakeAnchor> {
        self.state.borrow().anchors.clone()
    }
}

pub struct FakeRecorder {
    state: Rc<RefCell<FakeState>>,
    id: usize,
}

impl RecorderSession for FakeRecorder {
    type Chunk = Vec<u8>;

    fn subscribe(&mut self, sink: ChunkSink<Vec<u8>>) {
        self.state.borrow_mut().sinks.insert(self.id, sink);
    }

    fn unsubscribe(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.sinks.remove(&self.id).is_some() {
            state.unsubscribes += 1;
        }
    }

    fn start(&mut self, _timeslice_ms: Option<u32>) -> AppResult<()> {
        if self.state.borrow().fail_recorder_start {
            return Err(AppError::RecorderStart("stream is inactive".into()));
        }
        Ok(())
    }

    fn stop(&mut self) -> AppResult<()> {
        let mut state = self.state.borrow_mut();
        state.stop_requests += 1;
        if state.fail_recorder_stop {
            return Err(AppError::Platform("InvalidStateError".into()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl MediaHost for FakeHost {
    type Stream = FakeStream;
    type Blob = Vec<u8>;
    type Recorder = FakeRecorder;
    type Anchor = usize;

    async fn get_user_media(&self, constraints: &MediaConstraints) -> AppResult<FakeStream> {
        self.state.borrow_mut().requested = Some(constraints.clone());
        let failure = self.state.borrow_mut().capture_failure.take();
        match failure {
            Some(name) => Err(AppError::from_media_error(&name, "rejected".into())),
            None => Ok(self.new_stream()),
        }
    }

    fn stop_stream(&self, stream: &FakeStream) {
        self.state.borrow_mut().stopped_streams.push(stream.0);
    }

    fn create_recorder(
        &self,
        _stream: &FakeStream,
        mime_type: Option<&str>,
    ) -> AppResult<FakeRecorder> {
        let mut state = self.state.borrow_mut();
        state.recorders_created += 1;
        state.recorder_mime = mime_type.map(str::to_string);
        Ok(FakeRecorder {
            state: Rc::clone(&self.state),
            id: state.recorders_created,
        })
    }

    fn assemble(&self, chunks: &[Vec<u8>], mime_type: Option<&str>) -> AppResult<Vec<u8>> {
        let bytes = chunks.concat();
        self.state
            .borrow_mut()
            .assembled
            .push((bytes.clone(), mime_type.map(str::to_string)));
        Ok(bytes)
    }

    fn create_object_url(&self, _blob: &Vec<u8>) -> AppResult<String> {
        let mut state = self.state.borrow_mut();
        let url = format!("blob:fake/{}", state.created_urls.len() + 1);
        state.created_urls.push(url.clone());
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        self.state.borrow_mut().revoked_urls.push(url.to_string());
    }

    fn bind_live_preview(&self, _stream: &FakeStream) {
        self.state.borrow_mut().live_preview_binds += 1;
    }

    fn bind_playback(&self, url: &str) -> AppResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_playback_bind {
            return Err(AppError::Dom("play() rejected".into()));
        }
        state.playback_source = Some(url.to_string());
        Ok(())
    }

    fn create_download_anchor(&self, url: &str, filename: &str) -> AppResult<usize> {
        let mut state = self.state.borrow_mut();
        let id = state.anchors.len();
        state.anchors.push(FakeAnchor {
            url: url.to_string(),
            filename: filename.to_string(),
            removed: false,
        });
        Ok(id)
    }

    fn remove_anchor(&self, anchor: usize) {
        if let Some(entry) = self.state.borrow_mut().anchors.get_mut(anchor) {
            entry.removed = true;
        }
    }

    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.state.borrow_mut().deferred.push((delay, task));
    }
}
