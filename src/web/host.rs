//! Browser implementation of the media host
//!
//! getUserMedia, MediaRecorder, Blob/object URLs and the two video elements
//! of the mounted component.

use crate::capture::traits::{MediaConstraints, MediaHost, RecordedChunk, RecorderSession};
use crate::recorder::ChunkSink;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use js_sys::{Array, Object, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, BlobEvent, BlobPropertyBag, Document, DomException, Event, HtmlAnchorElement,
    HtmlVideoElement, MediaRecorder, MediaRecorderOptions, MediaStream, MediaStreamConstraints,
    MediaStreamTrack, Url,
};

impl RecordedChunk for Blob {
    fn byte_len(&self) -> u64 {
        self.size() as u64
    }
}

/// Best-effort text for a thrown JS value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn media_error(value: JsValue) -> AppError {
    match value.dyn_ref::<DomException>() {
        Some(exception) => AppError::from_media_error(&exception.name(), exception.message()),
        None => AppError::Platform(describe(&value)),
    }
}

fn dom_error(context: &str, value: JsValue) -> AppError {
    AppError::Dom(format!("{context}: {}", describe(&value)))
}

/// `{ audio: { echoCancellation: { exact: true } }, video: { width, height } }`
fn constraints_object(constraints: &MediaConstraints) -> Result<MediaStreamConstraints, JsValue> {
    let audio = Object::new();
    if constraints.audio.echo_cancellation {
        let exact = Object::new();
        Reflect::set(&exact, &"exact".into(), &JsValue::TRUE)?;
        Reflect::set(&audio, &"echoCancellation".into(), &exact)?;
    }

    let video = Object::new();
    Reflect::set(&video, &"width".into(), &constraints.video.width.into())?;
    Reflect::set(&video, &"height".into(), &constraints.video.height.into())?;

    let request = MediaStreamConstraints::new();
    request.set_audio(&audio);
    request.set_video(&video);
    Ok(request)
}

#[derive(Clone)]
pub struct WebHost {
    document: Document,
    live: HtmlVideoElement,
    playback: HtmlVideoElement,
}

impl WebHost {
    pub fn new(document: Document, live: HtmlVideoElement, playback: HtmlVideoElement) -> Self {
        Self {
            document,
            live,
            playback,
        }
    }
}

#[async_trait(?Send)]
impl MediaHost for WebHost {
    type Stream = MediaStream;
    type Blob = Blob;
    type Recorder = WebRecorder;
    type Anchor = HtmlAnchorElement;

    async fn get_user_media(&self, constraints: &MediaConstraints) -> AppResult<MediaStream> {
        let window = web_sys::window().ok_or_else(|| AppError::Platform("no window".into()))?;
        let devices = window.navigator().media_devices().map_err(media_error)?;
        let request =
            constraints_object(constraints).map_err(|e| dom_error("building constraints", e))?;

        let promise = devices
            .get_user_media_with_constraints(&request)
            .map_err(media_error)?;
        let stream = JsFuture::from(promise).await.map_err(media_error)?;

        stream
            .dyn_into::<MediaStream>()
            .map_err(|_| AppError::Platform("getUserMedia did not return a MediaStream".into()))
    }

    fn stop_stream(&self, stream: &MediaStream) {
        for track in stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }

    fn create_recorder(
        &self,
        stream: &MediaStream,
        mime_type: Option<&str>,
    ) -> AppResult<WebRecorder> {
        let supported = mime_type.filter(|mime| MediaRecorder::is_type_supported(mime));
        if supported.is_none() {
            if let Some(mime) = mime_type {
                tracing::debug!("{} not supported, using the browser default", mime);
            }
        }

        let recorder = match supported {
            Some(mime) => {
                let options = MediaRecorderOptions::new();
                options.set_mime_type(mime);
                MediaRecorder::new_with_media_stream_and_media_recorder_options(stream, &options)
            }
            None => MediaRecorder::new_with_media_stream(stream),
        }
        .map_err(|e| AppError::RecorderStart(describe(&e)))?;

        Ok(WebRecorder {
            recorder,
            on_data: None,
            on_stop: None,
        })
    }

    fn assemble(&self, chunks: &[Blob], mime_type: Option<&str>) -> AppResult<Blob> {
        let parts: Array = chunks.iter().collect();
        let blob = match mime_type {
            Some(mime) => {
                let bag = BlobPropertyBag::new();
                bag.set_type(mime);
                Blob::new_with_blob_sequence_and_options(&parts, &bag)
            }
            None => Blob::new_with_blob_sequence(&parts),
        };
        blob.map_err(|e| AppError::Export(describe(&e)))
    }

    fn create_object_url(&self, blob: &Blob) -> AppResult<String> {
        Url::create_object_url_with_blob(blob).map_err(|e| AppError::Export(describe(&e)))
    }

    fn revoke_object_url(&self, url: &str) {
        if let Err(e) = Url::revoke_object_url(url) {
            tracing::warn!("Failed to revoke {}: {}", url, describe(&e));
        }
    }

    fn bind_live_preview(&self, stream: &MediaStream) {
        self.live.set_src_object(Some(stream));
    }

    fn bind_playback(&self, url: &str) -> AppResult<()> {
        self.playback.set_src(url);
        self.playback.set_controls(true);
        let started = self.playback.play().map_err(|e| dom_error("play", e))?;

        // Autoplay can still be refused later; the controls stay usable.
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(started).await {
                tracing::warn!("Playback did not start: {}", describe(&e));
            }
        });
        Ok(())
    }

    fn create_download_anchor(&self, url: &str, filename: &str) -> AppResult<HtmlAnchorElement> {
        let anchor = self
            .document
            .create_element("a")
            .map_err(|e| dom_error("creating anchor", e))?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| AppError::Dom("created element is not an anchor".into()))?;

        anchor
            .style()
            .set_property("display", "none")
            .map_err(|e| dom_error("styling anchor", e))?;
        anchor.set_href(url);
        anchor.set_download(filename);

        let body = self
            .document
            .body()
            .ok_or_else(|| AppError::Dom("document has no body".into()))?;
        body.append_child(&anchor)
            .map_err(|e| dom_error("attaching anchor", e))?;

        anchor.click();
        Ok(anchor)
    }

    fn remove_anchor(&self, anchor: HtmlAnchorElement) {
        anchor.remove();
    }

    fn defer(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            task();
            return;
        };

        let slot = Rc::new(RefCell::new(Some(task)));
        let pending = Rc::clone(&slot);
        let callback = Closure::once_into_js(move || {
            let task = pending.borrow_mut().take();
            if let Some(task) = task {
                task();
            }
        });

        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            tracing::warn!("setTimeout failed, running task now: {}", describe(&e));
            let task = slot.borrow_mut().take();
            if let Some(task) = task {
                task();
            }
        }
    }
}

/// MediaRecorder with at most one data/stop subscription
pub struct WebRecorder {
    recorder: MediaRecorder,
    on_data: Option<Closure<dyn FnMut(BlobEvent)>>,
    on_stop: Option<Closure<dyn FnMut(Event)>>,
}

impl RecorderSession for WebRecorder {
    type Chunk = Blob;

    fn subscribe(&mut self, sink: ChunkSink<Blob>) {
        self.unsubscribe();

        let data_sink = sink.clone();
        let on_data = Closure::<dyn FnMut(BlobEvent)>::new(move |event: BlobEvent| {
            if let Some(blob) = event.data() {
                data_sink.deliver(blob);
            }
        });
        let on_stop = Closure::<dyn FnMut(Event)>::new(move |_event: Event| sink.finish());

        self.recorder
            .set_ondataavailable(Some(on_data.as_ref().unchecked_ref()));
        self.recorder.set_onstop(Some(on_stop.as_ref().unchecked_ref()));
        self.on_data = Some(on_data);
        self.on_stop = Some(on_stop);
    }

    fn unsubscribe(&mut self) {
        if self.on_data.is_none() && self.on_stop.is_none() {
            return;
        }
        self.recorder.set_ondataavailable(None);
        self.recorder.set_onstop(None);
        self.on_data = None;
        self.on_stop = None;
    }

    fn start(&mut self, timeslice_ms: Option<u32>) -> AppResult<()> {
        let started = match timeslice_ms {
            Some(ms) => self
                .recorder
                .start_with_time_slice(i32::try_from(ms).unwrap_or(i32::MAX)),
            None => self.recorder.start(),
        };
        started.map_err(|e| AppError::RecorderStart(describe(&e)))
    }

    fn stop(&mut self) -> AppResult<()> {
        self.recorder
            .stop()
            .map_err(|e| AppError::Platform(describe(&e)))
    }
}

impl Drop for WebRecorder {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
