//! Browser entry point
//!
//! `mount(parentId, configJson?)` renders the recorder into an existing
//! element and returns a handle whose `unmount()` releases the camera, the
//! recorder subscription and any object URL before removing the markup.

mod dom;
mod host;

pub use host::{WebHost, WebRecorder};

use crate::capture::CaptureManager;
use crate::config::RecorderConfig;
use crate::logging;
use crate::ui::WebcamRecorder;
use anyhow::{Context, Result};
use dom::{js_err, Surface};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlButtonElement};

type SharedRecorder = Rc<RefCell<WebcamRecorder<WebHost>>>;

struct Listener {
    target: HtmlButtonElement,
    callback: Closure<dyn FnMut(Event)>,
}

fn listen(
    button: &HtmlButtonElement,
    recorder: &SharedRecorder,
    action: fn(&mut WebcamRecorder<WebHost>),
) -> Result<Listener> {
    let recorder = Rc::clone(recorder);
    let callback = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
        match recorder.try_borrow_mut() {
            Ok(mut recorder) => action(&mut recorder),
            Err(_) => tracing::warn!("Recorder busy, click ignored"),
        }
    });

    button
        .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
        .map_err(js_err)
        .context("attaching click handler")?;

    Ok(Listener {
        target: button.clone(),
        callback,
    })
}

/// A mounted recorder
#[wasm_bindgen]
pub struct MountHandle {
    recorder: SharedRecorder,
    surface: Surface,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl MountHandle {
    /// Current view state as JSON
    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> {
        let view = self.recorder.borrow().view();
        serde_json::to_string(&view).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Release every resource and remove the markup
    pub fn unmount(self) {
        for listener in &self.listeners {
            if let Err(e) = listener.target.remove_event_listener_with_callback(
                "click",
                listener.callback.as_ref().unchecked_ref(),
            ) {
                tracing::warn!("Failed to detach click handler: {:?}", e);
            }
        }

        match self.recorder.try_borrow_mut() {
            Ok(mut recorder) => recorder.teardown(),
            Err(_) => tracing::error!("Recorder busy during unmount"),
        }

        self.surface.root.remove();
    }
}

/// Render the recorder into the element with id `parent_id`
#[wasm_bindgen]
pub fn mount(parent_id: &str, config_json: Option<String>) -> Result<MountHandle, JsValue> {
    let config = match config_json {
        Some(json) => {
            RecorderConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        None => RecorderConfig::default(),
    };
    logging::init_logging(&config.log_filter);

    mount_into(parent_id, config).map_err(|e| {
        tracing::error!("Failed to mount recorder: {:#}", e);
        JsValue::from_str(&format!("{e:#}"))
    })
}

fn mount_into(parent_id: &str, config: RecorderConfig) -> Result<MountHandle> {
    let window = web_sys::window().context("no window")?;
    let document = window.document().context("no document")?;
    let parent = document
        .get_element_by_id(parent_id)
        .with_context(|| format!("no element with id {parent_id:?}"))?;

    let surface = Surface::build(&document, &parent, config.surface)?;
    let host = WebHost::new(document, surface.live.clone(), surface.playback.clone());
    let recorder: SharedRecorder = Rc::new(RefCell::new(WebcamRecorder::new(host, config)));
    surface.render(&recorder.borrow().view());

    let mut views = recorder.borrow().subscribe();
    let target = surface.clone();
    spawn_local(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            target.render(&view);
        }
    });

    // The permission prompt may stay open indefinitely; nothing waits on it.
    let (capture_host, constraints) = recorder.borrow().capture_request();
    let pending = Rc::clone(&recorder);
    spawn_local(async move {
        let result = CaptureManager::acquire(&capture_host, &constraints).await;
        match pending.try_borrow_mut() {
            Ok(mut recorder) => recorder.on_capture(result),
            Err(_) => tracing::error!("Recorder busy when the device stream arrived"),
        }
    });

    let listeners = vec![
        listen(&surface.record, &recorder, |r| r.toggle_recording())?,
        listen(&surface.play, &recorder, |r| r.play())?,
        listen(&surface.download, &recorder, |r| r.download())?,
    ];

    tracing::info!("Recorder mounted into #{}", parent_id);
    Ok(MountHandle {
        recorder,
        surface,
        listeners,
    })
}
