//! Component markup
//!
//! Two video surfaces side by side and a row of three buttons, rendered
//! from a [`ViewModel`].

use super::host::describe;
use crate::capture::Resolution;
use crate::ui::ViewModel;
use anyhow::{anyhow, Context, Result};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlButtonElement, HtmlDivElement, HtmlVideoElement};

pub(crate) fn js_err(value: JsValue) -> anyhow::Error {
    anyhow!(describe(&value))
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T> {
    document
        .create_element(tag)
        .map_err(js_err)
        .with_context(|| format!("creating <{tag}>"))?
        .dyn_into::<T>()
        .map_err(|_| anyhow!("<{tag}> has an unexpected element type"))
}

#[derive(Clone)]
pub struct Surface {
    pub root: HtmlDivElement,
    videos: HtmlDivElement,
    pub live: HtmlVideoElement,
    pub playback: HtmlVideoElement,
    pub record: HtmlButtonElement,
    pub play: HtmlButtonElement,
    pub download: HtmlButtonElement,
}

impl Surface {
    pub fn build(document: &Document, parent: &Element, size: Resolution) -> Result<Self> {
        let root: HtmlDivElement = create(document, "div")?;

        let videos: HtmlDivElement = create(document, "div")?;
        videos
            .style()
            .set_property("display", "flex")
            .and_then(|_| videos.style().set_property("justify-content", "center"))
            .map_err(js_err)
            .context("styling video row")?;

        let live: HtmlVideoElement = create(document, "video")?;
        live.set_width(size.width);
        live.set_height(size.height);
        live.set_muted(true);
        live.set_autoplay(true);
        live.set_attribute("playsinline", "")
            .map_err(js_err)
            .context("configuring live preview")?;

        let playback: HtmlVideoElement = create(document, "video")?;
        playback.set_width(size.width);
        playback.set_height(size.height);
        playback.set_hidden(true);
        playback
            .set_attribute("playsinline", "")
            .map_err(js_err)
            .context("configuring playback surface")?;

        let controls: HtmlDivElement = create(document, "div")?;
        let record: HtmlButtonElement = create(document, "button")?;
        let play: HtmlButtonElement = create(document, "button")?;
        let download: HtmlButtonElement = create(document, "button")?;

        for (container, child) in [
            (&videos, live.unchecked_ref::<Element>()),
            (&videos, playback.unchecked_ref()),
            (&controls, record.unchecked_ref()),
            (&controls, play.unchecked_ref()),
            (&controls, download.unchecked_ref()),
            (&root, videos.unchecked_ref()),
            (&root, controls.unchecked_ref()),
        ] {
            container
                .append_child(child)
                .map_err(js_err)
                .context("assembling recorder markup")?;
        }

        parent
            .append_child(&root)
            .map_err(js_err)
            .context("attaching recorder to the page")?;

        Ok(Self {
            root,
            videos,
            live,
            playback,
            record,
            play,
            download,
        })
    }

    pub fn render(&self, view: &ViewModel) {
        self.videos.set_hidden(!view.live_preview_visible);
        self.playback.set_hidden(!view.playback_visible);

        for (button, state) in [
            (&self.record, &view.record_button),
            (&self.play, &view.play_button),
            (&self.download, &view.download_button),
        ] {
            button.set_text_content(Some(state.label));
            button.set_disabled(!state.enabled);
        }
    }
}
