use fishy_site::dom::{CarouselHost, GameHost, VideoElement};
use fishy_site::PageError;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlCanvasElement, HtmlVideoElement, NodeList, ScrollBehavior, ScrollToOptions};

use super::describe;

/// The live document plus its window (for scrolling).
#[derive(Clone)]
pub(super) struct WebPage {
    window: web_sys::Window,
    document: web_sys::Document,
}

impl WebPage {
    pub(super) fn new(window: web_sys::Window, document: web_sys::Document) -> Self {
        Self { window, document }
    }
}

fn collect_nodes<T: JsCast>(list: &NodeList) -> Vec<T> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<T>().ok())
        .collect()
}

#[derive(Clone)]
pub(super) struct WebVideo(HtmlVideoElement);

impl VideoElement for WebVideo {
    fn set_class(&self, class: &str, present: bool) {
        let list = self.0.class_list();
        let res = if present {
            list.add_1(class)
        } else {
            list.remove_1(class)
        };
        if let Err(e) = res {
            warn!("carousel: classList update failed: {}", describe(&e));
        }
    }

    fn play(&self) -> Result<(), PageError> {
        let promise = self
            .0
            .play()
            .map_err(|e| PageError::Playback(describe(&e)))?;
        // Autoplay refusals arrive as a rejected promise; they are expected.
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                debug!("video playback not started: {}", describe(&e));
            }
        });
        Ok(())
    }

    fn pause(&self) {
        let _ = self.0.pause();
    }

    fn rewind(&self) {
        self.0.set_current_time(0.0);
    }
}

impl CarouselHost for WebPage {
    type Video = WebVideo;

    fn carousel_videos(&self, container_id: &str) -> Option<Vec<WebVideo>> {
        let container = self.document.get_element_by_id(container_id)?;
        match container.query_selector_all("video") {
            Ok(list) => Some(
                collect_nodes::<HtmlVideoElement>(&list)
                    .into_iter()
                    .map(WebVideo)
                    .collect(),
            ),
            Err(e) => {
                warn!("carousel: querySelectorAll failed: {}", describe(&e));
                Some(Vec::new())
            }
        }
    }
}

impl GameHost for WebPage {
    type Canvas = HtmlCanvasElement;

    fn canvas_by_id(&self, id: &str) -> Option<HtmlCanvasElement> {
        self.document
            .get_element_by_id(id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()
    }

    fn is_rendered(&self, canvas: &HtmlCanvasElement) -> bool {
        // `display: none` (or a hidden ancestor) leaves offsetParent null.
        canvas.offset_parent().is_some()
    }

    fn canvases(&self) -> Vec<HtmlCanvasElement> {
        match self.document.query_selector_all("canvas") {
            Ok(list) => collect_nodes(&list),
            Err(e) => {
                warn!("game: querySelectorAll failed: {}", describe(&e));
                Vec::new()
            }
        }
    }

    fn replace_canvas(
        &self,
        placeholder: &HtmlCanvasElement,
        replacement: &HtmlCanvasElement,
    ) -> Result<(), PageError> {
        placeholder
            .replace_with_with_node_1(replacement)
            .map_err(|e| PageError::Dom(describe(&e)))
    }

    fn set_canvas_id(&self, canvas: &HtmlCanvasElement, id: &str) {
        canvas.set_id(id);
    }

    fn scroll_y(&self) -> Result<f64, PageError> {
        self.window
            .scroll_y()
            .map_err(|e| PageError::Dom(describe(&e)))
    }

    fn scroll_to_instant(&self, y: f64) {
        let opts = ScrollToOptions::new();
        opts.set_top(y);
        opts.set_behavior(ScrollBehavior::Instant);
        self.window.scroll_to_with_scroll_to_options(&opts);
    }
}
