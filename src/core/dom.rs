//! Capabilities the page script needs from the document.
//!
//! The browser crate implements these over `web-sys`; tests implement them over an
//! in-memory document. Handles are cheap clones of the underlying node.

use std::time::Duration;

use crate::error::PageError;

pub trait VideoElement {
    fn set_class(&self, class: &str, present: bool);

    /// Starts playback.
    ///
    /// Best-effort: an `Err` (or a later asynchronous rejection, e.g. an autoplay
    /// policy refusal) never changes carousel state, it is only logged.
    fn play(&self) -> Result<(), PageError>;

    fn pause(&self);

    /// Moves the playback position back to the start.
    fn rewind(&self);
}

pub trait CarouselHost {
    type Video: VideoElement + 'static;

    /// Video elements inside the container, in document order.
    /// `None` when the container itself is missing.
    fn carousel_videos(&self, container_id: &str) -> Option<Vec<Self::Video>>;
}

pub trait GameHost: Clone + 'static {
    type Canvas: Clone + PartialEq;

    fn canvas_by_id(&self, id: &str) -> Option<Self::Canvas>;

    /// Whether the canvas takes part in layout (it has an offset parent).
    fn is_rendered(&self, canvas: &Self::Canvas) -> bool;

    /// Every canvas in the document, in document order.
    fn canvases(&self) -> Vec<Self::Canvas>;

    /// Puts `replacement` where `placeholder` is, detaching the placeholder.
    fn replace_canvas(
        &self,
        placeholder: &Self::Canvas,
        replacement: &Self::Canvas,
    ) -> Result<(), PageError>;

    fn set_canvas_id(&self, canvas: &Self::Canvas, id: &str);

    fn scroll_y(&self) -> Result<f64, PageError>;

    /// Jumps (no smooth scrolling) to the given vertical offset.
    fn scroll_to_instant(&self, y: f64);
}

/// Fetches the external game module and runs its init export.
#[allow(async_fn_in_trait)]
pub trait ModuleLoader {
    async fn load_and_init(&self, url: &str, init_export: &str) -> Result<(), PageError>;
}

pub trait Scheduler: Clone + 'static {
    /// Registers a repeating wall-clock timer that lives as long as the page.
    fn set_interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> Result<(), PageError>;

    /// Runs `task` on a later turn of the event loop, after pending layout.
    fn defer(&self, task: Box<dyn FnOnce()>) -> Result<(), PageError>;
}

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Unknown values are treated as `Loading` so initialization waits for
    /// `DOMContentLoaded` rather than running against a half-parsed document.
    pub fn parse(v: &str) -> Self {
        match v.trim().to_ascii_lowercase().as_str() {
            "interactive" => ReadyState::Interactive,
            "complete" => ReadyState::Complete,
            _ => ReadyState::Loading,
        }
    }

    /// Whether the document structure is fully parsed.
    pub fn is_parsed(self) -> bool {
        !matches!(self, ReadyState::Loading)
    }
}
