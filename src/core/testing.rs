//! In-memory document, clock and module loader used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crate::dom::{CarouselHost, GameHost, ModuleLoader, Scheduler, VideoElement};
use crate::error::PageError;

// ---------------------------------------------------------------------------
// Videos

#[derive(Debug, Default)]
struct VideoState {
    classes: BTreeSet<String>,
    playing: bool,
    position: f64,
    play_calls: u32,
    block_autoplay: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeVideo {
    state: Rc<RefCell<VideoState>>,
}

impl FakeVideo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every `play()` is refused, like a browser enforcing an autoplay policy.
    pub(crate) fn with_blocked_autoplay() -> Self {
        let v = Self::default();
        v.state.borrow_mut().block_autoplay = true;
        v
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.contains(class)
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    pub(crate) fn position(&self) -> f64 {
        self.state.borrow().position
    }

    pub(crate) fn set_position(&self, t: f64) {
        self.state.borrow_mut().position = t;
    }

    pub(crate) fn play_calls(&self) -> u32 {
        self.state.borrow().play_calls
    }
}

impl VideoElement for FakeVideo {
    fn set_class(&self, class: &str, present: bool) {
        let mut s = self.state.borrow_mut();
        if present {
            s.classes.insert(class.to_string());
        } else {
            s.classes.remove(class);
        }
    }

    fn play(&self) -> Result<(), PageError> {
        let mut s = self.state.borrow_mut();
        s.play_calls += 1;
        if s.block_autoplay {
            return Err(PageError::Playback("NotAllowedError".to_string()));
        }
        s.playing = true;
        Ok(())
    }

    fn pause(&self) {
        self.state.borrow_mut().playing = false;
    }

    fn rewind(&self) {
        self.state.borrow_mut().position = 0.0;
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeCarouselHost {
    containers: HashMap<String, Vec<FakeVideo>>,
}

impl FakeCarouselHost {
    pub(crate) fn with_container(id: &str, videos: &[FakeVideo]) -> Self {
        let mut containers = HashMap::new();
        containers.insert(id.to_string(), videos.to_vec());
        Self { containers }
    }
}

impl CarouselHost for FakeCarouselHost {
    type Video = FakeVideo;

    fn carousel_videos(&self, container_id: &str) -> Option<Vec<FakeVideo>> {
        self.containers.get(container_id).cloned()
    }
}

// ---------------------------------------------------------------------------
// Document nodes + scroll

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeRef(u32);

#[derive(Debug)]
struct DocNode {
    key: u32,
    id: Option<String>,
    rendered: bool,
    canvas: bool,
}

#[derive(Debug, Default)]
struct DocState {
    /// Body children in document order, canvases and other elements alike.
    nodes: Vec<DocNode>,
    next_key: u32,
    scroll_y: f64,
    scroll_jumps: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeDocument {
    inner: Rc<RefCell<DocState>>,
}

impl FakeDocument {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a canvas at the end of the document.
    pub(crate) fn append_canvas(&self, id: Option<&str>, rendered: bool) -> NodeRef {
        self.append_node(id, rendered, true)
    }

    /// Appends a non-canvas element (always laid out).
    pub(crate) fn append_element(&self, id: &str) -> NodeRef {
        self.append_node(Some(id), true, false)
    }

    fn append_node(&self, id: Option<&str>, rendered: bool, canvas: bool) -> NodeRef {
        let mut d = self.inner.borrow_mut();
        let key = d.next_key;
        d.next_key += 1;
        d.nodes.push(DocNode {
            key,
            id: id.map(str::to_string),
            rendered,
            canvas,
        });
        NodeRef(key)
    }

    pub(crate) fn remove_canvas(&self, c: NodeRef) {
        self.inner.borrow_mut().nodes.retain(|n| n.key != c.0);
    }

    pub(crate) fn contains(&self, c: NodeRef) -> bool {
        self.inner.borrow().nodes.iter().any(|n| n.key == c.0)
    }

    pub(crate) fn id_of(&self, c: NodeRef) -> Option<String> {
        self.inner
            .borrow()
            .nodes
            .iter()
            .find(|n| n.key == c.0)
            .and_then(|n| n.id.clone())
    }

    /// Canvas handles in document order.
    pub(crate) fn order(&self) -> Vec<NodeRef> {
        self.inner
            .borrow()
            .nodes
            .iter()
            .filter(|n| n.canvas)
            .map(|n| NodeRef(n.key))
            .collect()
    }

    /// Every node in document order.
    pub(crate) fn layout(&self) -> Vec<NodeRef> {
        self.inner.borrow().nodes.iter().map(|n| NodeRef(n.key)).collect()
    }

    pub(crate) fn set_scroll_y(&self, y: f64) {
        self.inner.borrow_mut().scroll_y = y;
    }

    pub(crate) fn current_scroll_y(&self) -> f64 {
        self.inner.borrow().scroll_y
    }

    pub(crate) fn scroll_jumps(&self) -> Vec<f64> {
        self.inner.borrow().scroll_jumps.clone()
    }
}

impl GameHost for FakeDocument {
    type Canvas = NodeRef;

    fn canvas_by_id(&self, id: &str) -> Option<NodeRef> {
        self.inner
            .borrow()
            .nodes
            .iter()
            .find(|n| n.canvas && n.id.as_deref() == Some(id))
            .map(|n| NodeRef(n.key))
    }

    fn is_rendered(&self, canvas: &NodeRef) -> bool {
        self.inner
            .borrow()
            .nodes
            .iter()
            .any(|n| n.canvas && n.key == canvas.0 && n.rendered)
    }

    fn canvases(&self) -> Vec<NodeRef> {
        self.order()
    }

    fn replace_canvas(
        &self,
        placeholder: &NodeRef,
        replacement: &NodeRef,
    ) -> Result<(), PageError> {
        let mut d = self.inner.borrow_mut();
        let from = d
            .nodes
            .iter()
            .position(|n| n.key == replacement.0)
            .ok_or_else(|| PageError::Dom("replacement not in document".to_string()))?;
        let mut node = d.nodes.remove(from);
        let at = d
            .nodes
            .iter()
            .position(|n| n.key == placeholder.0)
            .ok_or_else(|| PageError::Dom("placeholder not in document".to_string()))?;
        // The placeholder's slot is layout-visible, so the moved node is too.
        node.rendered = d.nodes[at].rendered;
        d.nodes[at] = node;
        Ok(())
    }

    fn set_canvas_id(&self, canvas: &NodeRef, id: &str) {
        let mut d = self.inner.borrow_mut();
        if let Some(n) = d.nodes.iter_mut().find(|n| n.key == canvas.0) {
            n.id = Some(id.to_string());
        }
    }

    fn scroll_y(&self) -> Result<f64, PageError> {
        Ok(self.inner.borrow().scroll_y)
    }

    fn scroll_to_instant(&self, y: f64) {
        let mut d = self.inner.borrow_mut();
        d.scroll_y = y;
        d.scroll_jumps.push(y);
    }
}

// ---------------------------------------------------------------------------
// Module loader

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadOutcome {
    /// Init succeeds after appending this many canvases to the document.
    AppendCanvases(usize),
    /// Import or init rejects.
    Fail,
}

pub(crate) struct FakeLoader {
    doc: FakeDocument,
    outcome: LoadOutcome,
    /// Layout shift the module causes while it mounts.
    scroll_during_load: Option<f64>,
    /// Removes the canvas with this id while loading.
    remove_during_load: Option<String>,
    calls: Cell<u32>,
    last_url: RefCell<Option<(String, String)>>,
}

impl FakeLoader {
    pub(crate) fn new(doc: &FakeDocument, outcome: LoadOutcome) -> Self {
        Self {
            doc: doc.clone(),
            outcome,
            scroll_during_load: None,
            remove_during_load: None,
            calls: Cell::new(0),
            last_url: RefCell::new(None),
        }
    }

    pub(crate) fn scrolling_to(mut self, y: f64) -> Self {
        self.scroll_during_load = Some(y);
        self
    }

    pub(crate) fn removing(mut self, id: &str) -> Self {
        self.remove_during_load = Some(id.to_string());
        self
    }

    pub(crate) fn calls(&self) -> u32 {
        self.calls.get()
    }

    pub(crate) fn last_request(&self) -> Option<(String, String)> {
        self.last_url.borrow().clone()
    }
}

impl ModuleLoader for FakeLoader {
    async fn load_and_init(&self, url: &str, init_export: &str) -> Result<(), PageError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_url.borrow_mut() = Some((url.to_string(), init_export.to_string()));

        if let Some(y) = self.scroll_during_load {
            self.doc.set_scroll_y(y);
        }
        if let Some(id) = &self.remove_during_load {
            if let Some(c) = self.doc.canvas_by_id(id) {
                self.doc.remove_canvas(c);
            }
        }

        match self.outcome {
            LoadOutcome::AppendCanvases(n) => {
                for _ in 0..n {
                    self.doc.append_canvas(None, false);
                }
                Ok(())
            }
            LoadOutcome::Fail => Err(PageError::ModuleLoad(format!(
                "TypeError: Failed to fetch dynamically imported module: {url}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Clock

struct Interval {
    period_ms: u64,
    next_due_ms: u64,
    tick: Box<dyn FnMut()>,
}

#[derive(Default)]
struct ClockState {
    now_ms: u64,
    intervals: Vec<Interval>,
    deferred: VecDeque<Box<dyn FnOnce()>>,
    refuse_timers: bool,
}

/// Manually advanced clock; nothing runs until the test asks.
#[derive(Clone, Default)]
pub(crate) struct FakeScheduler {
    inner: Rc<RefCell<ClockState>>,
}

impl FakeScheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn refusing_timers() -> Self {
        let s = Self::default();
        s.inner.borrow_mut().refuse_timers = true;
        s
    }

    pub(crate) fn interval_count(&self) -> usize {
        self.inner.borrow().intervals.len()
    }

    pub(crate) fn deferred_count(&self) -> usize {
        self.inner.borrow().deferred.len()
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Moves the clock forward, firing every interval that comes due on the way.
    pub(crate) fn advance(&self, ms: u64) {
        let target = self.inner.borrow().now_ms + ms;
        loop {
            let due = {
                let s = self.inner.borrow();
                s.intervals
                    .iter()
                    .enumerate()
                    .filter(|(_, iv)| iv.next_due_ms <= target)
                    .min_by_key(|(_, iv)| iv.next_due_ms)
                    .map(|(i, iv)| (i, iv.next_due_ms))
            };
            let Some((i, at)) = due else {
                break;
            };

            // Take the callback out so it may touch the scheduler itself.
            let mut tick = {
                let mut s = self.inner.borrow_mut();
                s.now_ms = at;
                let iv = &mut s.intervals[i];
                iv.next_due_ms += iv.period_ms;
                std::mem::replace(&mut iv.tick, Box::new(|| {}))
            };
            tick();
            self.inner.borrow_mut().intervals[i].tick = tick;
        }
        self.inner.borrow_mut().now_ms = target;
    }

    /// Runs every queued deferred task, including ones queued by those tasks.
    pub(crate) fn run_deferred(&self) {
        loop {
            let task = self.inner.borrow_mut().deferred.pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }
}

impl Scheduler for FakeScheduler {
    fn set_interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> Result<(), PageError> {
        let mut s = self.inner.borrow_mut();
        if s.refuse_timers {
            return Err(PageError::Timer("setInterval threw".to_string()));
        }
        let period_ms = period.as_millis() as u64;
        let next_due_ms = s.now_ms + period_ms;
        s.intervals.push(Interval {
            period_ms,
            next_due_ms,
            tick,
        });
        Ok(())
    }

    fn defer(&self, task: Box<dyn FnOnce()>) -> Result<(), PageError> {
        self.inner.borrow_mut().deferred.push_back(task);
        Ok(())
    }
}
