use std::cell::Cell;

use tracing::{debug, error, info, warn};

use crate::config::PageConfig;
use crate::dom::{GameHost, ModuleLoader, Scheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoPlaceholder,
    /// The placeholder is laid out as hidden (small screens).
    NotVisible,
}

/// Lifecycle of the one-shot game mount. Everything except `NotStarted` and
/// `Loading` is final for the page's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMountState {
    NotStarted,
    Skipped(SkipReason),
    Loading,
    /// The module initialized. `replaced` tells whether its canvas took the
    /// placeholder's spot.
    Mounted { replaced: bool },
    Failed,
}

impl GameMountState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameMountState::NotStarted | GameMountState::Loading)
    }
}

/// Loads the game module when its placeholder canvas is on screen and swaps the
/// module's own canvas in for the placeholder.
#[derive(Debug)]
pub struct GameLoader {
    canvas_id: String,
    module_url: String,
    init_export: String,
    state: Cell<GameMountState>,
}

impl GameLoader {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            canvas_id: config.game_canvas_id.clone(),
            module_url: config.game_module_url.clone(),
            init_export: config.game_init_export.clone(),
            state: Cell::new(GameMountState::NotStarted),
        }
    }

    pub fn state(&self) -> GameMountState {
        self.state.get()
    }

    /// Runs the mount once. Later calls return the state reached by the first one
    /// without touching the page; there are no retries.
    ///
    /// Load failures are logged, never returned. Once the load has been attempted,
    /// the scroll offset recorded just before it is restored on the next tick
    /// whatever the outcome.
    pub async fn initialize<H, L, S>(&self, host: &H, loader: &L, scheduler: &S) -> GameMountState
    where
        H: GameHost,
        L: ModuleLoader,
        S: Scheduler,
    {
        if self.state.get() != GameMountState::NotStarted {
            return self.state.get();
        }

        let Some(placeholder) = host.canvas_by_id(&self.canvas_id) else {
            return self.finish(GameMountState::Skipped(SkipReason::NoPlaceholder));
        };
        if !host.is_rendered(&placeholder) {
            debug!("game: placeholder hidden, not loading {}", self.module_url);
            return self.finish(GameMountState::Skipped(SkipReason::NotVisible));
        }

        self.state.set(GameMountState::Loading);
        let _restore = ScrollRestore::record(host, scheduler);

        let load = loader.load_and_init(&self.module_url, &self.init_export);
        let state = match load.await {
            Ok(()) => GameMountState::Mounted {
                replaced: self.adopt_module_canvas(host),
            },
            Err(e) => {
                error!("failed to load WebAssembly game: {e}");
                GameMountState::Failed
            }
        };
        self.finish(state)
    }

    fn finish(&self, state: GameMountState) -> GameMountState {
        self.state.set(state);
        state
    }

    /// The module appends its own canvas to the body. The first canvas that is not
    /// the placeholder is taken to be it.
    fn adopt_module_canvas<H: GameHost>(&self, host: &H) -> bool {
        let Some(placeholder) = host.canvas_by_id(&self.canvas_id) else {
            debug!("game: placeholder gone after load");
            return false;
        };
        let Some(real) = host.canvases().into_iter().find(|c| *c != placeholder) else {
            warn!("game: module did not add a canvas; keeping placeholder");
            return false;
        };

        if let Err(e) = host.replace_canvas(&placeholder, &real) {
            warn!("game: failed to swap in module canvas: {e}");
            return false;
        }
        host.set_canvas_id(&real, &self.canvas_id);
        info!("game: mounted module canvas as #{}", self.canvas_id);
        true
    }
}

/// Puts the page back at the recorded offset one tick after it is dropped.
struct ScrollRestore<H: GameHost, S: Scheduler> {
    host: H,
    scheduler: S,
    y: Option<f64>,
}

impl<H: GameHost, S: Scheduler> ScrollRestore<H, S> {
    fn record(host: &H, scheduler: &S) -> Self {
        let y = match host.scroll_y() {
            Ok(y) => Some(y),
            Err(e) => {
                warn!("game: could not read scroll offset: {e}");
                None
            }
        };
        Self {
            host: host.clone(),
            scheduler: scheduler.clone(),
            y,
        }
    }
}

impl<H: GameHost, S: Scheduler> Drop for ScrollRestore<H, S> {
    fn drop(&mut self) {
        let Some(y) = self.y else {
            return;
        };
        let host = self.host.clone();
        if let Err(e) = self
            .scheduler
            .defer(Box::new(move || host.scroll_to_instant(y)))
        {
            warn!("game: could not schedule scroll restore: {e}");
        }
    }
}
