use std::time::Duration;

use fishy_site::dom::Scheduler;
use fishy_site::PageError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::describe;

#[derive(Clone)]
pub(super) struct WebScheduler {
    window: web_sys::Window,
}

impl WebScheduler {
    pub(super) fn new(window: web_sys::Window) -> Self {
        Self { window }
    }
}

impl Scheduler for WebScheduler {
    fn set_interval(&self, period: Duration, tick: Box<dyn FnMut()>) -> Result<(), PageError> {
        let ms = i32::try_from(period.as_millis())
            .map_err(|_| PageError::Timer(format!("period too long: {period:?}")))?;

        let cb = Closure::wrap(tick);
        self.window
            .set_interval_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), ms)
            .map_err(|e| PageError::Timer(describe(&e)))?;
        // The interval is never cleared, so the callback lives as long as the page.
        cb.forget();
        Ok(())
    }

    fn defer(&self, task: Box<dyn FnOnce()>) -> Result<(), PageError> {
        let cb = Closure::once_into_js(move || task());
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), 0)
            .map_err(|e| PageError::Timer(describe(&e)))?;
        Ok(())
    }
}
