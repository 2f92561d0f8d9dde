use fishy_site::dom::ReadyState;
use fishy_site::page::Page;
use fishy_site::{PageConfig, PageError};
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

mod console;
mod dom;
mod module;
mod timers;

use dom::WebPage;
use module::WebModuleLoader;
use timers::WebScheduler;

/// Optional `<script type="application/json">` holding a `PageConfig`.
const CONFIG_ELEMENT_ID: &str = "fishySiteConfig";

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console::init_logging();

    let (window, document) = match page_handles() {
        Ok(handles) => handles,
        Err(e) => {
            warn!("page: {e}");
            return;
        }
    };

    if ReadyState::parse(&document.ready_state()).is_parsed() {
        boot(window, document);
        return;
    }

    let target = document.clone();
    let on_ready = Closure::once_into_js(move || boot(window, document));
    if target
        .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
        .is_err()
    {
        warn!("page: failed to listen for DOMContentLoaded");
    }
}

fn page_handles() -> Result<(web_sys::Window, web_sys::Document), PageError> {
    let window = web_sys::window().ok_or(PageError::NoWindow)?;
    let document = window.document().ok_or(PageError::NoDocument)?;
    Ok((window, document))
}

fn boot(window: web_sys::Window, document: web_sys::Document) {
    let config = read_config(&document);
    let page = WebPage::new(window.clone(), document.clone());
    let loader = WebModuleLoader::new(document);
    let scheduler = WebScheduler::new(window);

    wasm_bindgen_futures::spawn_local(async move {
        let report = Page::new(&config)
            .initialize(&page, &page, &loader, &scheduler)
            .await;
        info!("page: ready (game {:?})", report.game);
    });
}

fn read_config(document: &web_sys::Document) -> PageConfig {
    let raw = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .map(|el| el.text_content().unwrap_or_default());
    PageConfig::from_optional_json(raw.as_deref())
}

/// Best readable text for a thrown JS value.
fn describe(v: &JsValue) -> String {
    if let Some(err) = v.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    v.as_string().unwrap_or_else(|| format!("{v:?}"))
}
