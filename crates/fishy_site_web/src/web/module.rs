use fishy_site::dom::ModuleLoader;
use fishy_site::PageError;
use tracing::info;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::describe;

#[wasm_bindgen(inline_js = "export function fishy_site_import(url) { return import(url); }")]
extern "C" {
    #[wasm_bindgen(catch, js_name = fishy_site_import)]
    fn dynamic_import(url: &str) -> Result<js_sys::Promise, JsValue>;
}

/// Loads ES modules with a dynamic `import()`.
pub(super) struct WebModuleLoader {
    document: web_sys::Document,
}

impl WebModuleLoader {
    pub(super) fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// `import()` resolves relative to the calling script, which for the inline
    /// snippet is not the page, so relative URLs are made absolute first.
    fn resolve(&self, url: &str) -> Result<String, PageError> {
        let base = self
            .document
            .base_uri()
            .map_err(|e| PageError::ModuleLoad(describe(&e)))?;
        let Some(base) = base else {
            return Ok(url.to_string());
        };
        web_sys::Url::new_with_base(url, &base)
            .map(|u| u.href())
            .map_err(|e| PageError::ModuleLoad(describe(&e)))
    }
}

impl ModuleLoader for WebModuleLoader {
    async fn load_and_init(&self, url: &str, init_export: &str) -> Result<(), PageError> {
        let href = self.resolve(url)?;
        info!("game: importing {href}");

        let promise = dynamic_import(&href).map_err(|e| PageError::ModuleLoad(describe(&e)))?;
        let module = JsFuture::from(promise)
            .await
            .map_err(|e| PageError::ModuleLoad(describe(&e)))?;

        let init = js_sys::Reflect::get(&module, &JsValue::from_str(init_export))
            .map_err(|e| PageError::ModuleInit(describe(&e)))?
            .dyn_into::<js_sys::Function>()
            .map_err(|_| {
                PageError::ModuleInit(format!("export `{init_export}` is not a function"))
            })?;

        let ret = init
            .call0(&module)
            .map_err(|e| PageError::ModuleInit(describe(&e)))?;
        JsFuture::from(js_sys::Promise::resolve(&ret))
            .await
            .map_err(|e| PageError::ModuleInit(describe(&e)))?;
        Ok(())
    }
}
