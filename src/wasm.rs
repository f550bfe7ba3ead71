//! WASM bindings
//!
//! Exposes the pipeline to a browser front-end. The page creates a
//! `WasmCalculator`, calls `markLoading()` while it fetches patterns.json,
//! then `loadContent(json)` once the fetch resolves. `calculate` works in
//! every state and fills content sections with placeholders until then.

use wasm_bindgen::prelude::*;

use crate::core::{BirthForm, ContentStore, SajuConfig, SajuEngine};

#[wasm_bindgen]
pub struct WasmCalculator {
    engine: SajuEngine,
}

#[wasm_bindgen]
impl WasmCalculator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmCalculator {
        WasmCalculator {
            engine: SajuEngine::new(SajuConfig::default(), ContentStore::new()),
        }
    }

    /// Enter the Loading state
    #[wasm_bindgen(js_name = markLoading)]
    pub fn mark_loading(&mut self) {
        self.engine.content_mut().begin_loading();
    }

    /// Parse fetched content JSON. On error the store is `Failed`.
    #[wasm_bindgen(js_name = loadContent)]
    pub fn load_content(&mut self, json: &str) -> Result<(), JsValue> {
        self.engine
            .content_mut()
            .load_json(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Use the content compiled into the module
    #[wasm_bindgen(js_name = loadEmbedded)]
    pub fn load_embedded(&mut self) -> Result<(), JsValue> {
        self.load_content(crate::core::content::EMBEDDED_CONTENT)
    }

    #[wasm_bindgen(js_name = contentState)]
    pub fn content_state(&self) -> String {
        self.engine.content().state().label().to_string()
    }

    /// Full reading for a form object (camelCase fields)
    pub fn calculate(&self, form: JsValue) -> Result<JsValue, JsValue> {
        let form: BirthForm = serde_wasm_bindgen::from_value(form)?;
        let reading = self
            .engine
            .calculate(&form)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&reading).map_err(JsValue::from)
    }
}

impl Default for WasmCalculator {
    fn default() -> Self {
        Self::new()
    }
}
