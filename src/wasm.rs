// src/wasm.rs

use wasm_bindgen::prelude::*;
use js_sys::Array;
use web_sys::console;
use crate::{
    Document,
    GenerationConfig,
    formats::litematic,
    print_utils::format_document,
};

#[wasm_bindgen(start)]
pub fn start() {
    console::log_1(&"Initializing schematic assembler".into());
}

#[wasm_bindgen]
pub struct LitematicWrapper(pub(crate) Document);

#[wasm_bindgen]
impl LitematicWrapper {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        LitematicWrapper(Document::default())
    }

    pub fn from_litematic(&mut self, data: &[u8]) -> Result<(), JsValue> {
        self.0 = litematic::from_litematic(data)
            .map_err(|e| JsValue::from_str(&format!("Litematic parsing error: {}", e)))?;
        Ok(())
    }

    pub fn to_litematic(&self) -> Result<Vec<u8>, JsValue> {
        litematic::to_litematic(&self.0)
            .map_err(|e| JsValue::from_str(&format!("Litematic conversion error: {}", e)))
    }

    pub fn get_region_names(&self) -> Result<Array, JsValue> {
        let names = self.0.region_names()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(names.into_iter().map(|name| JsValue::from_str(&name)).collect::<Array>())
    }

    /// `config` is the plain JS object form of the generation config.
    pub fn generate(&self, config: JsValue, target_x: i32, target_z: i32) -> Result<LitematicWrapper, JsValue> {
        let config: GenerationConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Generation config error: {}", e)))?;
        config.apply(&self.0, target_x, target_z)
            .map(LitematicWrapper)
            .map_err(|e| JsValue::from_str(&format!("Generation error: {}", e)))
    }

    pub fn print_document(&self) -> String {
        format_document(&self.0)
    }
}

#[wasm_bindgen]
pub fn is_litematic(data: &[u8]) -> bool {
    litematic::is_litematic(data)
}

/// Bytes in, bytes out: decodes `data`, applies the JSON generation config and encodes the result.
#[wasm_bindgen]
pub fn generate_litematic(data: &[u8], config_json: &str, target_x: i32, target_z: i32) -> Result<Vec<u8>, JsValue> {
    let config = GenerationConfig::from_json(config_json)
        .map_err(|e| JsValue::from_str(&format!("Generation config error: {}", e)))?;
    crate::generate_litematic(data, &config, target_x, target_z)
        .map_err(|e| JsValue::from_str(&format!("Generation error: {}", e)))
}
