use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

// ==================== Defaults ====================
mod defaults {
    pub const BACKGROUND: &str = "black";
    pub const BORDER_COLOR: &str = "black";
    pub const BORDER_WIDTH: f64 = 1.0;
    // one surface unit hides hairline gaps between neighbouring tiles
    pub const SEAM_PADDING: f64 = 1.0;
    pub const RESIZE_DEBOUNCE_MS: u32 = 100;
}

/// Render settings a host may override.
///
/// Accepted from JavaScript as a plain object, every field optional:
/// `{ background, borderColor, borderWidth, seamPadding, resizeDebounceMs }`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// CSS color painted outside the map bounds
    pub background: String,
    pub border_color: String,
    /// 0 disables the border stroke
    pub border_width: f64,
    /// extra surface units added to each sprite's destination width/height
    pub seam_padding: f64,
    pub resize_debounce_ms: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            background: defaults::BACKGROUND.to_string(),
            border_color: defaults::BORDER_COLOR.to_string(),
            border_width: defaults::BORDER_WIDTH,
            seam_padding: defaults::SEAM_PADDING,
            resize_debounce_ms: defaults::RESIZE_DEBOUNCE_MS,
        }
    }
}

impl RenderConfig {
    /// `undefined` / `null` fall back to the defaults.
    pub fn from_js(value: JsValue) -> Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|err| anyhow!("Invalid render config : {:#?}", err))
    }
}
