//! Exported engine instance
//!
//! One `HtmlLayoutEngine` owns one font registry, one default font id, and
//! one debug flag; instances are fully independent and single-threaded. The
//! host must not invoke two operations on the same instance concurrently —
//! no internal locking exists.
//!
//! Ownership across the boundary: byte and string inputs are copied during
//! the call and never retained; returned values are freshly allocated and
//! owned by the caller. Font handles are positive integers; 0 always means
//! "operation failed, no handle produced".

use wasm_bindgen::prelude::*;

use super::helpers;
use crate::engine::{EngineCore, LayoutOptions};
use crate::errors::ErrorCode;

#[wasm_bindgen]
pub struct HtmlLayoutEngine {
    core: EngineCore,
}

impl Default for HtmlLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl HtmlLayoutEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> HtmlLayoutEngine {
        HtmlLayoutEngine {
            core: EngineCore::new(),
        }
    }

    // ========================================================================
    // Font management
    // ========================================================================

    /// Register a font from binary data (TTF/OTF).
    ///
    /// Returns the font id (positive integer) on success, 0 on failure.
    /// The data is copied; the caller keeps ownership of its buffer.
    #[wasm_bindgen(js_name = loadFont)]
    pub fn load_font(&mut self, font_data: &[u8], font_name: &str) -> u32 {
        match self.core.register_font(font_data, font_name) {
            Ok(id) => id,
            Err(entry) => {
                log::error!("loadFont failed: {}", entry.message);
                0
            }
        }
    }

    /// Unload a font and release its memory immediately. Unknown ids are a
    /// no-op.
    #[wasm_bindgen(js_name = unloadFont)]
    pub fn unload_font(&mut self, font_id: u32) {
        self.core.unregister_font(font_id);
    }

    /// Set the default font for fallback resolution. Existence is validated
    /// at layout time, not here.
    #[wasm_bindgen(js_name = setDefaultFont)]
    pub fn set_default_font(&mut self, font_id: u32) {
        self.core.set_default_font(font_id);
    }

    /// Array of `{id, name, byteLength}` for every loaded font.
    #[wasm_bindgen(js_name = getLoadedFonts)]
    pub fn get_loaded_fonts(&self) -> JsValue {
        helpers::serialize_or_null(&self.core.list_fonts(), "getLoadedFonts")
    }

    /// Unload every font and release all buffers. Font ids are not reused
    /// afterwards.
    #[wasm_bindgen(js_name = clearAllFonts)]
    pub fn clear_all_fonts(&mut self) {
        self.core.clear_fonts();
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Lay out HTML and return the result envelope
    /// `{success, data, errors, warnings, metrics?}`.
    ///
    /// `options` is an object per the documented request options
    /// (`viewportWidth` is required). This method never throws; every
    /// failure is reported inside the envelope.
    #[wasm_bindgen(js_name = layout)]
    pub fn layout(&mut self, html: &str, options: JsValue) -> JsValue {
        let opts: LayoutOptions = if options.is_null() || options.is_undefined() {
            LayoutOptions::default()
        } else {
            match helpers::deserialize(options, "invalid layout options") {
                Ok(opts) => opts,
                Err(msg) => {
                    let env = crate::diagnostics::Envelope::failure(ErrorCode::InvalidOptions, msg);
                    return helpers::envelope_to_js(&env);
                }
            }
        };
        let envelope = self.core.layout(html, &opts);
        helpers::envelope_to_js(&envelope)
    }

    /// Envelope from the most recent layout call, or null before the first
    /// call.
    #[wasm_bindgen(js_name = getLastResult)]
    pub fn get_last_result(&self) -> JsValue {
        match self.core.last_envelope() {
            Some(env) => helpers::envelope_to_js(env),
            None => JsValue::NULL,
        }
    }

    /// Performance metrics from the most recent completed layout, recorded
    /// even when the request did not ask for metrics in its envelope. Null
    /// before the first completed layout.
    #[wasm_bindgen(js_name = getMetrics)]
    pub fn get_metrics(&self) -> JsValue {
        match self.core.last_metrics() {
            Some(metrics) => helpers::serialize_or_null(metrics, "getMetrics"),
            None => JsValue::NULL,
        }
    }

    // ========================================================================
    // Memory surface
    // ========================================================================

    /// Total font memory held by this instance, in bytes.
    #[wasm_bindgen(js_name = totalMemoryUsage)]
    pub fn total_memory_usage(&self) -> f64 {
        self.core.total_memory_usage() as f64
    }

    /// True when font memory exceeds the 50 MiB threshold.
    #[wasm_bindgen(js_name = checkMemoryThreshold)]
    pub fn check_memory_threshold(&mut self) -> bool {
        self.core.check_memory_threshold()
    }

    /// `{totalMemoryUsage, fontCount, fonts, thresholdExceeded}`.
    #[wasm_bindgen(js_name = getMemoryMetrics)]
    pub fn get_memory_metrics(&self) -> JsValue {
        helpers::serialize_or_null(&self.core.memory_metrics(), "getMemoryMetrics")
    }

    // ========================================================================
    // Advance cache
    // ========================================================================

    /// Glyph advance cache statistics.
    #[wasm_bindgen(js_name = getCacheStats)]
    pub fn get_cache_stats(&self) -> JsValue {
        helpers::serialize_or_null(&self.core.cache_stats(), "getCacheStats")
    }

    /// Reset hit/miss counters without dropping cached entries.
    #[wasm_bindgen(js_name = resetCacheStats)]
    pub fn reset_cache_stats(&mut self) {
        self.core.reset_cache_stats();
    }

    /// Drop all cached advances.
    #[wasm_bindgen(js_name = clearCache)]
    pub fn clear_cache(&mut self) {
        self.core.clear_cache();
    }

    // ========================================================================
    // Debug / lifecycle
    // ========================================================================

    /// Toggle verbose tracing for this instance.
    #[wasm_bindgen(js_name = setDebugMode)]
    pub fn set_debug_mode(&mut self, is_debug: bool) {
        self.core.set_debug(is_debug);
    }

    #[wasm_bindgen(js_name = getDebugMode)]
    pub fn get_debug_mode(&self) -> bool {
        self.core.debug()
    }

    /// Module version string.
    #[wasm_bindgen(js_name = getVersion)]
    pub fn get_version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Release every font buffer and all internal state. The instance is not
    /// reusable afterwards; construct a new one instead. Further calls fail
    /// structurally (envelopes with `INTERNAL_ERROR`, font ops return 0).
    #[wasm_bindgen(js_name = destroy)]
    pub fn destroy(&mut self) {
        self.core.destroy();
    }
}
