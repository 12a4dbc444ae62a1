//! Shared helpers for WASM API operations
//!
//! Console logging, config deserialization and error conversion used by the
//! JavaScript-facing functions.

use wasm_bindgen::prelude::*;

use crate::config::VizConfig;
use crate::error::MapVizError;

// ============================================================================
// Console Logging Functions
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn info(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    fn error(s: &str);
}

// ============================================================================
// Logging Macros
// ============================================================================

/// Log a debug message with [WASM] prefix
#[macro_export]
macro_rules! wasm_log {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_debug(&format!($($arg)*))
    };
}

/// Log an info message with [WASM] prefix
#[macro_export]
macro_rules! wasm_info {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_info(&format!($($arg)*))
    };
}

/// Log an error message with [WASM] ❌ prefix
#[macro_export]
macro_rules! wasm_error {
    ($($arg:tt)*) => {
        $crate::api::helpers::log_error(&format!($($arg)*))
    };
}

pub fn log_debug(msg: &str) {
    log(&format!("[WASM] {}", msg));
}

pub fn log_info(msg: &str) {
    info(&format!("[WASM] {}", msg));
}

pub fn log_error(msg: &str) {
    error(&format!("[WASM] ❌ {}", msg));
}

// ============================================================================
// Conversion Helpers
// ============================================================================

/// Deserialize a visualization config passed from JavaScript
pub fn deserialize_config(value: JsValue) -> Result<VizConfig, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("Invalid visualization config: {}", e);
        wasm_error!("{}", msg);
        js_sys::Error::new(&msg).into()
    })
}

/// Convert a crate error into a JavaScript `Error`
pub fn to_js_error(context: &str, err: MapVizError) -> JsValue {
    let msg = format!("{}: {}", context, err);
    wasm_error!("{}", msg);
    js_sys::Error::new(&msg).into()
}
