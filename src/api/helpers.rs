//! Shared helpers for WASM API operations
//!
//! Common patterns for serialization, deserialization, and error handling
//! across the boundary methods. Conversion failures are logged and turned
//! into structured values; boundary methods never throw into the host.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::diagnostics::Envelope;
use crate::errors::ErrorCode;

/// Deserialize a value from JavaScript with automatic error handling.
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, String> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log::error!("{}", msg);
        msg
    })
}

/// Serialize a value to JavaScript with automatic error handling.
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, String> {
    serde_wasm_bindgen::to_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log::error!("{}", msg);
        msg
    })
}

/// Serialize a value, collapsing conversion failure to JS `null`.
///
/// Used for read-only surfaces (font lists, metrics) where the host treats
/// null as "unavailable".
pub fn serialize_or_null<T: Serialize>(value: &T, error_context: &str) -> JsValue {
    serialize(value, error_context).unwrap_or(JsValue::NULL)
}

/// Convert an envelope to a JS value, upholding the always-an-envelope
/// contract even when conversion itself fails.
pub fn envelope_to_js(envelope: &Envelope) -> JsValue {
    match serde_wasm_bindgen::to_value(envelope) {
        Ok(value) => value,
        Err(e) => {
            log::error!("envelope serialization failed: {}", e);
            let fallback = Envelope::failure(
                ErrorCode::SerializationFailed,
                format!("Failed to serialize result envelope: {}", e),
            );
            serde_wasm_bindgen::to_value(&fallback).unwrap_or(JsValue::NULL)
        }
    }
}
