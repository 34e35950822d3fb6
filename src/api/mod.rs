//! JavaScript-facing WASM API
//!
//! This module is the outward boundary of the crate: an exported engine
//! instance class plus shared helpers for JsValue conversion. The calling
//! convention is documented on `HtmlLayoutEngine` — inputs are copied during
//! the call, outputs are freshly-allocated JS values owned by the caller,
//! font handles are positive integers with 0 as the universal failure
//! sentinel, and every layout call returns an envelope instead of throwing.

pub mod helpers;
pub mod instance;

pub use instance::HtmlLayoutEngine;
