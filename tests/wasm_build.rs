//! WASM build test
//!
//! Exercises the exported boundary class in a browser environment: the
//! JsValue conversions and the envelope contract, not the layout logic
//! (that is covered by the native tests).

#![cfg(target_arch = "wasm32")]

use layout_wasm::HtmlLayoutEngine;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn engine_creation() {
    let engine = HtmlLayoutEngine::new();
    assert_eq!(engine.total_memory_usage(), 0.0);
    assert!(!engine.get_debug_mode());
}

#[wasm_bindgen_test]
fn font_load_and_sentinel() {
    let mut engine = HtmlLayoutEngine::new();
    let id = engine.load_font(&[0x42; 128], "wasm-test");
    assert_eq!(id, 1);
    assert_eq!(engine.total_memory_usage(), 128.0);

    // empty data: the 0 sentinel, never an exception
    let failed = engine.load_font(&[], "empty");
    assert_eq!(failed, 0);
}

#[wasm_bindgen_test]
fn layout_returns_envelope_never_throws() {
    let mut engine = HtmlLayoutEngine::new();
    engine.load_font(&[0x42; 128], "wasm-test");

    let options = js_sys::Object::new();
    js_sys::Reflect::set(
        &options,
        &JsValue::from_str("viewportWidth"),
        &JsValue::from_f64(800.0),
    )
    .unwrap();

    let result = engine.layout("<p>hello</p>", options.into());
    let success = js_sys::Reflect::get(&result, &JsValue::from_str("success")).unwrap();
    assert_eq!(success.as_bool(), Some(true));
}

#[wasm_bindgen_test]
fn null_options_yield_validation_envelope() {
    let mut engine = HtmlLayoutEngine::new();
    engine.load_font(&[0x42; 128], "wasm-test");

    // defaulted options lack viewportWidth: structured failure, no throw
    let result = engine.layout("<p>hello</p>", JsValue::NULL);
    let success = js_sys::Reflect::get(&result, &JsValue::from_str("success")).unwrap();
    assert_eq!(success.as_bool(), Some(false));
}

#[wasm_bindgen_test]
fn destroy_makes_instance_inert() {
    let mut engine = HtmlLayoutEngine::new();
    engine.load_font(&[0x42; 128], "wasm-test");
    engine.destroy();
    assert_eq!(engine.total_memory_usage(), 0.0);
    assert_eq!(engine.load_font(&[0x42; 128], "late"), 0);
}

#[wasm_bindgen_test]
fn version_is_exposed() {
    let engine = HtmlLayoutEngine::new();
    assert!(!engine.get_version().is_empty());
}
