//! HTML Layout Engine WASM Module
//!
//! Boundary layer around an HTML/CSS layout engine: font registry with
//! memory accounting, layout request pipeline, output serialization in four
//! formats, and structured diagnostics. The JavaScript-facing surface lives
//! in `api`; everything below it is plain Rust and testable natively.

pub mod api;
pub mod diagnostics;
pub mod engine;
pub mod errors;
pub mod fonts;
pub mod layout;
pub mod serializer;
pub mod utils;

// Re-export the types hosts and tests reach for most often
pub use api::HtmlLayoutEngine;
pub use diagnostics::Envelope;
pub use engine::{EngineCore, LayoutOptions};
pub use errors::{ErrorCode, ErrorEntry, Severity};
pub use serializer::OutputMode;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("HTML layout engine module initialized (v{})", env!("CARGO_PKG_VERSION"));
}
