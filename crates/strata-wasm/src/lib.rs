//! Strata WASM - WebAssembly bindings for Strata
//!
//! This crate provides WASM bindings to expose the strata-core document,
//! crop and paintbrush to JavaScript/TypeScript editors.
//!
//! # Module Structure
//!
//! - `document` - Layered document with guides, sample points and crop
//! - `paint` - Paintbrush strokes over document layers and channels
//! - `console` - `log` output routed to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsDocument, JsPaintbrush, set_log_level } from '@strata/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//! set_log_level("debug");
//!
//! const doc = new JsDocument(640, 480);
//! const layer = doc.add_layer("Background", 0, 0, 640, 480, new Uint8Array());
//! const brush = new JsPaintbrush({ options: { brush_size: 8 } });
//! brush.begin(doc, layer, 10, 10, 1.0);
//! brush.stroke(doc, new Float64Array([20, 10, 0.8]));
//! brush.end(doc);
//! ```

use wasm_bindgen::prelude::*;

mod console;
mod document;
mod paint;

// Re-export public types
pub use document::JsDocument;
pub use paint::JsPaintbrush;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console::install(log::LevelFilter::Info);
}

/// Set the console log level: "off", "error", "warn", "info", "debug" or
/// "trace". Unknown names select "info".
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    console::install(console::parse_level(level));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
