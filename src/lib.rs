//! GlossCore: Term/Anchor Localization Engine
//!
//! A Rust/WASM implementation of the reading-assistant highlight core: find
//! glossary terms and anchor phrases in a page's extracted text, then place
//! highlight rectangles over the rendered glyphs.
//!
//! # Architecture
//!
//! ## Matcher
//! - `automaton.rs` - TermAutomaton: Aho-Corasick trie, failure links, closed output sets
//! - `scan.rs` - Single-pass scanner reporting every (term, start, end), overlaps included
//! - `anchor.rs` - AnchorLocator: exact-then-prefix lookup for one anchor phrase
//! - `utf16.rs` - UTF-16 offset helpers (offsets match JS string indices)
//!
//! ## Geometry
//! - `types.rs` - Rect, TextRun, run spans over the page buffer
//! - `viewport.rs` - Page → viewport affine transform (scale, rotation, y flip)
//! - `measure.rs` - WidthMeasurer for proportional-font sub-run placement
//! - `mapper.rs` - RangeMapper: offsets → union box or per-run boxes
//! - `page.rs` - PageText: term and anchor highlight flows for one page
//!
//! ## Service
//! - `protocol.rs` - `search`/`result` wire messages + worker-side dispatch
//! - `worker.rs` / `client.rs` - MatchService: background scan thread (native)
//!
//! # Usage (Rust)
//! ```rust,ignore
//! let page = PageText::with_viewport(runs, &PageViewport::upright(612.0, 792.0, 1.5));
//! let boxes = page.term_rects(&["GPU", "GPU memory"], &LocatorConfig::default(), None);
//! let anchor = page.anchor_rect("trains on GPU memory", &LocatorConfig::default(), None);
//! ```

pub mod config;
pub mod error;
pub mod matcher;
pub mod geometry;
pub mod service;
pub mod wasm;

pub use config::*;
pub use error::*;
pub use matcher::*;
pub use geometry::*;
pub use service::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("glosscore v{}", env!("CARGO_PKG_VERSION"))
}
