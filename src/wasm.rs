//! WASM bindings
//!
//! `TermLocator` is the main-thread surface (geometry + anchor lookup);
//! `handleWorkerMessage` (or `TermLocator.handleMessage`, which applies the
//! locator's `trimPatterns`) is the Web Worker side of the search protocol.
//!
//! # Usage (JavaScript)
//! ```javascript,ignore
//! // worker.js
//! import init, { handleWorkerMessage } from 'glosscore';
//! await init();
//! self.onmessage = (e) => {
//!   const reply = handleWorkerMessage(e.data);
//!   if (reply !== undefined) self.postMessage(reply);
//! };
//!
//! // main thread
//! const locator = new TermLocator();
//! const rects = locator.mapMatches(runs, matches, viewport.transform, measure);
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::config::{GlossConfig, LocatorConfig};
use crate::geometry::{page_text, FontStyles, PageViewport, RangeMapper, Rotation, TextRun, ViewportTransform, WidthMeasurer};
use crate::matcher::{scan, AnchorLocator, BuildOptions, TermAutomaton, TermMatch};
use crate::service::protocol::{decode_value, handle_search_with, OutboundMessage};

// =============================================================================
// Helpers
// =============================================================================

fn js_err(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

fn parse_transform(values: &[f64]) -> Result<ViewportTransform, JsValue> {
    match values.len() {
        0 => Ok(ViewportTransform::IDENTITY),
        6 => Ok(ViewportTransform([
            values[0], values[1], values[2], values[3], values[4], values[5],
        ])),
        n => Err(JsValue::from_str(&format!(
            "Invalid transform: expected 6 numbers, got {}",
            n
        ))),
    }
}

fn parse_runs(runs: JsValue) -> Result<Vec<TextRun>, JsValue> {
    serde_wasm_bindgen::from_value(runs).map_err(|e| js_err("Invalid runs", e))
}

/// Text-layer style record (`{ fontFamily }` keyed by font name)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextStyle {
    #[serde(default)]
    font_family: Option<String>,
}

/// Families of the styles that name one; the rest resolve to the default
fn font_styles_from(styles: HashMap<String, TextStyle>) -> FontStyles {
    let mut resolved = FontStyles::new();
    for (font_key, style) in styles {
        if let Some(family) = style.font_family {
            resolved.insert(font_key, family);
        }
    }
    resolved
}

/// Answer a decoded wire value; `None` for anything that is not a search
fn answer(value: serde_json::Value, options: BuildOptions) -> Option<OutboundMessage> {
    match decode_value(value) {
        Ok(Some(request)) => Some(OutboundMessage::Result(handle_search_with(request, options))),
        Ok(None) => None,
        Err(e) => {
            log::warn!("dropping worker message: {}", e);
            None
        }
    }
}

fn respond(message: JsValue, options: BuildOptions) -> Result<JsValue, JsValue> {
    let value: serde_json::Value = match serde_wasm_bindgen::from_value(message) {
        Ok(value) => value,
        Err(_) => return Ok(JsValue::UNDEFINED),
    };
    match answer(value, options) {
        Some(response) => serde_wasm_bindgen::to_value(&response).map_err(|e| js_err("Serialization error", e)),
        None => Ok(JsValue::UNDEFINED),
    }
}

/// Calls a JS `measure(text, fontFamily)` callback
struct JsMeasurer<'a> {
    measure: &'a js_sys::Function,
}

impl WidthMeasurer for JsMeasurer<'_> {
    fn measure(&self, text: &str, font_key: &str) -> f64 {
        match self
            .measure
            .call2(&JsValue::NULL, &JsValue::from_str(text), &JsValue::from_str(font_key))
        {
            Ok(width) => width.as_f64().unwrap_or(0.0),
            Err(e) => {
                web_sys::console::warn_2(&"[TermLocator] measure callback failed".into(), &e);
                // Non-positive width falls back to uniform placement
                0.0
            }
        }
    }
}

// =============================================================================
// TermLocator
// =============================================================================

/// Glossary highlighter + anchor locator for one document session
#[wasm_bindgen]
pub struct TermLocator {
    config: LocatorConfig,
    automaton: TermAutomaton,
    styles: FontStyles,
}

#[wasm_bindgen]
impl TermLocator {
    /// Create a locator with optional `LocatorConfig` JSON object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TermLocator, JsValue> {
        let config: LocatorConfig = if config.is_null() || config.is_undefined() {
            LocatorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| js_err("Invalid config", e))?
        };
        GlossConfig {
            locator: config.clone(),
            ..GlossConfig::default()
        }
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self {
            config,
            automaton: TermAutomaton::build(Vec::<String>::new()),
            styles: FontStyles::new(),
        })
    }

    /// Replace the glossary; returns the number of distinct terms
    #[wasm_bindgen(js_name = setTerms)]
    pub fn set_terms(&mut self, terms: JsValue) -> Result<usize, JsValue> {
        let terms: Vec<String> =
            serde_wasm_bindgen::from_value(terms).map_err(|e| js_err("Invalid terms", e))?;
        self.automaton = TermAutomaton::build_with(&terms, BuildOptions { trim: self.config.trim_patterns });
        Ok(self.automaton.pattern_count())
    }

    #[wasm_bindgen(js_name = patternCount)]
    pub fn pattern_count(&self) -> usize {
        self.automaton.pattern_count()
    }

    /// Register text-layer styles (`Record<fontName, { fontFamily }>`)
    #[wasm_bindgen(js_name = setFontStyles)]
    pub fn set_font_styles(&mut self, styles: JsValue) -> Result<(), JsValue> {
        let styles: HashMap<String, TextStyle> =
            serde_wasm_bindgen::from_value(styles).map_err(|e| js_err("Invalid styles", e))?;
        self.styles = font_styles_from(styles);
        Ok(())
    }

    /// Scan `text` with the current glossary (main-thread fallback)
    pub fn search(&self, text: &str) -> Result<JsValue, JsValue> {
        let matches = scan(text, &self.automaton);
        serde_wasm_bindgen::to_value(&matches).map_err(|e| js_err("Serialization error", e))
    }

    /// Worker-side handler honoring this locator's `trimPatterns`:
    /// answers `search` with `result`, returns undefined otherwise
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&self, message: JsValue) -> Result<JsValue, JsValue> {
        respond(message, BuildOptions { trim: self.config.trim_patterns })
    }

    /// Union rectangle for `[start, end)`, or undefined
    #[wasm_bindgen(js_name = mapRange)]
    pub fn map_range(
        &self,
        runs: JsValue,
        start: usize,
        end: usize,
        transform: Vec<f64>,
        measure: Option<js_sys::Function>,
    ) -> Result<JsValue, JsValue> {
        let runs = parse_runs(runs)?;
        let transform = parse_transform(&transform)?;
        let rect = self.with_mapper(&runs, transform, measure.as_ref(), |mapper| mapper.map_range(start, end));
        serde_wasm_bindgen::to_value(&rect).map_err(|e| js_err("Serialization error", e))
    }

    /// Per-run `{ term, rect }` boxes for matches from the worker
    #[wasm_bindgen(js_name = mapMatches)]
    pub fn map_matches(
        &self,
        runs: JsValue,
        matches: JsValue,
        transform: Vec<f64>,
        measure: Option<js_sys::Function>,
    ) -> Result<JsValue, JsValue> {
        let runs = parse_runs(runs)?;
        let matches: Vec<TermMatch> =
            serde_wasm_bindgen::from_value(matches).map_err(|e| js_err("Invalid matches", e))?;
        let transform = parse_transform(&transform)?;
        let rects = self.with_mapper(&runs, transform, measure.as_ref(), |mapper| mapper.map_matches(&matches));
        serde_wasm_bindgen::to_value(&rects).map_err(|e| js_err("Serialization error", e))
    }

    /// Scan the page runs with the current glossary and map hits in one call
    #[wasm_bindgen(js_name = findTermRects)]
    pub fn find_term_rects(
        &self,
        runs: JsValue,
        transform: Vec<f64>,
        measure: Option<js_sys::Function>,
    ) -> Result<JsValue, JsValue> {
        let runs = parse_runs(runs)?;
        let transform = parse_transform(&transform)?;
        let text = page_text(&runs);
        let matches = scan(&text, &self.automaton);
        let rects = self.with_mapper(&runs, transform, measure.as_ref(), |mapper| mapper.map_matches(&matches));
        serde_wasm_bindgen::to_value(&rects).map_err(|e| js_err("Serialization error", e))
    }

    /// Exact-then-prefix anchor lookup: `{ start, end, partial }` or undefined
    #[wasm_bindgen(js_name = locateAnchor)]
    pub fn locate_anchor(&self, text: &str, anchor: &str) -> Result<JsValue, JsValue> {
        let range = AnchorLocator::from_config(&self.config).locate(text, anchor);
        serde_wasm_bindgen::to_value(&range).map_err(|e| js_err("Serialization error", e))
    }

    /// Locate `anchor` in the page runs and return its union box, or undefined
    #[wasm_bindgen(js_name = findAnchorRect)]
    pub fn find_anchor_rect(
        &self,
        runs: JsValue,
        anchor: &str,
        transform: Vec<f64>,
        measure: Option<js_sys::Function>,
    ) -> Result<JsValue, JsValue> {
        let runs = parse_runs(runs)?;
        let transform = parse_transform(&transform)?;
        let text = page_text(&runs);
        let rect = AnchorLocator::from_config(&self.config)
            .locate(&text, anchor)
            .and_then(|range| {
                self.with_mapper(&runs, transform, measure.as_ref(), |mapper| {
                    mapper.map_range(range.start, range.end)
                })
            });
        serde_wasm_bindgen::to_value(&rect).map_err(|e| js_err("Serialization error", e))
    }
}

impl TermLocator {
    /// Run `f` with a mapper whose measurer (if any) resolves font names
    /// through the registered styles before calling back into JS
    fn with_mapper<T>(
        &self,
        runs: &[TextRun],
        transform: ViewportTransform,
        measure: Option<&js_sys::Function>,
        f: impl FnOnce(&RangeMapper<'_>) -> T,
    ) -> T {
        match measure {
            Some(measure) => {
                let js = JsMeasurer { measure };
                let styled = crate::geometry::StyledMeasurer { styles: &self.styles, inner: &js };
                let mapper = RangeMapper::new(runs, transform, Some(&styled));
                f(&mapper)
            }
            None => f(&RangeMapper::new(runs, transform, None)),
        }
    }
}

// =============================================================================
// Free functions
// =============================================================================

/// Worker-side message handler: answers `search`, returns undefined otherwise
#[wasm_bindgen(js_name = handleWorkerMessage)]
pub fn handle_worker_message(message: JsValue) -> Result<JsValue, JsValue> {
    respond(message, BuildOptions::default())
}

/// Page → viewport transform `[a, b, c, d, e, f]` for a view box, scale, rotation
#[wasm_bindgen(js_name = pageViewportTransform)]
pub fn page_viewport_transform(view_box: Vec<f64>, scale: f64, rotation: i32) -> Result<Vec<f64>, JsValue> {
    if view_box.len() != 4 {
        return Err(JsValue::from_str("Invalid view box: expected 4 numbers"));
    }
    let viewport = PageViewport::new(
        [view_box[0], view_box[1], view_box[2], view_box[3]],
        scale,
        Rotation::from_degrees(rotation),
    );
    Ok(viewport.transform.0.to_vec())
}
