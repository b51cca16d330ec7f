//! PageText: one rendered page's text layer plus its viewport transform
//!
//! Ties the scanner, anchor locator, and mapper together for the two
//! highlight flows: glossary terms (per-run boxes) and anchor phrases
//! (one union box).

use serde::{Deserialize, Serialize};

use super::mapper::{RangeMapper, TermRect};
use super::measure::WidthMeasurer;
use super::types::{page_text, Rect, TextRun};
use super::viewport::{PageViewport, ViewportTransform};
use crate::config::LocatorConfig;
use crate::matcher::{scan, AnchorLocator, AnchorRange, BuildOptions, TermAutomaton, TermMatch};

/// Located anchor: the text range and its viewport box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorRect {
    pub range: AnchorRange,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    pub runs: Vec<TextRun>,
    pub transform: ViewportTransform,
}

impl PageText {
    pub fn new(runs: Vec<TextRun>, transform: ViewportTransform) -> Self {
        Self { runs, transform }
    }

    pub fn with_viewport(runs: Vec<TextRun>, viewport: &PageViewport) -> Self {
        Self::new(runs, viewport.transform)
    }

    /// The scanned buffer: run strings concatenated in order
    pub fn text(&self) -> String {
        page_text(&self.runs)
    }

    pub fn mapper<'a>(&'a self, measurer: Option<&'a dyn WidthMeasurer>) -> RangeMapper<'a> {
        RangeMapper::new(&self.runs, self.transform, measurer)
    }

    /// Scan the page for `terms` in-thread and map every hit to per-run boxes
    pub fn term_rects<S: AsRef<str>>(
        &self,
        terms: &[S],
        config: &LocatorConfig,
        measurer: Option<&dyn WidthMeasurer>,
    ) -> Vec<TermRect> {
        let automaton = TermAutomaton::build_with(
            terms.iter().map(AsRef::as_ref),
            BuildOptions { trim: config.trim_patterns },
        );
        let matches = scan(&self.text(), &automaton);
        self.term_rects_for(&matches, measurer)
    }

    /// Map matches produced elsewhere (e.g. by the background service)
    pub fn term_rects_for(&self, matches: &[TermMatch], measurer: Option<&dyn WidthMeasurer>) -> Vec<TermRect> {
        self.mapper(measurer).map_matches(matches)
    }

    /// Locate `anchor` (exact, then prefix) and return its union box
    pub fn anchor_rect(
        &self,
        anchor: &str,
        config: &LocatorConfig,
        measurer: Option<&dyn WidthMeasurer>,
    ) -> Option<AnchorRect> {
        let range = AnchorLocator::from_config(config).locate(&self.text(), anchor)?;
        let rect = self.mapper(measurer).map_range(range.start, range.end)?;
        Some(AnchorRect { range, rect })
    }
}
