//! Geometry primitives shared by the mapper and the JS bindings

use serde::{Deserialize, Serialize};

use crate::matcher::utf16::len_utf16;

/// Axis-aligned rectangle, `y` growing downward in viewport space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build from two corners in any order
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let (left, right) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (top, bottom) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Running union of rectangles; empty until the first `add`
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsAccumulator {
    bounds: Option<Rect>,
}

impl BoundsAccumulator {
    pub fn add(&mut self, rect: Rect) {
        self.bounds = Some(match self.bounds {
            Some(acc) => acc.union(&rect),
            None => rect,
        });
    }

    pub fn finish(self) -> Option<Rect> {
        self.bounds
    }
}

/// One positioned glyph run from the page's text layer
///
/// `origin_y` is the baseline in page space; the run box spans
/// `[origin_y - height, origin_y]` vertically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRun {
    pub text: String,
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub font_key: String,
}

impl TextRun {
    pub fn new(
        text: impl Into<String>,
        origin_x: f64,
        origin_y: f64,
        width: f64,
        height: f64,
        font_key: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            origin_x,
            origin_y,
            width,
            height,
            font_key: font_key.into(),
        }
    }

    /// Build from a text-layer item carrying a six-element text matrix;
    /// the origin is the matrix translation.
    pub fn from_text_matrix(
        text: impl Into<String>,
        matrix: &[f64],
        width: f64,
        height: f64,
        font_key: impl Into<String>,
    ) -> Self {
        let origin_x = matrix.get(4).copied().unwrap_or(0.0);
        let origin_y = matrix.get(5).copied().unwrap_or(0.0);
        Self::new(text, origin_x, origin_y, width, height, font_key)
    }

    /// Run length in UTF-16 code units
    pub fn len_utf16(&self) -> usize {
        len_utf16(&self.text)
    }
}

/// A run's slice of the page buffer, `[start, end)` in UTF-16 units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSpan {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

/// Walk `runs` yielding each run with its buffer span
pub fn run_spans(runs: &[TextRun]) -> impl Iterator<Item = (&TextRun, RunSpan)> + '_ {
    let mut offset = 0;
    runs.iter().enumerate().map(move |(index, run)| {
        let start = offset;
        offset += run.len_utf16();
        (run, RunSpan { index, start, end: offset })
    })
}

/// Concatenate run strings into the page buffer the scanner sees
pub fn page_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}
