//! RangeMapper: character offsets → viewport rectangles
//!
//! Walks the page's text runs, clips each overlapping run to the requested
//! range, and places the clipped slice horizontally by measured width (or a
//! uniform per-unit width when no measurer is available).
//!
//! Two policies:
//! - `map_range` unions every run contribution into one box (anchor phrases).
//! - `map_matches` keeps one box per run contribution (glossary terms), so a
//!   term that straddles a line break never produces a box spanning both lines.

use serde::{Deserialize, Serialize};

use super::measure::WidthMeasurer;
use super::types::{run_spans, BoundsAccumulator, Rect, RunSpan, TextRun};
use super::viewport::ViewportTransform;
use crate::matcher::utf16::slice_utf16;
use crate::matcher::TermMatch;

/// A rectangle contributed by a single run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunRect {
    pub run_index: usize,
    pub rect: Rect,
}

/// A highlight box for one term occurrence (or one run-slice of it)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRect {
    pub term: String,
    pub rect: Rect,
}

/// Maps UTF-16 ranges of a page buffer onto viewport geometry.
///
/// Borrows the runs for the duration of the mapping only.
pub struct RangeMapper<'a> {
    runs: &'a [TextRun],
    spans: Vec<RunSpan>,
    transform: ViewportTransform,
    measurer: Option<&'a dyn WidthMeasurer>,
}

impl<'a> RangeMapper<'a> {
    pub fn new(
        runs: &'a [TextRun],
        transform: ViewportTransform,
        measurer: Option<&'a dyn WidthMeasurer>,
    ) -> Self {
        let spans = run_spans(runs).map(|(_, span)| span).collect();
        Self {
            runs,
            spans,
            transform,
            measurer,
        }
    }

    /// Length of the page buffer in UTF-16 units
    pub fn text_len(&self) -> usize {
        self.spans.last().map(|s| s.end).unwrap_or(0)
    }

    /// One rectangle per run overlapping `[start, end)`, in run order
    pub fn run_rects(&self, start: usize, end: usize) -> Vec<RunRect> {
        if start >= end {
            return Vec::new();
        }

        // First run whose span ends past `start`
        let first = self.spans.partition_point(|span| span.end <= start);

        self.spans[first..]
            .iter()
            .take_while(|span| span.start < end)
            .filter_map(|span| {
                let overlap_start = start.max(span.start);
                let overlap_end = end.min(span.end);
                if overlap_start >= overlap_end {
                    return None;
                }
                let run = &self.runs[span.index];
                let rect = self.slice_rect(run, overlap_start - span.start, overlap_end - overlap_start, span);
                Some(RunRect {
                    run_index: span.index,
                    rect,
                })
            })
            .collect()
    }

    /// Union box of every run overlapping `[start, end)`; `None` if no run overlaps
    pub fn map_range(&self, start: usize, end: usize) -> Option<Rect> {
        let mut bounds = BoundsAccumulator::default();
        for run_rect in self.run_rects(start, end) {
            bounds.add(run_rect.rect);
        }
        bounds.finish()
    }

    /// Per-run boxes for every match; matches that hit no run are omitted
    pub fn map_matches(&self, matches: &[TermMatch]) -> Vec<TermRect> {
        let mut out = Vec::with_capacity(matches.len());
        for m in matches {
            for run_rect in self.run_rects(m.start, m.end) {
                out.push(TermRect {
                    term: m.term.clone(),
                    rect: run_rect.rect,
                });
            }
        }
        out
    }

    /// Viewport box of `len` units starting `offset` units into `run`
    fn slice_rect(&self, run: &TextRun, offset: usize, len: usize, span: &RunSpan) -> Rect {
        let (frac_start, frac_len) = self.fractions(run, offset, len, span.end - span.start);

        let left = run.origin_x + frac_start * run.width;
        let right = left + frac_len * run.width;
        self.transform
            .convert_rect(left, run.origin_y - run.height, right, run.origin_y)
    }

    /// Horizontal position and extent of the slice as fractions of the run width
    fn fractions(&self, run: &TextRun, offset: usize, len: usize, run_len: usize) -> (f64, f64) {
        if let Some(measurer) = self.measurer {
            let full = measurer.measure(&run.text, &run.font_key);
            if full.is_finite() && full > 0.0 {
                let before = measurer.measure(slice_utf16(&run.text, 0, offset), &run.font_key);
                let inside = measurer.measure(slice_utf16(&run.text, offset, offset + len), &run.font_key);
                return (before / full, inside / full);
            }
        }
        let run_len = run_len as f64;
        (offset as f64 / run_len, len as f64 / run_len)
    }
}

/// Union rectangle for `[start, end)`; see [`RangeMapper::map_range`]
pub fn map_range(
    runs: &[TextRun],
    start: usize,
    end: usize,
    transform: ViewportTransform,
    measurer: Option<&dyn WidthMeasurer>,
) -> Option<Rect> {
    RangeMapper::new(runs, transform, measurer).map_range(start, end)
}

/// Per-run term rectangles; see [`RangeMapper::map_matches`]
pub fn map_matches(
    runs: &[TextRun],
    matches: &[TermMatch],
    transform: ViewportTransform,
    measurer: Option<&dyn WidthMeasurer>,
) -> Vec<TermRect> {
    RangeMapper::new(runs, transform, measurer).map_matches(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::measure::AdvanceTableMeasurer;
    use crate::geometry::viewport::PageViewport;

    const ID: ViewportTransform = ViewportTransform::IDENTITY;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn hello() -> Vec<TextRun> {
        vec![TextRun::new("hello", 0.0, 10.0, 50.0, 10.0, "f1")]
    }

    #[test]
    fn test_uniform_split_single_run() {
        let rect = map_range(&hello(), 1, 3, ID, None).unwrap();
        assert!(approx(rect.x, 10.0));
        assert!(approx(rect.width, 20.0));
        assert!(approx(rect.y, 0.0));
        assert!(approx(rect.height, 10.0));
    }

    #[test]
    fn test_out_of_range_is_none() {
        assert_eq!(map_range(&hello(), 5, 9, ID, None), None);
        assert_eq!(map_range(&hello(), 3, 3, ID, None), None);
        assert_eq!(map_range(&[], 0, 1, ID, None), None);
    }

    #[test]
    fn test_range_clipped_at_buffer_end() {
        let rect = map_range(&hello(), 3, 99, ID, None).unwrap();
        assert!(approx(rect.x, 30.0));
        assert!(approx(rect.width, 20.0));
    }

    #[test]
    fn test_measured_split_for_proportional_font() {
        // "mill": m=10, i=2, l=2 -> full 16
        let runs = vec![TextRun::new("mill", 0.0, 10.0, 32.0, 10.0, "serif")];
        let measurer = AdvanceTableMeasurer::new(5.0).with_font("serif", 5.0, [('m', 10.0), ('i', 2.0), ('l', 2.0)]);
        let rect = map_range(&runs, 1, 3, ID, Some(&measurer)).unwrap();
        // before = 10/16, inside = 4/16 of width 32
        assert!(approx(rect.x, 20.0));
        assert!(approx(rect.width, 8.0));

        let uniform = map_range(&runs, 1, 3, ID, None).unwrap();
        assert!(approx(uniform.x, 8.0));
        assert!(approx(uniform.width, 16.0));
    }

    #[test]
    fn test_zero_width_measure_falls_back_to_uniform() {
        let zero = |_: &str, _: &str| 0.0;
        let rect = map_range(&hello(), 1, 3, ID, Some(&zero)).unwrap();
        assert!(approx(rect.x, 10.0));
        assert!(approx(rect.width, 20.0));
    }

    #[test]
    fn test_multi_run_union() {
        // Two lines: "hello " on y=10 and "world" on y=30
        let runs = vec![
            TextRun::new("hello ", 0.0, 10.0, 60.0, 10.0, ""),
            TextRun::new("world", 0.0, 30.0, 50.0, 10.0, ""),
        ];
        let rect = map_range(&runs, 3, 8, ID, None).unwrap();
        assert!(approx(rect.x, 0.0));
        assert!(approx(rect.y, 0.0));
        assert!(approx(rect.right(), 60.0));
        assert!(approx(rect.bottom(), 30.0));
    }

    #[test]
    fn test_term_matches_stay_per_run() {
        let runs = vec![
            TextRun::new("GPU ", 0.0, 10.0, 40.0, 10.0, ""),
            TextRun::new("memory", 0.0, 30.0, 60.0, 10.0, ""),
        ];
        let matches = vec![TermMatch::new("GPU memory", 0, 10), TermMatch::new("GPU", 0, 3)];
        let rects = map_matches(&runs, &matches, ID, None);
        assert_eq!(rects.len(), 3);
        assert_eq!(rects[0].term, "GPU memory");
        assert!(approx(rects[0].rect.width, 40.0));
        assert_eq!(rects[1].term, "GPU memory");
        assert!(approx(rects[1].rect.y, 20.0));
        assert!(approx(rects[1].rect.width, 60.0));
        assert_eq!(rects[2].term, "GPU");
        assert!(approx(rects[2].rect.width, 30.0));
    }

    #[test]
    fn test_unlocatable_match_omitted() {
        let rects = map_matches(&hello(), &[TermMatch::new("zz", 40, 42)], ID, None);
        assert!(rects.is_empty());
    }

    #[test]
    fn test_empty_runs_are_skipped() {
        let runs = vec![
            TextRun::new("ab", 0.0, 10.0, 20.0, 10.0, ""),
            TextRun::new("", 99.0, 99.0, 0.0, 10.0, ""),
            TextRun::new("cd", 20.0, 10.0, 20.0, 10.0, ""),
        ];
        let mapper = RangeMapper::new(&runs, ID, None);
        let rects = mapper.run_rects(1, 3);
        assert_eq!(rects.iter().map(|r| r.run_index).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(mapper.text_len(), 4);
    }

    #[test]
    fn test_viewport_transform_applied() {
        let vp = PageViewport::upright(100.0, 100.0, 2.0);
        let rect = map_range(&hello(), 1, 3, vp.transform, None).unwrap();
        // Page box [10, 0] - [30, 10] -> viewport y flipped around height 200
        assert!(approx(rect.x, 20.0));
        assert!(approx(rect.y, 180.0));
        assert!(approx(rect.width, 40.0));
        assert!(approx(rect.height, 20.0));
    }

    #[test]
    fn test_surrogate_pair_measure_slices_whole_char() {
        let runs = vec![TextRun::new("a\u{1D400}b", 0.0, 10.0, 30.0, 10.0, "m")];
        let measurer = AdvanceTableMeasurer::new(10.0);
        let rect = map_range(&runs, 1, 3, ID, Some(&measurer)).unwrap();
        assert!(approx(rect.x, 10.0));
        assert!(approx(rect.width, 10.0));
    }
}
