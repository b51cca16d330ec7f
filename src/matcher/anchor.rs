//! AnchorLocator: exact-then-prefix lookup of a single anchor phrase
//!
//! Anchor phrases come from an external suggester and may drift from the
//! extracted page text (collapsed whitespace, truncated tokens). The locator
//! tries the trimmed anchor verbatim, then a bounded prefix of it. Short
//! prefixes are never tried on their own.

use serde::{Deserialize, Serialize};

use super::utf16::{find_utf16, len_utf16, slice_utf16, trim_js};
use crate::config::LocatorConfig;

/// Half-open UTF-16 range located in the page text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRange {
    pub start: usize,
    pub end: usize,
    /// True when only a prefix of the anchor matched
    pub partial: bool,
}

impl AnchorRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Exact/prefix anchor lookup with configurable thresholds
#[derive(Debug, Clone)]
pub struct AnchorLocator {
    min_prefix_len: usize,
    prefix_len: usize,
}

impl Default for AnchorLocator {
    fn default() -> Self {
        Self::from_config(&LocatorConfig::default())
    }
}

impl AnchorLocator {
    pub fn from_config(config: &LocatorConfig) -> Self {
        Self {
            min_prefix_len: config.anchor_min_prefix_len,
            prefix_len: config.anchor_prefix_len,
        }
    }

    /// Locate `anchor` in `text`. `None` means "not locatable".
    pub fn locate(&self, text: &str, anchor: &str) -> Option<AnchorRange> {
        let search = trim_js(anchor);
        if search.is_empty() {
            return None;
        }

        if let Some(start) = find_utf16(text, search) {
            return Some(AnchorRange {
                start,
                end: start + len_utf16(search),
                partial: false,
            });
        }

        // Prefix recovery; the threshold applies to the trimmed prefix itself
        let head = trim_js(slice_utf16(search, 0, self.prefix_len));
        let head_len = len_utf16(head);
        if head_len < self.min_prefix_len {
            return None;
        }

        let start = find_utf16(text, head)?;
        log::debug!(
            "Anchor matched by prefix ({} of {} units) at {}",
            head_len,
            len_utf16(search),
            start
        );
        Some(AnchorRange {
            start,
            end: start + head_len,
            partial: true,
        })
    }
}

/// Locate with default thresholds
pub fn locate(text: &str, anchor: &str) -> Option<AnchorRange> {
    AnchorLocator::default().locate(text, anchor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let range = locate("The quick brown fox", "The quick brown fox").unwrap();
        assert_eq!((range.start, range.end), (0, 19));
        assert!(!range.partial);
    }

    #[test]
    fn test_anchor_is_trimmed() {
        let range = locate("a quick fox", "  quick ").unwrap();
        assert_eq!((range.start, range.end), (2, 7));
    }

    #[test]
    fn test_short_anchor_below_prefix_threshold_is_not_found() {
        // 19 units: exact search fails on the doubled space and the anchor is
        // too short for prefix recovery (threshold 20)
        assert_eq!(locate("The  quick brown fox", "The quick brown fox"), None);
    }

    #[test]
    fn test_prefix_recovery_covers_only_prefix() {
        let text = "Transformers scale well with data. The rest differs here.";
        let anchor = "Transformers scale well with data. The rest is different";
        // Default prefix (100 units) swallows the whole anchor, so it still fails
        assert_eq!(locate(text, anchor), None);

        let locator = AnchorLocator::from_config(&LocatorConfig {
            anchor_prefix_len: 34,
            ..LocatorConfig::default()
        });
        let range = locator.locate(text, anchor).unwrap();
        assert_eq!((range.start, range.end), (0, 34));
        assert!(range.partial);
    }

    #[test]
    fn test_prefix_longer_than_cutoff() {
        let sentence = "x".repeat(100);
        let text = format!("intro {} outro", sentence);
        let anchor = format!("{}yyyy", sentence);
        let range = locate(&text, &anchor).unwrap();
        assert_eq!((range.start, range.end), (6, 106));
        assert!(range.partial);
    }

    #[test]
    fn test_trailing_space_in_prefix_is_trimmed_below_threshold() {
        // Prefix of 20 units ends in a space; trimmed to 19 -> below threshold
        let locator = AnchorLocator::from_config(&LocatorConfig {
            anchor_prefix_len: 20,
            ..LocatorConfig::default()
        });
        let anchor = "abcdefghijklmnopqrs tuvwxyz";
        assert_eq!(locator.locate("abcdefghijklmnopqrs!", anchor), None);
    }

    #[test]
    fn test_empty_anchor() {
        assert_eq!(locate("anything", "   "), None);
    }

    #[test]
    fn test_byte_order_mark_anchor() {
        assert_eq!(locate("\u{FEFF}x", "\u{FEFF}"), None);
        let range = locate("say hello", "\u{FEFF}hello ").unwrap();
        assert_eq!((range.start, range.end), (4, 9));
    }

    #[test]
    fn test_inverted_range_len_is_zero() {
        let range: AnchorRange = serde_json::from_str(r#"{"start":5,"end":2,"partial":false}"#).unwrap();
        assert_eq!(range.len(), 0);
        assert!(range.is_empty());
    }

    #[test]
    fn test_offsets_in_utf16() {
        let range = locate("\u{1D400}显存带宽", "显存").unwrap();
        assert_eq!((range.start, range.end), (2, 4));
    }
}
