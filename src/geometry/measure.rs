//! Width measurement for proportional-font sub-run placement
//!
//! The mapper only needs ratios of substring width to full-run width, so a
//! measurer may work in any unit as long as it is consistent per font key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Measures the rendered advance width of `text` in the font `font_key`
pub trait WidthMeasurer {
    fn measure(&self, text: &str, font_key: &str) -> f64;
}

impl<F> WidthMeasurer for F
where
    F: Fn(&str, &str) -> f64,
{
    fn measure(&self, text: &str, font_key: &str) -> f64 {
        self(text, font_key)
    }
}

/// Per-font advance tables with a default advance for unknown glyphs
#[derive(Debug, Clone, Default)]
pub struct AdvanceTableMeasurer {
    fonts: HashMap<String, FontAdvances>,
    fallback_advance: f64,
}

#[derive(Debug, Clone, Default)]
struct FontAdvances {
    glyphs: HashMap<char, f64>,
    default_advance: f64,
}

impl AdvanceTableMeasurer {
    /// `fallback_advance` applies to every glyph of an unregistered font
    pub fn new(fallback_advance: f64) -> Self {
        Self {
            fonts: HashMap::new(),
            fallback_advance,
        }
    }

    /// Register (or replace) a font's advance table
    pub fn with_font<I>(mut self, font_key: &str, default_advance: f64, glyphs: I) -> Self
    where
        I: IntoIterator<Item = (char, f64)>,
    {
        self.fonts.insert(
            font_key.to_string(),
            FontAdvances {
                glyphs: glyphs.into_iter().collect(),
                default_advance,
            },
        );
        self
    }
}

impl WidthMeasurer for AdvanceTableMeasurer {
    fn measure(&self, text: &str, font_key: &str) -> f64 {
        match self.fonts.get(font_key) {
            Some(font) => text
                .chars()
                .map(|c| font.glyphs.get(&c).copied().unwrap_or(font.default_advance))
                .sum(),
            None => text.chars().count() as f64 * self.fallback_advance,
        }
    }
}

/// Font key → style lookup for text-layer font names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontStyles {
    #[serde(default)]
    families: HashMap<String, String>,
}

pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

impl FontStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, font_key: impl Into<String>, family: impl Into<String>) {
        self.families.insert(font_key.into(), family.into());
    }

    /// Resolved family, `sans-serif` when the key is unknown
    pub fn family(&self, font_key: &str) -> &str {
        self.families
            .get(font_key)
            .map(String::as_str)
            .unwrap_or(DEFAULT_FONT_FAMILY)
    }
}

/// Measurer adapter that resolves text-layer font names to families first
pub struct StyledMeasurer<'a, M: WidthMeasurer + ?Sized> {
    pub styles: &'a FontStyles,
    pub inner: &'a M,
}

impl<M: WidthMeasurer + ?Sized> WidthMeasurer for StyledMeasurer<'_, M> {
    fn measure(&self, text: &str, font_key: &str) -> f64 {
        self.inner.measure(text, self.styles.family(font_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_measurer() {
        let m = |text: &str, _: &str| text.len() as f64 * 2.0;
        assert_eq!(m.measure("abc", "any"), 6.0);
    }

    #[test]
    fn test_advance_table() {
        let m = AdvanceTableMeasurer::new(5.0).with_font("serif", 6.0, [('i', 2.0), ('m', 10.0)]);
        assert_eq!(m.measure("mi", "serif"), 12.0);
        assert_eq!(m.measure("mx", "serif"), 16.0);
        assert_eq!(m.measure("mx", "unknown"), 10.0);
        assert_eq!(m.measure("", "serif"), 0.0);
    }

    #[test]
    fn test_font_styles_resolution() {
        let mut styles = FontStyles::new();
        styles.insert("g_d0_f1", "serif");
        assert_eq!(styles.family("g_d0_f1"), "serif");
        assert_eq!(styles.family("g_d0_f9"), "sans-serif");
    }

    #[test]
    fn test_styled_measurer_passes_family() {
        let mut styles = FontStyles::new();
        styles.insert("f1", "mono");
        let inner = |_: &str, family: &str| if family == "mono" { 1.0 } else { 0.0 };
        let styled = StyledMeasurer { styles: &styles, inner: &inner };
        assert_eq!(styled.measure("x", "f1"), 1.0);
        assert_eq!(styled.measure("x", "f2"), 0.0);
    }
}
