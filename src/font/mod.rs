//! Glyph providers and per-style font sets
//!
//! Layout only talks to the [`GlyphProvider`] trait. Two implementations
//! ship with the crate: [`BitmapFont`], a deterministic built-in with the
//! game's advance widths, and [`TrueTypeFont`] backed by `fontdue`.

mod bitmap;
mod obfuscation;
mod truetype;

use std::fmt;
use std::sync::Arc;

pub use bitmap::{BitmapFont, Coverage};
pub use obfuscation::{ObfuscationTable, OBFUSCATION_RANGES};
pub use truetype::TrueTypeFont;

/// A rasterized glyph as an 8-bit coverage mask.
///
/// `left` is the horizontal offset from the pen position, `top` the distance
/// from the baseline up to the first bitmap row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glyph {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    pub coverage: Vec<u8>,
}

impl Glyph {
    /// Coverage at (x, y), 0 outside the bitmap
    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage.get((y * self.width + x) as usize).copied().unwrap_or(0)
    }
}

/// Source of glyph metrics and bitmaps for one font style.
///
/// Sizes are expressed in layout pixels: `pixel` is the size of one font
/// unit on the output raster (2 at scale 1).
pub trait GlyphProvider: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Whether this font has a real glyph for `ch`
    fn can_render(&self, ch: char) -> bool;

    /// Horizontal advance of `ch`, in output pixels
    fn advance(&self, ch: char, pixel: u32) -> u32;

    fn rasterize(&self, ch: char, pixel: u32) -> Glyph;
}

/// Zero-width variation selectors skipped by measurement and drawing
pub fn is_variation_selector(ch: char) -> bool {
    ch == '\u{FE0E}' || ch == '\u{FE0F}'
}

/// One provider per style bucket plus a fallback for codepoints the styled
/// fonts cannot render.
#[derive(Debug, Clone)]
pub struct FontSet {
    styles: [Arc<dyn GlyphProvider>; 4],
    fallback: Arc<dyn GlyphProvider>,
}

impl FontSet {
    /// Providers in bucket order: regular, bold, italic, bold-italic
    pub fn new(styles: [Arc<dyn GlyphProvider>; 4], fallback: Arc<dyn GlyphProvider>) -> Self {
        Self { styles, fallback }
    }

    /// The built-in bitmap fonts
    pub fn builtin() -> Self {
        let style = |bold, italic| -> Arc<dyn GlyphProvider> { Arc::new(BitmapFont::new(bold, italic, Coverage::Latin)) };
        Self {
            styles: [style(false, false), style(true, false), style(false, true), style(true, true)],
            fallback: Arc::new(BitmapFont::new(false, false, Coverage::Unicode)),
        }
    }

    pub fn font(&self, bold: bool, italic: bool) -> &dyn GlyphProvider {
        self.bucket(usize::from(bold) + 2 * usize::from(italic))
    }

    pub fn bucket(&self, bucket: usize) -> &dyn GlyphProvider {
        self.styles[bucket.min(3)].as_ref()
    }

    pub fn fallback(&self) -> &dyn GlyphProvider {
        self.fallback.as_ref()
    }

    /// The provider that draws `ch` in `bucket`, and whether it is the
    /// fallback. If neither font has the glyph the styled font is kept so
    /// geometry stays stable.
    pub fn resolve(&self, bucket: usize, ch: char) -> (&dyn GlyphProvider, bool) {
        let primary = self.bucket(bucket);
        if primary.can_render(ch) || !self.fallback.can_render(ch) {
            (primary, false)
        } else {
            (self.fallback.as_ref(), true)
        }
    }
}

impl Default for FontSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_resolves_fallback_for_symbols() {
        let fonts = FontSet::builtin();
        let (font, fell_back) = fonts.resolve(0, 'a');
        assert!(!fell_back);
        assert!(font.can_render('a'));

        let (font, fell_back) = fonts.resolve(0, '❤');
        assert!(fell_back);
        assert!(font.can_render('❤'));
    }

    #[test]
    fn test_style_lookup() {
        let fonts = FontSet::builtin();
        assert!(fonts.font(true, false).name().contains("bold"));
        assert!(fonts.font(false, true).name().contains("italic"));
        assert_eq!(fonts.font(true, true).name(), fonts.bucket(3).name());
    }

    #[test]
    fn test_variation_selectors() {
        assert!(is_variation_selector('\u{FE0F}'));
        assert!(!is_variation_selector('a'));
    }
}
