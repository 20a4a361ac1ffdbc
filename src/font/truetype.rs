//! TTF/OTF glyph provider backed by `fontdue`

use std::fmt;
use std::path::Path;

use fontdue::{Font, FontSettings};

use super::{Glyph, GlyphProvider};
use crate::error::{GeneratorError, Result};

/// Em size in font units; the game's fonts are drawn 8 units tall.
const EM_UNITS: f32 = 8.0;

pub struct TrueTypeFont {
    name: String,
    font: Font,
}

impl TrueTypeFont {
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| GeneratorError::invalid(format!("Failed to load font '{}': {}", name, e)))?;
        Ok(Self { name, font })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| GeneratorError::not_found(format!("Font file '{}' not readable: {}", path.display(), e)))?;
        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("font").to_string();
        Self::from_bytes(name, &bytes)
    }

    fn px(pixel: u32) -> f32 {
        EM_UNITS * pixel as f32
    }
}

impl fmt::Debug for TrueTypeFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrueTypeFont").field("name", &self.name).finish()
    }
}

impl GlyphProvider for TrueTypeFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_render(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }

    fn advance(&self, ch: char, pixel: u32) -> u32 {
        self.font.metrics(ch, Self::px(pixel)).advance_width.round().max(0.0) as u32
    }

    fn rasterize(&self, ch: char, pixel: u32) -> Glyph {
        let (metrics, coverage) = self.font.rasterize(ch, Self::px(pixel));
        Glyph {
            width: metrics.width as u32,
            height: metrics.height as u32,
            left: metrics.xmin,
            top: metrics.ymin + metrics.height as i32,
            coverage,
        }
    }
}
