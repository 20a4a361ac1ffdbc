//! Built-in deterministic bitmap font
//!
//! Advance widths follow the in-game default font (glyph plus one unit of
//! spacing). Glyph shapes are a stable per-codepoint pattern, which keeps
//! rendering reproducible without shipping font files.

use super::{Glyph, GlyphProvider};

/// Units above the baseline
const ASCENT_UNITS: u32 = 7;
/// Units below the baseline
const DESCENT_UNITS: u32 = 1;

/// Which codepoints the font claims to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Basic Latin, Latin-1 Supplement, Box Drawing and Block Elements
    Latin,
    /// Every printable codepoint; used as the fallback font
    Unicode,
}

#[derive(Debug, Clone)]
pub struct BitmapFont {
    name: String,
    bold: bool,
    italic: bool,
    coverage: Coverage,
}

impl BitmapFont {
    pub fn new(bold: bool, italic: bool, coverage: Coverage) -> Self {
        let style = match (bold, italic) {
            (false, false) => "regular",
            (true, false) => "bold",
            (false, true) => "italic",
            (true, true) => "bold-italic",
        };
        let family = match coverage {
            Coverage::Latin => "builtin",
            Coverage::Unicode => "builtin-unicode",
        };
        Self { name: format!("{}-{}", family, style), bold, italic, coverage }
    }

    /// Advance width in font units, spacing included
    fn units(&self, ch: char) -> u32 {
        let base = match ch {
            ' ' => 4,
            '!' | '\'' | ',' | '.' | ':' | ';' | 'i' | '|' => 2,
            '`' | 'l' => 3,
            '"' | '(' | ')' | '*' | 'I' | '[' | ']' | 't' | '{' | '}' => 4,
            '<' | '>' | 'f' | 'k' => 5,
            '@' | '~' => 7,
            _ if is_latin(ch) => 6,
            _ => 8,
        };
        base + u32::from(self.bold)
    }
}

fn is_latin(ch: char) -> bool {
    matches!(ch as u32, 0x20..=0x7E | 0xA0..=0xFF | 0x2500..=0x259F)
}

/// Stable pseudo-random bit for one unit cell of a glyph
fn cell_bit(ch: char, x: u32, y: u32) -> bool {
    let mut hash: u32 = 0x811C_9DC5;
    for value in [ch as u32, x, y] {
        hash ^= value;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash & 0b11 != 0
}

impl GlyphProvider for BitmapFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_render(&self, ch: char) -> bool {
        match self.coverage {
            Coverage::Latin => is_latin(ch),
            Coverage::Unicode => !ch.is_control(),
        }
    }

    fn advance(&self, ch: char, pixel: u32) -> u32 {
        self.units(ch) * pixel
    }

    fn rasterize(&self, ch: char, pixel: u32) -> Glyph {
        let pixel = pixel.max(1);
        // Glyph body excludes the one unit of spacing; bold is a second copy
        // shifted one unit right.
        let body_units = self.units(ch).saturating_sub(1 + u32::from(self.bold));
        let italic_units = u32::from(self.italic);
        let width_units = body_units + u32::from(self.bold) + italic_units;
        let height_units = ASCENT_UNITS + DESCENT_UNITS;

        let width = width_units * pixel;
        let height = height_units * pixel;
        let mut coverage = vec![0u8; (width * height) as usize];

        if ch.is_whitespace() || body_units == 0 {
            return Glyph { width, height, left: 0, top: (ASCENT_UNITS * pixel) as i32, coverage };
        }

        for uy in 0..ASCENT_UNITS {
            // Italic leans the upper half one unit right
            let shear = if self.italic && uy < ASCENT_UNITS / 2 { 1 } else { 0 };
            for ux in 0..body_units {
                if !cell_bit(ch, ux, uy) {
                    continue;
                }
                for copy in 0..=u32::from(self.bold) {
                    let cx = ux + shear + copy;
                    for py in 0..pixel {
                        for px in 0..pixel {
                            let x = cx * pixel + px;
                            let y = uy * pixel + py;
                            if x < width && y < height {
                                coverage[(y * width + x) as usize] = 255;
                            }
                        }
                    }
                }
            }
        }

        Glyph { width, height, left: 0, top: (ASCENT_UNITS * pixel) as i32, coverage }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_widths() {
        let regular = BitmapFont::new(false, false, Coverage::Latin);
        assert_eq!(regular.advance('a', 2), 12);
        assert_eq!(regular.advance('i', 2), 4);
        assert_eq!(regular.advance('l', 1), 3);
        assert_eq!(regular.advance(' ', 1), 4);

        let bold = BitmapFont::new(true, false, Coverage::Latin);
        assert_eq!(bold.advance('a', 1), 7);
    }

    #[test]
    fn test_coverage() {
        let latin = BitmapFont::new(false, false, Coverage::Latin);
        assert!(latin.can_render('é'));
        assert!(latin.can_render('█'));
        assert!(!latin.can_render('❤'));

        let unicode = BitmapFont::new(false, false, Coverage::Unicode);
        assert!(unicode.can_render('❤'));
        assert!(!unicode.can_render('\u{7}'));
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let font = BitmapFont::new(false, false, Coverage::Latin);
        let a = font.rasterize('A', 2);
        assert_eq!(a, font.rasterize('A', 2));
        assert_eq!(a.height, 16);
        assert_eq!(a.top, 14);
        assert!(a.coverage.iter().any(|&c| c == 255));
    }

    #[test]
    fn test_space_has_no_ink() {
        let font = BitmapFont::new(true, true, Coverage::Latin);
        assert!(font.rasterize(' ', 2).coverage.iter().all(|&c| c == 0));
    }
}
