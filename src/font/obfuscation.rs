//! Same-width glyph tables for the obfuscated text effect

use std::collections::HashMap;

use rand::Rng;

use super::FontSet;

/// Codepoint ranges that supply substitution candidates
pub const OBFUSCATION_RANGES: [(u32, u32); 4] = [
    (0x0020, 0x007E), // Basic Latin
    (0x00A0, 0x00FF), // Latin-1 Supplement
    (0x2500, 0x257F), // Box Drawing
    (0x2580, 0x259F), // Block Elements
];

/// Per style bucket, advance width -> candidate glyphs with that width.
///
/// Built once per context and read concurrently afterwards.
#[derive(Debug, Clone)]
pub struct ObfuscationTable {
    pixel: u32,
    buckets: [HashMap<u32, Vec<char>>; 4],
}

impl ObfuscationTable {
    /// Measure every candidate in every style bucket at `pixel` size.
    pub fn build(fonts: &FontSet, pixel: u32) -> Self {
        let mut buckets: [HashMap<u32, Vec<char>>; 4] = Default::default();

        for (bucket, map) in buckets.iter_mut().enumerate() {
            let font = fonts.bucket(bucket);
            for &(start, end) in OBFUSCATION_RANGES.iter() {
                for ch in (start..=end).filter_map(char::from_u32) {
                    if !font.can_render(ch) {
                        continue;
                    }
                    let width = font.advance(ch, pixel);
                    if width > 0 {
                        map.entry(width).or_default().push(ch);
                    }
                }
            }
        }

        let table = Self { pixel, buckets };
        tracing::info!(
            "Precomputed obfuscation widths. Regular: {} chars, Bold: {} chars, Italic: {} chars, BoldItalic: {} chars",
            table.candidate_count(0),
            table.candidate_count(1),
            table.candidate_count(2),
            table.candidate_count(3)
        );
        table
    }

    /// Pixel size the widths were measured at; callers measure the glyph
    /// they obfuscate at this size
    pub fn pixel(&self) -> u32 {
        self.pixel
    }

    pub fn candidates(&self, bucket: usize, width: u32) -> Option<&[char]> {
        self.buckets.get(bucket)?.get(&width).map(Vec::as_slice).filter(|c| !c.is_empty())
    }

    pub fn candidate_count(&self, bucket: usize) -> usize {
        self.buckets.get(bucket).map(|m| m.values().map(Vec::len).sum()).unwrap_or(0)
    }

    /// Pick a random glyph of `bucket` whose advance is `width`, the advance
    /// `original` occupies in whichever font resolved it. Keeps the original
    /// (and logs) when no candidate matches.
    pub fn substitute<R: Rng>(&self, bucket: usize, original: char, width: u32, rng: &mut R) -> char {
        match self.candidates(bucket, width) {
            Some(candidates) => {
                let replacement = candidates[rng.gen_range(0..candidates.len())];
                tracing::trace!(
                    "Obfuscating '{}' (U+{:04X}) with '{}' (U+{:04X})",
                    original,
                    original as u32,
                    replacement,
                    replacement as u32
                );
                replacement
            }
            None => {
                tracing::warn!(
                    "No matching character found with width {} for original character '{}' (U+{:04X}), using original",
                    width,
                    original,
                    original as u32
                );
                original
            }
        }
    }
}
