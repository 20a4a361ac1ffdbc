//! Tooltip text layout and drawing
//!
//! Lines are measured first so the frame size and centering are known, then
//! drawn once per frame. Obfuscated runs are re-randomized every frame; the
//! pen always advances by the original glyph width so nothing shifts between
//! frames.

mod lines;

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{GeneratorError, Result};
use crate::font::{is_variation_selector, FontSet, GlyphProvider, ObfuscationTable};
use crate::generated::GeneratedObject;
use crate::raster::{draw_glyph, fill_rect, hline, pad};
use crate::text::{LineSegment, TextStyle};

pub use lines::{clamp_line_length, TooltipText, DEFAULT_MAX_LINE_LENGTH, MAX_LINE_LENGTH_RANGE};

/// Layout unit at scale 1
const DEFAULT_PIXEL_SIZE: u32 = 2;
/// Strikethrough offset from the baseline, per scale step
const STRIKETHROUGH_OFFSET: i64 = -8;
/// Underline offset from the baseline, per scale step
const UNDERLINE_OFFSET: i64 = 2;

pub const DEFAULT_ALPHA: u8 = 245;
pub const DEFAULT_FRAME_COUNT: u32 = 10;
pub const DEFAULT_FRAME_DELAY_MS: u32 = 50;
pub const MIN_FRAME_DELAY_MS: u32 = 10;

const BACKGROUND: [u8; 3] = [18, 3, 18];
const BORDER_PURPLE: [u8; 3] = [37, 0, 94];

/// Options for one tooltip render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipSettings {
    /// Transparent pixels around every frame
    pub padding: u32,
    /// Extra space under the first line (the item name)
    pub first_line_padding: bool,
    pub border: bool,
    pub centered: bool,
    /// Background alpha for static tooltips; animated ones are opaque
    pub alpha: u8,
    pub scale: u32,
    pub frame_count: u32,
    pub frame_delay_ms: u32,
    /// Seed for obfuscation; entropy when absent
    pub seed: Option<u64>,
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self {
            padding: 0,
            first_line_padding: true,
            border: true,
            centered: false,
            alpha: DEFAULT_ALPHA,
            scale: 1,
            frame_count: DEFAULT_FRAME_COUNT,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            seed: None,
        }
    }
}

/// Measured geometry shared by every frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipLayout {
    pub pixel: i64,
    pub margin: i64,
    pub line_height: i64,
    pub line_widths: Vec<i64>,
    pub largest_width: i64,
    /// Frame size before padding
    pub width: u32,
    pub height: u32,
}

impl TooltipLayout {
    fn first_baseline(&self) -> i64 {
        self.margin + self.pixel * 2 + self.line_height / 2
    }

    /// Vertical step after line `index`
    fn line_step(&self, index: usize, first_line_padding: bool) -> i64 {
        let extra = if index == 0 && first_line_padding { self.pixel * 2 } else { 0 };
        self.line_height + extra
    }
}

/// One contiguous group of glyphs drawn with the same font
struct Run<'f> {
    font: &'f dyn GlyphProvider,
    /// Glyph to draw and the advance it occupies
    glyphs: Vec<(char, i64)>,
}

impl Run<'_> {
    fn width(&self) -> i64 {
        self.glyphs.iter().map(|(_, advance)| advance).sum()
    }
}

/// Draws tooltips with a shared font set and obfuscation table.
#[derive(Debug, Clone, Copy)]
pub struct TooltipRenderer<'a> {
    fonts: &'a FontSet,
    obfuscation: &'a ObfuscationTable,
}

impl<'a> TooltipRenderer<'a> {
    pub fn new(fonts: &'a FontSet, obfuscation: &'a ObfuscationTable) -> Self {
        Self { fonts, obfuscation }
    }

    /// Pixel width of one line: the sum of every glyph's advance, using the
    /// fallback font where the styled font has no glyph.
    pub fn measure_line(&self, line: &LineSegment, pixel: u32) -> i64 {
        let mut width = 0i64;
        for segment in &line.segments {
            let bucket = segment.style.bucket();
            for ch in segment.text.chars().filter(|c| !is_variation_selector(*c)) {
                let (font, _) = self.fonts.resolve(bucket, ch);
                width += font.advance(ch, pixel) as i64;
            }
        }
        width
    }

    pub fn layout(&self, lines: &[LineSegment], settings: &TooltipSettings) -> TooltipLayout {
        let pixel = (DEFAULT_PIXEL_SIZE * settings.scale.max(1)) as i64;
        let margin = pixel * 5;
        let line_height = pixel * 10;

        let line_widths: Vec<i64> = lines.iter().map(|line| self.measure_line(line, pixel as u32)).collect();
        let largest_width = line_widths.iter().copied().max().unwrap_or(0);

        let mut layout = TooltipLayout { pixel, margin, line_height, line_widths, largest_width, width: 1, height: 1 };

        let mut measured_y = layout.first_baseline();
        for index in 0..lines.len() {
            measured_y += layout.line_step(index, settings.first_line_padding);
        }

        let first_line_extra = if settings.first_line_padding && !lines.is_empty() { pixel * 2 } else { 0 };
        let width = margin + largest_width + margin;
        let height = measured_y - (line_height + first_line_extra) + margin + pixel * 2;

        layout.width = width.max(1) as u32;
        layout.height = height.max(1) as u32;
        layout
    }

    /// Render lines into a tooltip. Output is animated when any segment is
    /// obfuscated.
    #[tracing::instrument(skip_all, fields(lines = lines.len(), scale = settings.scale))]
    pub fn render(&self, lines: &[LineSegment], settings: &TooltipSettings) -> Result<GeneratedObject> {
        if settings.scale == 0 {
            return Err(GeneratorError::invalid("Tooltip scale must be at least 1"));
        }

        let layout = self.layout(lines, settings);
        let animated = lines.iter().any(LineSegment::has_obfuscation);
        let frame_count = if animated { settings.frame_count.max(1) } else { 1 };

        tracing::debug!(
            "Tooltip layout {}x{} with {} lines (animated: {}, frames: {})",
            layout.width,
            layout.height,
            lines.len(),
            animated,
            frame_count
        );

        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let frames: Vec<RgbaImage> = (0..frame_count)
            .map(|_| {
                let frame = self.draw_frame(lines, settings, &layout, animated, &mut rng);
                pad(&frame, settings.padding)
            })
            .collect();

        if !animated {
            return match frames.into_iter().next() {
                Some(frame) => Ok(GeneratedObject::still(frame)),
                None => Err(GeneratorError::internal("tooltip", "no frame was drawn")),
            };
        }

        let delay = settings.frame_delay_ms.max(MIN_FRAME_DELAY_MS);
        GeneratedObject::animated(frames, delay).ok_or_else(|| GeneratorError::internal("tooltip", "no frame was drawn"))
    }

    fn draw_frame(
        &self,
        lines: &[LineSegment],
        settings: &TooltipSettings,
        layout: &TooltipLayout,
        animated: bool,
        rng: &mut StdRng,
    ) -> RgbaImage {
        let mut canvas = RgbaImage::new(layout.width, layout.height);
        let alpha = if animated { 255 } else { settings.alpha };
        let (w, h, p) = (layout.width as i64, layout.height as i64, layout.pixel);

        fill_rect(&mut canvas, p * 2, p * 2, w - p * 4, h - p * 4, rgba(BACKGROUND, alpha));

        let mut baseline = layout.first_baseline();
        for (index, line) in lines.iter().enumerate() {
            let line_width = layout.line_widths.get(index).copied().unwrap_or(0);
            let x = if settings.centered {
                layout.margin + (layout.largest_width - line_width) / 2
            } else {
                layout.margin
            };
            self.draw_line(&mut canvas, line, x, baseline, settings.scale as i64, p, rng);
            baseline += layout.line_step(index, settings.first_line_padding);
        }

        if settings.border {
            draw_borders(&mut canvas, p, alpha);
        }

        canvas
    }

    fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        line: &LineSegment,
        x: i64,
        baseline: i64,
        scale: i64,
        pixel: i64,
        rng: &mut StdRng,
    ) {
        let mut pen = x;

        for segment in &line.segments {
            let style = segment.style;
            let bucket = style.bucket();
            let format = segment.color();
            let colors = (format.color(), format.background_color());
            let styled_font = self.fonts.bucket(bucket);

            tracing::debug!(
                "Drawing text segment '{}' with font: {} (bold: {}, italic: {})",
                segment.text,
                styled_font.name(),
                style.bold,
                style.italic
            );

            let mut run = Run { font: styled_font, glyphs: Vec::new() };

            for ch in segment.text.chars().filter(|c| !is_variation_selector(*c)) {
                let (font, fell_back) = self.fonts.resolve(bucket, ch);
                let advance = font.advance(ch, pixel as u32) as i64;

                if style.obfuscated {
                    pen = self.flush(canvas, &mut run, pen, baseline, style, colors, scale, pixel);
                    let resolved_width = font.advance(ch, self.obfuscation.pixel());
                    let replacement = self.obfuscation.substitute(bucket, ch, resolved_width, rng);
                    let draw_font = if replacement == ch { font } else { styled_font };
                    let single = Run { font: draw_font, glyphs: vec![(replacement, advance)] };
                    pen += draw_run(canvas, &single, pen, baseline, style, colors, scale, pixel);
                    continue;
                }

                if fell_back {
                    pen = self.flush(canvas, &mut run, pen, baseline, style, colors, scale, pixel);
                    tracing::warn!(
                        "Character '{}' (U+{:04X}) cannot be displayed by font '{}'",
                        ch,
                        ch as u32,
                        styled_font.name()
                    );
                    let single = Run { font, glyphs: vec![(ch, advance)] };
                    pen += draw_run(canvas, &single, pen, baseline, style, colors, scale, pixel);
                    continue;
                }

                run.glyphs.push((ch, advance));
            }

            pen = self.flush(canvas, &mut run, pen, baseline, style, colors, scale, pixel);
        }
    }

    /// Draw and empty the pending run, returning the advanced pen
    fn flush(
        &self,
        canvas: &mut RgbaImage,
        run: &mut Run<'_>,
        pen: i64,
        baseline: i64,
        style: TextStyle,
        colors: (Rgba<u8>, Rgba<u8>),
        scale: i64,
        pixel: i64,
    ) -> i64 {
        if run.glyphs.is_empty() {
            return pen;
        }
        let advanced = pen + draw_run(canvas, run, pen, baseline, style, colors, scale, pixel);
        run.glyphs.clear();
        advanced
    }
}

fn rgba(rgb: [u8; 3], alpha: u8) -> Rgba<u8> {
    Rgba([rgb[0], rgb[1], rgb[2], alpha])
}

/// Draw one run with its drop shadow and line decorations. Returns the width
/// the run occupies.
fn draw_run(
    canvas: &mut RgbaImage,
    run: &Run<'_>,
    x: i64,
    baseline: i64,
    style: TextStyle,
    (foreground, shadow): (Rgba<u8>, Rgba<u8>),
    scale: i64,
    pixel: i64,
) -> i64 {
    let width = run.width();
    let strike_y = STRIKETHROUGH_OFFSET * scale;
    let underline_y = UNDERLINE_OFFSET * scale;

    if style.strikethrough {
        thick_line(canvas, width, x, baseline, -1, strike_y, Some(pixel), shadow);
    }
    if style.underlined {
        thick_line(canvas, width, x - pixel, baseline, 1, underline_y, Some(pixel), shadow);
    }

    let glyphs: Vec<_> = run.glyphs.iter().map(|&(ch, advance)| (run.font.rasterize(ch, pixel as u32), advance)).collect();

    for (offset, color) in [(pixel, shadow), (0, foreground)] {
        let mut pen = x + offset;
        for (glyph, advance) in &glyphs {
            draw_glyph(canvas, glyph, pen, baseline + offset, color);
            pen += advance;
        }
    }

    if style.strikethrough {
        thick_line(canvas, width, x, baseline, -1, strike_y, None, foreground);
    }
    if style.underlined {
        thick_line(canvas, width, x - pixel, baseline, 1, underline_y, None, foreground);
    }

    width
}

/// Two adjacent one-pixel rows spanning `[x, x + width + x_offset]`, shifted
/// by `shadow` pixels for the drop shadow.
fn thick_line(
    canvas: &mut RgbaImage,
    width: i64,
    x: i64,
    y: i64,
    x_offset: i64,
    y_offset: i64,
    shadow: Option<i64>,
    color: Rgba<u8>,
) {
    let shift = shadow.unwrap_or(0);
    let x1 = x + shift;
    let x2 = x + width + x_offset + shift;
    let y = y + y_offset + shift;
    hline(canvas, x1, x2, y, color);
    hline(canvas, x1, x2, y + 1, color);
}

fn draw_borders(canvas: &mut RgbaImage, pixel: i64, alpha: u8) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);

    // Dark outer frame with clipped corners
    let dark = rgba(BACKGROUND, alpha);
    fill_rect(canvas, 0, pixel, pixel, h - pixel * 2, dark);
    fill_rect(canvas, pixel, 0, w - pixel * 2, pixel, dark);
    fill_rect(canvas, w - pixel, pixel, pixel, h - pixel * 2, dark);
    fill_rect(canvas, pixel, h - pixel, w - pixel * 2, pixel, dark);

    let purple = rgba(BORDER_PURPLE, alpha);
    let outer_inset = pixel;
    let outer_thickness = (pixel / 2).max(1);
    draw_ring(canvas, outer_inset, outer_thickness, purple);

    let inner_inset = outer_inset + outer_thickness;
    let inner_thickness = ((pixel as f64 / 2.0).round() as i64).max(1);
    if inner_inset * 2 < w && inner_inset * 2 < h {
        draw_ring(canvas, inner_inset, inner_thickness, purple);
    }
}

fn draw_ring(canvas: &mut RgbaImage, inset: i64, thickness: i64, color: Rgba<u8>) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let inner_width = w - inset * 2;
    let inner_height = h - inset * 2;
    if thickness <= 0 || inner_width <= 0 || inner_height <= 0 {
        return;
    }

    fill_rect(canvas, inset, inset, inner_width, thickness, color);
    fill_rect(canvas, inset, h - inset - thickness, inner_width, thickness, color);

    let vertical = inner_height - thickness * 2;
    if vertical <= 0 {
        return;
    }
    fill_rect(canvas, inset, inset + thickness, thickness, vertical, color);
    fill_rect(canvas, w - inset - thickness, inset + thickness, thickness, vertical, color);
}
