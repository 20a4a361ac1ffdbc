//! Low-level raster drawing shared by the tooltip and sprite generators

use image::{Rgba, RgbaImage};

use crate::font::Glyph;

/// Composite `src` over `dst` with Porter-Duff "source over".
///
/// `src_alpha` is the effective source alpha in 0.0-1.0, already scaled by
/// any coverage or opacity.
pub(crate) fn blend_pixels(src: &Rgba<u8>, dst: &Rgba<u8>, src_alpha: f32) -> Rgba<u8> {
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    if out_alpha == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let composite = |channel: usize| -> u8 {
        let s = src[channel] as f32 / 255.0;
        let d = dst[channel] as f32 / 255.0;
        let result = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([composite(0), composite(1), composite(2), (out_alpha * 255.0).round() as u8])
}

/// Blend one pixel at a signed position, ignoring anything off-canvas.
pub(crate) fn blend_at(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, src_alpha: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    if src_alpha <= 0.0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    let blended = blend_pixels(&color, canvas.get_pixel(x, y), src_alpha.min(1.0));
    canvas.put_pixel(x, y, blended);
}

/// Fill a clipped rectangle, blending `color` (with its own alpha) over the
/// canvas. Non-positive sizes draw nothing.
pub(crate) fn fill_rect(canvas: &mut RgbaImage, x: i64, y: i64, width: i64, height: i64, color: Rgba<u8>) {
    if width <= 0 || height <= 0 || color[3] == 0 {
        return;
    }
    let alpha = color[3] as f32 / 255.0;
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + width).min(canvas.width() as i64);
    let y1 = (y + height).min(canvas.height() as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            blend_at(canvas, px, py, color, alpha);
        }
    }
}

/// Horizontal line including both endpoints
pub(crate) fn hline(canvas: &mut RgbaImage, x1: i64, x2: i64, y: i64, color: Rgba<u8>) {
    let (start, end) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
    fill_rect(canvas, start, y, end - start + 1, 1, color);
}

/// Draw a glyph coverage mask with its pen position at (`x`, `baseline`).
pub(crate) fn draw_glyph(canvas: &mut RgbaImage, glyph: &Glyph, x: i64, baseline: i64, color: Rgba<u8>) {
    let origin_x = x + glyph.left as i64;
    let origin_y = baseline - glyph.top as i64;
    let color_alpha = color[3] as f32 / 255.0;

    for gy in 0..glyph.height {
        for gx in 0..glyph.width {
            let coverage = glyph.coverage_at(gx, gy);
            if coverage == 0 {
                continue;
            }
            let alpha = coverage as f32 / 255.0 * color_alpha;
            blend_at(canvas, origin_x + gx as i64, origin_y + gy as i64, color, alpha);
        }
    }
}

/// Blit a sprite onto the canvas at a signed position with alpha blending.
pub(crate) fn blit(canvas: &mut RgbaImage, sprite: &RgbaImage, x: i64, y: i64) {
    for (sx, sy, pixel) in sprite.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        blend_at(canvas, x + sx as i64, y + sy as i64, *pixel, pixel[3] as f32 / 255.0);
    }
}

/// Wrap `image` in `padding` pixels of transparency on every side.
pub(crate) fn pad(image: &RgbaImage, padding: u32) -> RgbaImage {
    if padding == 0 {
        return image.clone();
    }
    let mut padded = RgbaImage::new(image.width() + 2 * padding, image.height() + 2 * padding);
    image::imageops::replace(&mut padded, image, padding as i64, padding as i64);
    padded
}
