//! Enchantment glint animation
//!
//! Two scrolling, rotated samples of a glint texture are added on top of
//! every visible pixel. The texture is generated procedurally unless a PNG
//! is configured.

use std::f64::consts::PI;
use std::path::Path;

use image::{Rgba, RgbaImage};

use super::atlas::read_png;
use crate::error::Result;

pub const DEFAULT_FRAME_DELAY_MS: u32 = 33;
pub const DEFAULT_DURATION_MS: u32 = 6_000;

const UV_SCALE: f64 = 8.0;
const BASE_SPRITE_PIXELS: f64 = 16.0;
const SCROLL_SPEED: f64 = 0.3;
const TINT: [f32; 3] = [0.5, 0.25, 0.8];
const INTENSITY: f32 = 0.75;

/// Side of the generated texture
const PROCEDURAL_SIZE: u32 = 64;

/// One scrolling layer of the glint
#[derive(Debug, Clone, Copy, PartialEq)]
struct GlintPass {
    rotation_deg: f64,
    period_ms: f64,
    direction: f64,
}

const PASSES: [GlintPass; 2] = [
    GlintPass { rotation_deg: -50.0, period_ms: 3_000.0, direction: 1.0 },
    GlintPass { rotation_deg: 10.0, period_ms: 4_875.0, direction: -1.0 },
];

/// Timing of the glint animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlintSettings {
    pub frame_delay_ms: u32,
    pub duration_ms: u32,
}

impl Default for GlintSettings {
    fn default() -> Self {
        Self { frame_delay_ms: DEFAULT_FRAME_DELAY_MS, duration_ms: DEFAULT_DURATION_MS }
    }
}

impl GlintSettings {
    /// `ceil(duration / delay)`, at least one
    pub fn frame_count(&self) -> usize {
        let delay = self.frame_delay_ms.max(1);
        self.duration_ms.div_ceil(delay).max(1) as usize
    }
}

/// The texture sampled by the glint passes
#[derive(Debug, Clone, PartialEq)]
pub struct GlintTexture {
    image: RgbaImage,
}

impl GlintTexture {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(read_png(path)?))
    }

    /// Soft stripes along U with a faint V ripple. The passes rotate it.
    pub fn procedural() -> Self {
        let size = PROCEDURAL_SIZE;
        let image = RgbaImage::from_fn(size, size, |x, y| {
            let u = x as f64 / size as f64;
            let v = y as f64 / size as f64;
            let stripe = (2.0 * PI * (3.0 * u + 0.25 * (2.0 * PI * v).sin())).sin() * 0.5 + 0.5;
            let strength = stripe.powi(3);
            let value = (strength * 255.0).round() as u8;
            Rgba([value, value, value, value])
        });
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Bilinear sample with wrap-around, channels in 0.0-1.0
    fn sample(&self, u: f64, v: f64) -> [f32; 4] {
        let (width, height) = (self.image.width() as i64, self.image.height() as i64);
        let wrapped_u = u - u.floor();
        let wrapped_v = v - v.floor();
        let tex_x = wrapped_u * width as f64 - 0.5;
        let tex_y = wrapped_v * height as f64 - 0.5;
        let base_x = tex_x.floor();
        let base_y = tex_y.floor();

        let left = (base_x as i64).rem_euclid(width) as u32;
        let top = (base_y as i64).rem_euclid(height) as u32;
        let right = (left + 1) % width as u32;
        let bottom = (top + 1) % height as u32;
        let frac_x = tex_x - base_x;
        let frac_y = tex_y - base_y;

        let corners = [
            (self.image.get_pixel(left, top), (1.0 - frac_x) * (1.0 - frac_y)),
            (self.image.get_pixel(right, top), frac_x * (1.0 - frac_y)),
            (self.image.get_pixel(left, bottom), (1.0 - frac_x) * frac_y),
            (self.image.get_pixel(right, bottom), frac_x * frac_y),
        ];

        let mut out = [0f32; 4];
        for (channel, value) in out.iter_mut().enumerate() {
            let sum: f64 = corners.iter().map(|(pixel, weight)| pixel[channel] as f64 * weight).sum();
            *value = (sum / 255.0) as f32;
        }
        out
    }
}

impl Default for GlintTexture {
    fn default() -> Self {
        Self::procedural()
    }
}

/// Produce the glint frames for `base`.
pub fn apply_glint(base: &RgbaImage, texture: &GlintTexture, settings: &GlintSettings) -> Vec<RgbaImage> {
    let (width, height) = base.dimensions();
    let (tex_w, tex_h) = texture.image.dimensions();
    let span_u = BASE_SPRITE_PIXELS / tex_w as f64;
    let span_v = BASE_SPRITE_PIXELS / tex_h as f64;
    let resolution_scale = (width.max(height) as f64 / BASE_SPRITE_PIXELS).max(1.0);
    let uv_scale = UV_SCALE / resolution_scale;

    (0..settings.frame_count())
        .map(|index| {
            let time_ms = index as f64 * settings.frame_delay_ms as f64;
            let mut frame = base.clone();
            for pass in &PASSES {
                apply_pass(&mut frame, texture, pass, time_ms, span_u, span_v, uv_scale);
            }
            frame
        })
        .collect()
}

fn apply_pass(
    frame: &mut RgbaImage,
    texture: &GlintTexture,
    pass: &GlintPass,
    time_ms: f64,
    span_u: f64,
    span_v: f64,
    uv_scale: f64,
) {
    let (width, height) = frame.dimensions();
    let offset = (time_ms % pass.period_ms) / pass.period_ms * SCROLL_SPEED;
    let (sin, cos) = pass.rotation_deg.to_radians().sin_cos();

    for y in 0..height {
        let base_v = y as f64 / height as f64 * span_v;
        for x in 0..width {
            let pixel = frame.get_pixel_mut(x, y);
            if pixel[3] == 0 {
                continue;
            }

            let base_u = x as f64 / width as f64 * span_u;
            let rotated_u = base_u * cos - base_v * sin;
            let rotated_v = base_u * sin + base_v * cos;
            let translated_u = rotated_u + pass.direction * offset / uv_scale;

            let sampled = texture.sample(translated_u * uv_scale, rotated_v * uv_scale);
            let glint_alpha = sampled[3] * INTENSITY;
            if glint_alpha <= 0.0 {
                continue;
            }

            for channel in 0..3 {
                let base = pixel[channel] as f32 / 255.0;
                let add = sampled[channel] * TINT[channel] * glint_alpha;
                pixel[channel] = ((base + add).min(1.0) * 255.0 + 0.5) as u8;
            }
        }
    }
}
