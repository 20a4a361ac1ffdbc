//! Priority-ordered raster effects applied to an item sprite

use image::{Rgba, RgbaImage};

use super::glint::{apply_glint, GlintSettings, GlintTexture};
use super::overlay::{apply_overlay, apply_trim, trim_overlay_name, OverlayRegistry};
use super::ItemRequest;
use crate::error::{GeneratorError, Result};
use crate::generated::GeneratedObject;
use crate::raster::fill_rect;

/// One step of the sprite pipeline.
///
/// Effects run in ascending priority and only when [`ImageEffect::applies`]
/// accepts the request.
pub trait ImageEffect: Send + Sync {
    fn name(&self) -> &'static str;

    fn priority(&self) -> u32;

    fn applies(&self, request: &ItemRequest) -> bool;

    fn apply(&self, object: GeneratedObject, request: &ItemRequest) -> Result<GeneratedObject>;
}

/// Effects sorted by priority
pub struct EffectPipeline<'a> {
    effects: Vec<Box<dyn ImageEffect + 'a>>,
}

impl<'a> EffectPipeline<'a> {
    pub fn new(mut effects: Vec<Box<dyn ImageEffect + 'a>>) -> Self {
        effects.sort_by_key(|e| e.priority());
        Self { effects }
    }

    /// The standard chain: overlay, glint, hover, durability
    pub fn standard(overlays: &'a OverlayRegistry, glint: &'a GlintTexture, settings: GlintSettings) -> Self {
        Self::new(vec![
            Box::new(OverlayEffect { overlays }),
            Box::new(GlintEffect { texture: glint, settings }),
            Box::new(HoverEffect),
            Box::new(DurabilityEffect),
        ])
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    pub fn execute(&self, mut object: GeneratedObject, request: &ItemRequest) -> Result<GeneratedObject> {
        for effect in &self.effects {
            if effect.applies(request) {
                tracing::debug!("Applying effect: {} (priority: {})", effect.name(), effect.priority());
                object = effect.apply(object, request)?;
            } else {
                tracing::debug!("Skipping effect {} (conditions not met)", effect.name());
            }
        }
        Ok(object)
    }
}

/// Dye, potion and trim coloring
pub struct OverlayEffect<'a> {
    pub overlays: &'a OverlayRegistry,
}

impl OverlayEffect<'_> {
    fn trim_target(&self, request: &ItemRequest) -> Option<&'static str> {
        request.armor_trim.as_deref().filter(|t| !t.trim().is_empty())?;
        trim_overlay_name(&request.normalized_id())
    }
}

impl ImageEffect for OverlayEffect<'_> {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn applies(&self, request: &ItemRequest) -> bool {
        self.overlays.overlay_for(&request.normalized_id()).is_some() || self.trim_target(request).is_some()
    }

    fn apply(&self, object: GeneratedObject, request: &ItemRequest) -> Result<GeneratedObject> {
        let item_id = request.normalized_id();
        let overlay = self.overlays.overlay_for(&item_id);
        let option = request.color_option().to_string();

        let trim = match (self.trim_target(request), request.armor_trim.as_deref()) {
            (Some(name), Some(material)) => match self.overlays.by_name(name) {
                Some(overlay) => Some((overlay, material.to_string())),
                None => {
                    tracing::warn!("Trim overlay '{}' not found for item '{}'", name, item_id);
                    None
                }
            },
            _ => None,
        };

        Ok(object.map_frames(|frame| {
            let mut frame = match overlay {
                Some(overlay) => apply_overlay(&frame, overlay, &option),
                None => frame,
            };
            if let Some((trim, material)) = &trim {
                frame = apply_trim(&frame, trim, material);
            }
            frame
        }))
    }
}

/// Enchantment shimmer; turns the sprite into an animation
pub struct GlintEffect<'a> {
    pub texture: &'a GlintTexture,
    pub settings: GlintSettings,
}

impl ImageEffect for GlintEffect<'_> {
    fn name(&self) -> &'static str {
        "glint"
    }

    fn priority(&self) -> u32 {
        100
    }

    fn applies(&self, request: &ItemRequest) -> bool {
        request.enchanted
    }

    fn apply(&self, object: GeneratedObject, _request: &ItemRequest) -> Result<GeneratedObject> {
        let frames = apply_glint(object.preview(), self.texture, &self.settings);
        GeneratedObject::animated(frames, self.settings.frame_delay_ms)
            .ok_or_else(|| GeneratorError::internal("glint", "Enchantment glint produced no frames"))
    }
}

const HOVER_OPACITY: f32 = 0.5;

/// Inventory-slot hover highlight
pub struct HoverEffect;

/// Transparent pixels become light gray, the rest blend halfway to white.
/// Output is fully opaque.
pub fn hover(image: &RgbaImage) -> RgbaImage {
    let lightness = (255.0 * HOVER_OPACITY) as u8;
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        *pixel = if pixel[3] == 0 {
            Rgba([lightness, lightness, lightness, 255])
        } else {
            let blend = |c: u8| (c as f32 * (1.0 - HOVER_OPACITY) + 255.0 * HOVER_OPACITY).min(255.0) as u8;
            Rgba([blend(pixel[0]), blend(pixel[1]), blend(pixel[2]), 255])
        };
    }
    out
}

impl ImageEffect for HoverEffect {
    fn name(&self) -> &'static str {
        "hover"
    }

    fn priority(&self) -> u32 {
        200
    }

    fn applies(&self, request: &ItemRequest) -> bool {
        request.hover
    }

    fn apply(&self, object: GeneratedObject, _request: &ItemRequest) -> Result<GeneratedObject> {
        Ok(object.map_frames(|frame| hover(&frame)))
    }
}

/// Durability bar under damaged items
pub struct DurabilityEffect;

/// Check a durability percentage
pub fn validate_durability(percent: i32) -> Result<u8> {
    u8::try_from(percent)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| GeneratorError::invalid(format!("Durability must be between 0 and 100, got {}", percent)))
}

/// Green to yellow above half, yellow to red below
pub fn durability_color(percent: u8) -> Rgba<u8> {
    let percent = percent as f64;
    if percent > 50.0 {
        Rgba([(255.0 * 2.0 * (100.0 - percent) / 100.0) as u8, 255, 0, 255])
    } else {
        Rgba([255, (255.0 * 2.0 * percent / 100.0) as u8, 0, 255])
    }
}

/// Filled length of the colored bar for an item `width` pixels wide
pub fn durability_fill(width: u32, percent: u8) -> u32 {
    let unit = width / 16;
    let bar_width = width.saturating_sub(3 * unit);
    (bar_width as f64 * percent as f64 / 100.0) as u32
}

/// Draw the two stacked bars; at 100% nothing is drawn.
pub fn draw_durability_bar(image: &RgbaImage, percent: u8) -> RgbaImage {
    let mut out = image.clone();
    if percent >= 100 {
        return out;
    }

    let (width, height) = (image.width() as i64, image.height() as i64);
    let unit = width / 16;
    let bar_width = width - 3 * unit;
    let bar_x = 2 * unit;
    let color_bar_y = height - 3 * unit;
    let black_bar_y = height - 2 * unit;
    let black = Rgba([0, 0, 0, 255]);

    fill_rect(&mut out, bar_x, black_bar_y, bar_width, unit, black);
    fill_rect(&mut out, bar_x, color_bar_y, bar_width, unit, black);
    if percent > 0 {
        let filled = durability_fill(image.width(), percent) as i64;
        fill_rect(&mut out, bar_x, color_bar_y, filled, unit, durability_color(percent));
    }
    out
}

impl ImageEffect for DurabilityEffect {
    fn name(&self) -> &'static str {
        "durability"
    }

    fn priority(&self) -> u32 {
        300
    }

    fn applies(&self, request: &ItemRequest) -> bool {
        request.durability.is_some_and(|p| p < 100)
    }

    fn apply(&self, object: GeneratedObject, request: &ItemRequest) -> Result<GeneratedObject> {
        let percent = match request.durability {
            Some(percent) => validate_durability(percent)?,
            None => return Ok(object),
        };
        Ok(object.map_frames(|frame| draw_durability_bar(&frame, percent)))
    }
}
