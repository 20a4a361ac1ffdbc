//! Color overlays: dyeable bases, potion liquids, armor trims
//!
//! An overlay is a second raster that sits on top of an item's base sprite.
//! Exactly one of the two receives coloring, decided by the overlay's color
//! mode, and the coloring algorithm is decided by its blend type.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use serde::Deserialize;

use super::atlas::{cut, read_json, read_png};
use super::registry::Registry;
use crate::color::{format_hex_rgb, pack_rgb, parse_hex_color};
use crate::error::{GeneratorError, Result};
use crate::raster::blit;

/// Overlay cut size when the coordinate table gives none
const DEFAULT_OVERLAY_SIZE: u32 = 128;

/// Coloring algorithm of an overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendType {
    /// Multiply by one color
    #[default]
    Normal,
    /// Replace grayscale reference shades with palette entries
    Mapped,
    /// Multiply by the secondary color, then by the primary one
    DualLayer,
}

/// Which raster the color applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorMode {
    /// Color the base sprite (leather armor); overlay drawn unmodified
    Base,
    /// Color the overlay (potion liquid); base drawn unmodified
    #[default]
    Overlay,
}

/// Named color choices shared by one or more overlays.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayColorOptions {
    pub name: String,
    /// Lowercase option key -> packed RGB colors
    pub options: HashMap<String, Vec<u32>>,
    /// Ordered grayscale shades used by MAPPED overlays
    #[serde(alias = "map")]
    pub grayscale: Vec<u8>,
    pub allow_hex_colors: bool,
    pub use_default_if_missing: bool,
    pub default_colors: Vec<u32>,
}

impl OverlayColorOptions {
    /// Resolve an option string to colors: named option, then a
    /// comma-separated hex list when allowed, then the defaults when allowed.
    pub fn colors_for(&self, option: &str) -> Option<Vec<u32>> {
        let option = option.trim().to_lowercase();

        if let Some(colors) = self.options.get(&option) {
            return Some(colors.clone());
        }

        if self.allow_hex_colors {
            if let Some(colors) = parse_hex_list(&option) {
                return Some(colors);
            }
        }

        if self.use_default_if_missing && !self.default_colors.is_empty() {
            return Some(self.default_colors.clone());
        }

        None
    }

    /// Sorted option keys, for listing choices
    pub fn option_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.options.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Parse `#RRGGBB[,#RRGGBB...]`; any bad entry rejects the whole list.
fn parse_hex_list(option: &str) -> Option<Vec<u32>> {
    if option.is_empty() {
        return None;
    }
    option
        .split(',')
        .map(|part| {
            let cleaned: String = part.chars().filter(|c| *c == '#' || c.is_ascii_hexdigit()).collect();
            parse_hex_color(&cleaned).ok().map(pack_rgb)
        })
        .collect()
}

/// A loaded overlay with its raster and coloring rules
#[derive(Debug, Clone)]
pub struct ItemOverlay {
    pub name: String,
    pub blend: BlendType,
    pub color_mode: ColorMode,
    pub color_options: Option<Arc<OverlayColorOptions>>,
    pub image: RgbaImage,
}

/// Entry of the overlay coordinate table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayEntry {
    pub name: String,
    pub x: u32,
    pub y: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(rename = "type", default)]
    pub blend: BlendType,
    #[serde(default)]
    pub color_mode: ColorMode,
    #[serde(default)]
    pub color_options: Option<String>,
}

/// Item name -> overlay name
#[derive(Debug, Clone, Deserialize)]
pub struct OverlayBinding {
    pub name: String,
    pub overlays: String,
}

/// Overlays by name and by the items bound to them
#[derive(Debug, Clone, Default)]
pub struct OverlayRegistry {
    by_name: HashMap<String, Arc<ItemOverlay>>,
    by_item: HashMap<String, Arc<ItemOverlay>>,
}

/// Paths of the four overlay data files
#[derive(Debug, Clone, Copy)]
pub struct OverlaySources<'a> {
    pub sheet: &'a Path,
    pub coordinates: &'a Path,
    pub colors: &'a Path,
    pub bindings: &'a Path,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(sources: OverlaySources<'_>) -> Result<Self> {
        let sheet = read_png(sources.sheet)?;
        let colors: Vec<OverlayColorOptions> = read_json(sources.colors)?;
        let entries: Vec<OverlayEntry> = read_json(sources.coordinates)?;
        let bindings: Vec<OverlayBinding> = read_json(sources.bindings)?;
        let registry = Self::from_parts(&sheet, &entries, colors, &bindings)?;
        tracing::info!("Loaded {} item overlays ({} overlay definitions)", registry.len(), registry.by_name.len());
        Ok(registry)
    }

    pub fn from_parts(
        sheet: &RgbaImage,
        entries: &[OverlayEntry],
        colors: Vec<OverlayColorOptions>,
        bindings: &[OverlayBinding],
    ) -> Result<Self> {
        let colors: HashMap<String, Arc<OverlayColorOptions>> =
            colors.into_iter().map(|c| (c.name.clone(), Arc::new(c))).collect();
        tracing::debug!("Loaded {} color option sets", colors.len());

        let mut registry = Self::new();
        for entry in entries {
            // Glint is generated, never read from the overlay sheet
            if entry.name.contains("enchant") {
                continue;
            }
            let size = if entry.size > 0 { entry.size } else { DEFAULT_OVERLAY_SIZE };
            let image = cut(sheet, &entry.name, entry.x, entry.y, size)?;
            let color_options = entry.color_options.as_ref().and_then(|name| colors.get(name).cloned());
            registry.insert(ItemOverlay {
                name: entry.name.clone(),
                blend: entry.blend,
                color_mode: entry.color_mode,
                color_options,
                image,
            });
        }

        for binding in bindings {
            if let Err(e) = registry.bind(&binding.name, &binding.overlays) {
                tracing::warn!("Skipping overlay binding for '{}': {}", binding.name, e);
            }
        }
        Ok(registry)
    }

    pub fn insert(&mut self, overlay: ItemOverlay) {
        self.by_name.insert(overlay.name.clone(), Arc::new(overlay));
    }

    /// Bind an item id to a registered overlay
    pub fn bind(&mut self, item: &str, overlay: &str) -> Result<()> {
        let overlay = self
            .by_name
            .get(overlay)
            .cloned()
            .ok_or_else(|| GeneratorError::not_found(format!("Overlay '{}' not found", overlay)))?;
        self.by_item.insert(item.to_lowercase(), overlay);
        Ok(())
    }

    pub fn overlay_for(&self, item: &str) -> Option<&ItemOverlay> {
        self.by_item.get(&item.to_lowercase()).map(Arc::as_ref)
    }

    pub fn by_name(&self, name: &str) -> Option<&ItemOverlay> {
        self.by_name.get(name).map(Arc::as_ref)
    }

    /// Every option key across all color sets, sorted and deduplicated
    pub fn all_option_names(&self) -> Vec<String> {
        option_names(self.by_name.values().map(Arc::as_ref))
    }

    /// Materials the armor trim overlays can be colored with
    pub fn trim_materials(&self) -> Vec<String> {
        option_names(TRIM_OVERLAYS.iter().filter_map(|name| self.by_name(name)))
    }
}

fn option_names<'a>(overlays: impl Iterator<Item = &'a ItemOverlay>) -> Vec<String> {
    let mut names: Vec<String> =
        overlays.filter_map(|o| o.color_options.as_ref()).flat_map(|c| c.options.keys().cloned()).collect();
    names.sort_unstable();
    names.dedup();
    names
}

impl Registry<ItemOverlay> for OverlayRegistry {
    fn get(&self, name: &str) -> Option<&ItemOverlay> {
        self.overlay_for(name)
    }

    fn len(&self) -> usize {
        self.by_item.len()
    }

    fn names(&self) -> Box<dyn Iterator<Item = &String> + '_> {
        Box::new(self.by_item.keys())
    }
}

fn unpack(rgb: u32) -> [f64; 3] {
    [((rgb >> 16) & 0xFF) as f64, ((rgb >> 8) & 0xFF) as f64, (rgb & 0xFF) as f64]
}

fn is_grayscale(image: &RgbaImage) -> bool {
    image.pixels().filter(|p| p[3] != 0).all(|p| p[0] == p[1] && p[1] == p[2])
}

/// Multiply every visible pixel by `color`. With `detint`, the source is
/// first divided by that reference color so a pre-colored sprite can be
/// re-colored.
pub fn tint(source: &RgbaImage, color: u32, detint: Option<u32>) -> RgbaImage {
    let target = unpack(color);
    let reference = detint.map(unpack);
    let mut out = source.clone();

    for pixel in out.pixels_mut() {
        if pixel[3] == 0 {
            continue;
        }
        for channel in 0..3 {
            let src = pixel[channel] as f64;
            let value = match reference {
                Some(reference) if reference[channel] > 0.0 => src * target[channel] / reference[channel],
                _ => src / 255.0 * target[channel],
            };
            pixel[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Replace each visible pixel whose nearest grayscale reference has index
/// `i` with `colors[i]`; indices past the palette keep the source pixel.
pub fn map_colors(source: &RgbaImage, grayscale: &[u8], colors: &[u32]) -> RgbaImage {
    let mut out = source.clone();
    if grayscale.is_empty() || colors.is_empty() {
        return out;
    }

    for pixel in out.pixels_mut() {
        if pixel[3] == 0 {
            continue;
        }
        let luminance = (0.299 * pixel[0] as f64 + 0.587 * pixel[1] as f64 + 0.114 * pixel[2] as f64).round() as i32;
        let nearest = grayscale
            .iter()
            .enumerate()
            .min_by_key(|(_, shade)| (**shade as i32 - luminance).abs())
            .map(|(index, _)| index);

        if let Some(&rgb) = nearest.and_then(|index| colors.get(index)) {
            let [r, g, b] = unpack(rgb);
            *pixel = Rgba([r as u8, g as u8, b as u8, pixel[3]]);
        }
    }
    out
}

/// Color a raster with the overlay's blend algorithm. An empty color list
/// copies the source.
pub fn render_blend(
    blend: BlendType,
    source: &RgbaImage,
    colors: &[u32],
    options: Option<&OverlayColorOptions>,
    detint: Option<u32>,
) -> RgbaImage {
    match (blend, colors) {
        (_, []) => source.clone(),
        (BlendType::Normal, [color, ..]) => tint(source, *color, detint),
        (BlendType::Mapped, colors) => {
            let grayscale = options.map(|o| o.grayscale.as_slice()).unwrap_or(&[]);
            map_colors(source, grayscale, colors)
        }
        (BlendType::DualLayer, [primary, secondary, ..]) => tint(&tint(source, *secondary, None), *primary, None),
        (BlendType::DualLayer, _) => source.clone(),
    }
}

/// Color the base or the overlay, then stack the overlay on the base.
pub fn apply_overlay(base: &RgbaImage, overlay: &ItemOverlay, option: &str) -> RgbaImage {
    let options = overlay.color_options.as_deref();
    let colors = options.and_then(|o| o.colors_for(option)).unwrap_or_default();

    if colors.is_empty() {
        tracing::warn!("No colors parsed from option '{}' for overlay '{}'", option, overlay.name);
    } else {
        tracing::debug!("Coloring {:?} of '{}' with {}", overlay.color_mode, overlay.name, format_hex_rgb(colors[0]));
    }

    let (final_base, final_overlay) = match overlay.color_mode {
        ColorMode::Overlay => (base.clone(), render_blend(overlay.blend, &overlay.image, &colors, options, None)),
        ColorMode::Base => {
            let detint = options
                .and_then(|o| o.default_colors.first().copied())
                .filter(|_| !is_grayscale(base));
            (render_blend(overlay.blend, base, &colors, options, detint), overlay.image.clone())
        }
    };

    let mut result = RgbaImage::new(base.width(), base.height());
    blit(&mut result, &final_base, 0, 0);
    blit(&mut result, &final_overlay, 0, 0);
    result
}

/// Trim overlays, one per armor piece
pub const TRIM_OVERLAYS: [&str; 4] = ["helmet_trim", "chestplate_trim", "leggings_trim", "boots_trim"];

/// Trim overlay name for an armor piece, if it takes one
pub fn trim_overlay_name(item_id: &str) -> Option<&'static str> {
    ["helmet", "chestplate", "leggings", "boots"]
        .into_iter()
        .zip(TRIM_OVERLAYS)
        .find(|(piece, _)| item_id.contains(piece))
        .map(|(_, trim)| trim)
}

/// Color a trim overlay with a material palette and stack it on the base.
/// Unknown materials leave the base unchanged.
pub fn apply_trim(base: &RgbaImage, trim: &ItemOverlay, material: &str) -> RgbaImage {
    let options = trim.color_options.as_deref();
    let colors = options.and_then(|o| o.colors_for(material)).unwrap_or_default();
    if colors.is_empty() {
        tracing::warn!("No colors found for trim material '{}', skipping trim", material);
        return base.clone();
    }

    let colored = render_blend(trim.blend, &trim.image, &colors, options, None);
    let mut result = base.clone();
    blit(&mut result, &colored, 0, 0);
    result
}
