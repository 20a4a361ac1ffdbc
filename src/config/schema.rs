//! Configuration schema types for `tooltipgen.toml`
//!
//! Every section is optional; missing keys take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::frames::{FrameLayout, DEFAULT_BORDER_PADDING, DEFAULT_OBJECT_PADDING};
use crate::sprite::GlintSettings;
use crate::tooltip::{
    TooltipSettings, DEFAULT_ALPHA, DEFAULT_FRAME_COUNT, DEFAULT_FRAME_DELAY_MS, DEFAULT_MAX_LINE_LENGTH,
    MAX_LINE_LENGTH_RANGE, MIN_FRAME_DELAY_MS,
};
use crate::worker::DEFAULT_TIMEOUT_MS;

/// Sprite, overlay and skin data files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Item sprite sheet (PNG)
    pub atlas: Option<PathBuf>,
    /// Item sprite coordinates (JSON)
    pub atlas_coordinates: Option<PathBuf>,
    pub overlay_atlas: Option<PathBuf>,
    pub overlay_coordinates: Option<PathBuf>,
    pub overlay_colors: Option<PathBuf>,
    pub overlay_bindings: Option<PathBuf>,
    /// Directory of `<texture hash>.png` skins
    pub skins: Option<PathBuf>,
    /// Glint texture; a procedural one is used when absent
    pub glint_texture: Option<PathBuf>,
}

impl DataConfig {
    fn paths_mut(&mut self) -> [&mut Option<PathBuf>; 8] {
        [
            &mut self.atlas,
            &mut self.atlas_coordinates,
            &mut self.overlay_atlas,
            &mut self.overlay_coordinates,
            &mut self.overlay_colors,
            &mut self.overlay_bindings,
            &mut self.skins,
            &mut self.glint_texture,
        ]
    }

    fn overlay_paths(&self) -> [&Option<PathBuf>; 4] {
        [&self.overlay_atlas, &self.overlay_coordinates, &self.overlay_colors, &self.overlay_bindings]
    }
}

/// TTF/OTF files; the built-in bitmap font covers any that are missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
    pub bold_italic: Option<PathBuf>,
    pub fallback: Option<PathBuf>,
}

impl FontsConfig {
    fn paths_mut(&mut self) -> [&mut Option<PathBuf>; 5] {
        [&mut self.regular, &mut self.bold, &mut self.italic, &mut self.bold_italic, &mut self.fallback]
    }
}

/// Rendering and execution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Time budget for one build
    pub timeout_ms: u64,
    /// Frames rendered for obfuscated tooltips
    pub frame_count: u32,
    pub frame_delay_ms: u32,
    /// Tooltip background alpha
    pub alpha: u8,
    /// Transparent padding around the tooltip
    pub padding: u32,
    pub max_line_length: usize,
    pub scale: u32,
    /// Gap between composed objects
    pub object_padding: u32,
    /// Border around the composed image
    pub border_padding: u32,
    /// Worker threads, 0 for the available parallelism
    pub workers: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            frame_count: DEFAULT_FRAME_COUNT,
            frame_delay_ms: DEFAULT_FRAME_DELAY_MS,
            alpha: DEFAULT_ALPHA,
            padding: 0,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            scale: 1,
            object_padding: DEFAULT_OBJECT_PADDING,
            border_padding: DEFAULT_BORDER_PADDING,
            workers: 0,
        }
    }
}

/// Enchantment glint timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlintConfig {
    pub frame_delay_ms: u32,
    pub duration_ms: u32,
}

impl Default for GlintConfig {
    fn default() -> Self {
        let settings = GlintSettings::default();
        Self { frame_delay_ms: settings.frame_delay_ms, duration_ms: settings.duration_ms }
    }
}

/// Complete tooltipgen.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub fonts: FontsConfig,
    pub render: RenderConfig,
    pub glint: GlintConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "render.scale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_string(), message: message.into() }
    }
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tooltipgen.toml: '{}' {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return every problem found
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let render = &self.render;

        if render.scale == 0 {
            errors.push(ConfigValidationError::new("render.scale", "must be a positive integer"));
        }
        let (min, max) = MAX_LINE_LENGTH_RANGE;
        if !(min..=max).contains(&render.max_line_length) {
            errors.push(ConfigValidationError::new("render.max_line_length", format!("must be between {} and {}", min, max)));
        }
        if render.frame_delay_ms < MIN_FRAME_DELAY_MS {
            errors.push(ConfigValidationError::new(
                "render.frame_delay_ms",
                format!("must be at least {}", MIN_FRAME_DELAY_MS),
            ));
        }
        if render.frame_count == 0 {
            errors.push(ConfigValidationError::new("render.frame_count", "must be a positive integer"));
        }
        if render.timeout_ms == 0 {
            errors.push(ConfigValidationError::new("render.timeout_ms", "must be a positive integer"));
        }
        if self.glint.frame_delay_ms == 0 {
            errors.push(ConfigValidationError::new("glint.frame_delay_ms", "must be a positive integer"));
        }
        if self.glint.duration_ms == 0 {
            errors.push(ConfigValidationError::new("glint.duration_ms", "must be a positive integer"));
        }

        if self.data.atlas.is_some() != self.data.atlas_coordinates.is_some() {
            errors.push(ConfigValidationError::new("data.atlas", "and 'data.atlas_coordinates' must be set together"));
        }
        let overlays_set = self.data.overlay_paths().iter().filter(|p| p.is_some()).count();
        if overlays_set != 0 && overlays_set != 4 {
            errors.push(ConfigValidationError::new(
                "data.overlay_atlas",
                "and the overlay coordinates, colors and bindings must be set together",
            ));
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Make every relative data and font path relative to `root`
    pub fn resolve_paths(&mut self, root: &Path) {
        let data = self.data.paths_mut().into_iter();
        for path in data.chain(self.fonts.paths_mut()).flatten() {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.render.timeout_ms)
    }

    pub fn glint_settings(&self) -> GlintSettings {
        GlintSettings { frame_delay_ms: self.glint.frame_delay_ms, duration_ms: self.glint.duration_ms }
    }

    pub fn frame_layout(&self) -> FrameLayout {
        FrameLayout { object_padding: self.render.object_padding, border_padding: self.render.border_padding }
    }

    /// Tooltip defaults derived from the render section
    pub fn tooltip_settings(&self) -> TooltipSettings {
        TooltipSettings {
            padding: self.render.padding,
            alpha: self.render.alpha,
            scale: self.render.scale,
            frame_count: self.render.frame_count,
            frame_delay_ms: self.render.frame_delay_ms,
            ..TooltipSettings::default()
        }
    }
}
