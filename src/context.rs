//! The long-lived, read-only state shared by every build
//!
//! Everything expensive (atlases, fonts, obfuscation widths, compiled
//! template rules) is loaded once by [`Context::init`] and then only read,
//! so a single `Arc<Context>` can serve concurrent requests.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::font::{BitmapFont, Coverage, FontSet, GlyphProvider, ObfuscationTable, TrueTypeFont};
use crate::frames::FrameLayout;
use crate::sprite::overlay::OverlaySources;
use crate::sprite::{
    DirectorySkinResolver, GlintSettings, GlintTexture, NoSkins, OverlayRegistry, Registry, SkinResolver,
    SpriteAtlas, SpriteCompositor,
};
use crate::templates::TemplateEngine;
use crate::tooltip::{TooltipRenderer, TooltipSettings};

/// Pixel size the obfuscation width table is measured at
const OBFUSCATION_PIXEL: u32 = 2;

pub struct Context {
    atlas: SpriteAtlas,
    overlays: OverlayRegistry,
    fonts: FontSet,
    obfuscation: ObfuscationTable,
    templates: TemplateEngine,
    glint: GlintTexture,
    skins: Arc<dyn SkinResolver>,
    config: Config,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("sprites", &self.atlas.len())
            .field("overlays", &self.overlays.len())
            .field("reverse_rules", &self.templates.rules().len())
            .finish()
    }
}

fn load_fonts(config: &crate::config::FontsConfig) -> Result<FontSet> {
    let styled = |path: &Option<std::path::PathBuf>, bold, italic| -> Result<Arc<dyn GlyphProvider>> {
        Ok(match path {
            Some(path) => Arc::new(TrueTypeFont::load(path)?),
            None => Arc::new(BitmapFont::new(bold, italic, Coverage::Latin)),
        })
    };
    let fallback: Arc<dyn GlyphProvider> = match &config.fallback {
        Some(path) => Arc::new(TrueTypeFont::load(path)?),
        None => Arc::new(BitmapFont::new(false, false, Coverage::Unicode)),
    };
    let styles = [
        styled(&config.regular, false, false)?,
        styled(&config.bold, true, false)?,
        styled(&config.italic, false, true)?,
        styled(&config.bold_italic, true, true)?,
    ];
    Ok(FontSet::new(styles, fallback))
}

impl Context {
    /// Load every asset named by `config`. Missing data sections leave the
    /// matching registry empty.
    pub fn init(config: &Config) -> Result<Self> {
        let data = &config.data;
        let atlas = match (&data.atlas, &data.atlas_coordinates) {
            (Some(sheet), Some(coordinates)) => SpriteAtlas::load(sheet, coordinates)?,
            _ => {
                tracing::warn!("No sprite atlas configured; item sprites are unavailable");
                SpriteAtlas::new()
            }
        };

        let overlays = match (&data.overlay_atlas, &data.overlay_coordinates, &data.overlay_colors, &data.overlay_bindings) {
            (Some(sheet), Some(coordinates), Some(colors), Some(bindings)) => {
                OverlayRegistry::load(OverlaySources { sheet, coordinates, colors, bindings })?
            }
            _ => OverlayRegistry::new(),
        };

        let glint = match &data.glint_texture {
            Some(path) => GlintTexture::load(path)?,
            None => GlintTexture::procedural(),
        };

        let skins: Arc<dyn SkinResolver> = match &data.skins {
            Some(root) => Arc::new(DirectorySkinResolver::new(root)),
            None => Arc::new(NoSkins),
        };

        let fonts = load_fonts(&config.fonts)?;
        Self::from_parts(atlas, overlays, fonts, glint, skins, config.clone())
    }

    /// Assemble a context from already-loaded assets.
    pub fn from_parts(
        atlas: SpriteAtlas,
        overlays: OverlayRegistry,
        fonts: FontSet,
        glint: GlintTexture,
        skins: Arc<dyn SkinResolver>,
        config: Config,
    ) -> Result<Self> {
        let obfuscation = ObfuscationTable::build(&fonts, OBFUSCATION_PIXEL);
        let templates = TemplateEngine::new()?;
        tracing::info!(
            "Context ready: {} sprites, {} overlays, {} reverse rules",
            atlas.len(),
            overlays.len(),
            templates.rules().len()
        );
        Ok(Self { atlas, overlays, fonts, obfuscation, templates, glint, skins, config })
    }

    /// Context with only the given atlas; everything else built in.
    pub fn with_atlas(atlas: SpriteAtlas) -> Result<Self> {
        Self::from_parts(
            atlas,
            OverlayRegistry::new(),
            FontSet::builtin(),
            GlintTexture::procedural(),
            Arc::new(NoSkins),
            Config::default(),
        )
    }

    /// Load configuration from `path` (or discover it) and build a context.
    pub fn from_config_path(path: Option<&Path>) -> Result<Self> {
        let config = crate::config::load_config(path)?;
        Self::init(&config)
    }

    pub fn atlas(&self) -> &SpriteAtlas {
        &self.atlas
    }

    pub fn overlays(&self) -> &OverlayRegistry {
        &self.overlays
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    pub fn skins(&self) -> &dyn SkinResolver {
        self.skins.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn glint_settings(&self) -> GlintSettings {
        self.config.glint_settings()
    }

    pub fn frame_layout(&self) -> FrameLayout {
        self.config.frame_layout()
    }

    /// Tooltip defaults from the render configuration
    pub fn tooltip_settings(&self) -> TooltipSettings {
        self.config.tooltip_settings()
    }

    pub fn sprite_compositor(&self) -> SpriteCompositor<'_> {
        SpriteCompositor::new(&self.atlas, &self.overlays, &self.glint, self.glint_settings())
    }

    pub fn tooltip_renderer(&self) -> TooltipRenderer<'_> {
        TooltipRenderer::new(&self.fonts, &self.obfuscation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    #[test]
    fn test_default_config_builds_empty_context() {
        let context = Context::init(&Config::default()).unwrap();
        assert!(context.atlas().is_empty());
        assert!(context.overlays().is_empty());
        assert!(!context.templates().rules().is_empty());
        assert_eq!(context.frame_layout(), FrameLayout::default());
    }

    #[test]
    fn test_missing_atlas_file_fails() {
        let mut config = Config::default();
        config.data.atlas = Some(PathBuf::from("/nonexistent/items.png"));
        config.data.atlas_coordinates = Some(PathBuf::from("/nonexistent/items.json"));
        assert!(Context::init(&config).is_err());
    }

    #[test]
    fn test_missing_font_file_is_not_found() {
        let mut config = Config::default();
        config.fonts.bold = Some(PathBuf::from("/nonexistent/bold.ttf"));
        assert!(matches!(Context::init(&config), Err(GeneratorError::NotFound(_))));
    }

    #[test]
    fn test_with_atlas_renders_items() {
        let mut atlas = SpriteAtlas::new();
        atlas.insert("stick", RgbaImage::from_pixel(16, 16, Rgba([120, 80, 40, 255])));
        let context = Context::with_atlas(atlas).unwrap();
        let request = crate::sprite::ItemRequest::new("minecraft:stick");
        let object = context.sprite_compositor().render_item(&request).unwrap();
        assert_eq!(object.dimensions(), (16, 16));
    }
}
