//! Item and player-head sprites
//!
//! A sprite starts as a texture cut from the atlas (or a skin), then runs
//! through the [`effects::EffectPipeline`]: overlay coloring, enchantment
//! glint, hover highlight and the durability bar.

pub mod atlas;
pub mod effects;
pub mod glint;
pub mod head;
pub mod overlay;
mod registry;

pub use atlas::{normalize_item_id, AtlasEntry, SpriteAtlas};
pub use effects::{EffectPipeline, ImageEffect};
pub use glint::{GlintSettings, GlintTexture};
pub use head::{DirectorySkinResolver, NoSkins, SkinReference, SkinResolver};
pub use overlay::{BlendType, ColorMode, ItemOverlay, OverlayColorOptions, OverlayRegistry};
pub use registry::Registry;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::error::Result;
use crate::generated::GeneratedObject;

/// Sprites no larger than this on both axes are enlarged for `big_image`
pub const BIG_IMAGE_THRESHOLD: u32 = 16;
pub const BIG_IMAGE_SCALE: u32 = 10;

/// What to draw for one item sprite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRequest {
    pub item_id: String,
    /// Legacy data value, used as the color option when `color` is unset
    pub data: Option<String>,
    pub color: Option<String>,
    pub enchanted: bool,
    pub hover: bool,
    pub big_image: bool,
    /// Remaining durability in percent
    pub durability: Option<i32>,
    /// Trim material for armor pieces
    pub armor_trim: Option<String>,
}

impl ItemRequest {
    pub fn new(item_id: impl Into<String>) -> Self {
        Self { item_id: item_id.into(), ..Default::default() }
    }

    pub fn normalized_id(&self) -> String {
        normalize_item_id(&self.item_id)
    }

    /// Overlay color option: `color`, else `data`, else empty
    pub fn color_option(&self) -> &str {
        self.color.as_deref().or(self.data.as_deref()).unwrap_or("")
    }
}

/// Nearest-neighbour enlargement of every frame
pub fn upscale(object: GeneratedObject, factor: u32) -> GeneratedObject {
    if factor <= 1 {
        return object;
    }
    object.map_frames(|frame| {
        imageops::resize(&frame, frame.width() * factor, frame.height() * factor, FilterType::Nearest)
    })
}

/// Renders item sprites out of the shared atlas and overlays.
pub struct SpriteCompositor<'a> {
    atlas: &'a SpriteAtlas,
    pipeline: EffectPipeline<'a>,
}

impl<'a> SpriteCompositor<'a> {
    pub fn new(
        atlas: &'a SpriteAtlas,
        overlays: &'a OverlayRegistry,
        glint: &'a GlintTexture,
        glint_settings: GlintSettings,
    ) -> Self {
        Self { atlas, pipeline: EffectPipeline::standard(overlays, glint, glint_settings) }
    }

    /// Base sprite, effects, then the optional big-image enlargement.
    pub fn render_item(&self, request: &ItemRequest) -> Result<GeneratedObject> {
        if let Some(percent) = request.durability {
            effects::validate_durability(percent)?;
        }

        let base = self.atlas.texture(&request.item_id)?;
        tracing::debug!(
            "Rendering item '{}' ({}x{}, enchanted={}, hover={})",
            request.normalized_id(),
            base.width(),
            base.height(),
            request.enchanted,
            request.hover
        );

        let object = self.pipeline.execute(GeneratedObject::still(base.clone()), request)?;
        let (width, height) = object.dimensions();
        if request.big_image && width <= BIG_IMAGE_THRESHOLD && height <= BIG_IMAGE_THRESHOLD {
            Ok(upscale(object, BIG_IMAGE_SCALE))
        } else {
            Ok(object)
        }
    }
}

/// Resolve a skin and draw its head.
pub fn render_player_head(resolver: &dyn SkinResolver, reference: &str, big_image: bool) -> Result<GeneratedObject> {
    let reference = SkinReference::parse(reference)?;
    tracing::debug!("Rendering player head for {:?}", reference);
    let skin: RgbaImage = resolver.resolve_skin(&reference)?;
    let scale = if big_image { head::BIG_HEAD_SCALE } else { head::HEAD_SCALE };
    Ok(GeneratedObject::still(head::render_head(&skin, scale)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;
    use image::Rgba;
    use std::sync::Arc;

    fn atlas() -> SpriteAtlas {
        let mut atlas = SpriteAtlas::new();
        atlas.insert("diamond_sword", RgbaImage::from_pixel(16, 16, Rgba([50, 200, 220, 255])));
        atlas.insert("leather_helmet", RgbaImage::from_pixel(16, 16, Rgba([160, 160, 160, 255])));
        atlas.insert("wool_banner", RgbaImage::from_pixel(32, 32, Rgba([90, 90, 90, 255])));
        atlas
    }

    fn overlays() -> OverlayRegistry {
        let options = OverlayColorOptions {
            name: "leather".into(),
            options: [("red".to_string(), vec![0xFF0000])].into_iter().collect(),
            use_default_if_missing: false,
            ..Default::default()
        };
        let mut registry = OverlayRegistry::new();
        registry.insert(ItemOverlay {
            name: "leather_helmet".into(),
            blend: BlendType::Normal,
            color_mode: ColorMode::Overlay,
            color_options: Some(Arc::new(options)),
            image: RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255])),
        });
        registry.bind("leather_helmet", "leather_helmet").unwrap();
        registry
    }

    fn short_glint() -> GlintSettings {
        GlintSettings { frame_delay_ms: 50, duration_ms: 200 }
    }

    #[test]
    fn test_plain_item_is_static() {
        let (atlas, overlays, glint) = (atlas(), overlays(), GlintTexture::procedural());
        let compositor = SpriteCompositor::new(&atlas, &overlays, &glint, short_glint());
        let object = compositor.render_item(&ItemRequest::new("minecraft:diamond_sword")).unwrap();
        assert!(!object.is_animated());
        assert_eq!(*object.preview().get_pixel(3, 3), Rgba([50, 200, 220, 255]));
    }

    #[test]
    fn test_enchanted_item_is_animated() {
        let (atlas, overlays, glint) = (atlas(), overlays(), GlintTexture::procedural());
        let compositor = SpriteCompositor::new(&atlas, &overlays, &glint, short_glint());
        let request = ItemRequest { enchanted: true, hover: true, ..ItemRequest::new("diamond_sword") };
        let object = compositor.render_item(&request).unwrap();
        assert_eq!(object.frame_count(), 4);
        assert_eq!(object.delay_ms(), Some(50));
    }

    #[test]
    fn test_overlay_color_option() {
        let (atlas, overlays, glint) = (atlas(), overlays(), GlintTexture::procedural());
        let compositor = SpriteCompositor::new(&atlas, &overlays, &glint, short_glint());
        let red = ItemRequest { color: Some("red".into()), ..ItemRequest::new("leather_helmet") };
        let plain = ItemRequest::new("leather_helmet");
        let unknown = ItemRequest { color: Some("no_such_color".into()), ..ItemRequest::new("leather_helmet") };

        let red = compositor.render_item(&red).unwrap();
        assert_eq!(*red.preview().get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(
            compositor.render_item(&plain).unwrap().preview(),
            compositor.render_item(&unknown).unwrap().preview()
        );
    }

    #[test]
    fn test_big_image() {
        let (atlas, overlays, glint) = (atlas(), overlays(), GlintTexture::procedural());
        let compositor = SpriteCompositor::new(&atlas, &overlays, &glint, short_glint());
        let small = ItemRequest { big_image: true, ..ItemRequest::new("diamond_sword") };
        assert_eq!(compositor.render_item(&small).unwrap().dimensions(), (160, 160));
        let large = ItemRequest { big_image: true, ..ItemRequest::new("wool_banner") };
        assert_eq!(compositor.render_item(&large).unwrap().dimensions(), (32, 32));
    }

    #[test]
    fn test_errors() {
        let (atlas, overlays, glint) = (atlas(), overlays(), GlintTexture::procedural());
        let compositor = SpriteCompositor::new(&atlas, &overlays, &glint, short_glint());
        let missing = compositor.render_item(&ItemRequest::new("dirt")).unwrap_err();
        assert_eq!(missing.to_string(), "Item with ID `dirt` not found");

        let broken = ItemRequest { durability: Some(150), ..ItemRequest::new("diamond_sword") };
        assert!(matches!(compositor.render_item(&broken), Err(GeneratorError::InvalidInput(_))));
    }

    #[test]
    fn test_color_option_precedence() {
        let request = ItemRequest { data: Some("blue".into()), ..ItemRequest::new("x") };
        assert_eq!(request.color_option(), "blue");
        let request = ItemRequest { color: Some("red".into()), ..request };
        assert_eq!(request.color_option(), "red");
        assert_eq!(ItemRequest::new("x").color_option(), "");
    }
}
