//! Request types and the top-level generator
//!
//! A build is an ordered list of [`GenerationRequest`]s. Each one renders to
//! a [`GeneratedObject`]; the objects are then composed left to right and,
//! when animated, encoded to a GIF. The whole build runs on the bounded
//! worker, so a slow request can never hold the caller past its timeout.

use std::sync::Arc;

use image::RgbaImage;

use crate::context::Context;
use crate::error::Result;
use crate::frames;
use crate::generated::GeneratedObject;
use crate::gif::encode_object;
use crate::inventory::{render_inventory, InventoryRequest};
use crate::item::{ParsedItemDescription, SpriteSource};
use crate::rarity::Rarity;
use crate::sprite::{render_player_head, ItemRequest};
use crate::tooltip::{clamp_line_length, TooltipSettings, TooltipText};
use crate::worker::{BoundedWorker, CancelToken};

/// Text and layout of one tooltip; name and lore may hold placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TooltipRequest {
    pub name: Option<String>,
    pub lore: String,
    pub rarity: Option<Rarity>,
    pub item_type: Option<String>,
    /// Wrap width; the configured default when unset
    pub max_line_length: Option<usize>,
    /// Layout options; the configured defaults when unset
    pub settings: Option<TooltipSettings>,
}

impl TooltipRequest {
    pub fn lore(lore: impl Into<String>) -> Self {
        Self { lore: lore.into(), ..Self::default() }
    }
}

/// A player head drawn from a skin reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRequest {
    /// Texture hash, base64 profile blob or player name
    pub skin: String,
    pub big_image: bool,
}

/// One object of a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Item(ItemRequest),
    Head(HeadRequest),
    Tooltip(TooltipRequest),
    Inventory(InventoryRequest),
}

impl GenerationRequest {
    fn kind(&self) -> &'static str {
        match self {
            GenerationRequest::Item(_) => "item",
            GenerationRequest::Head(_) => "head",
            GenerationRequest::Tooltip(_) => "tooltip",
            GenerationRequest::Inventory(_) => "inventory",
        }
    }
}

/// What a build hands back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct FinalOutput {
    /// The static image, or the first frame of the animation
    pub preview: RgbaImage,
    /// Looping GIF when animated
    pub gif: Option<Vec<u8>>,
    pub delay_ms: Option<u32>,
    pub frame_count: usize,
}

impl FinalOutput {
    pub fn from_object(object: &GeneratedObject) -> Result<Self> {
        Ok(Self {
            preview: object.preview().clone(),
            gif: encode_object(object)?,
            delay_ms: object.delay_ms(),
            frame_count: object.frame_count(),
        })
    }

    pub fn is_animated(&self) -> bool {
        self.gif.is_some()
    }
}

/// Requests that render a parsed item: its sprite, then its tooltip.
pub fn requests_for_item(parsed: &ParsedItemDescription, rarity: Option<Rarity>) -> Vec<GenerationRequest> {
    let sprite = match &parsed.sprite {
        SpriteSource::Item(request) => GenerationRequest::Item(request.clone()),
        SpriteSource::Head { skin, big_image } => {
            GenerationRequest::Head(HeadRequest { skin: skin.clone(), big_image: *big_image })
        }
    };
    let tooltip = GenerationRequest::Tooltip(TooltipRequest {
        name: parsed.name.clone(),
        lore: parsed.lore.clone(),
        rarity,
        max_line_length: parsed.max_line_length,
        ..TooltipRequest::default()
    });
    vec![sprite, tooltip]
}

/// Expand placeholders, wrap and draw one tooltip.
#[tracing::instrument(skip_all, fields(lore_len = request.lore.len()))]
pub fn render_tooltip(context: &Context, request: &TooltipRequest) -> Result<GeneratedObject> {
    let templates = context.templates();
    let max_line_length = request.max_line_length.unwrap_or(context.config().render.max_line_length);
    let text = TooltipText {
        name: request.name.as_deref().map(|name| templates.expand(name)),
        lore: templates.expand(&request.lore),
        rarity: request.rarity,
        item_type: request.item_type.clone(),
        max_line_length: clamp_line_length(max_line_length),
    };
    let settings = request.settings.clone().unwrap_or_else(|| context.tooltip_settings());
    context.tooltip_renderer().render(&text.to_lines(), &settings)
}

/// Render one request on the current thread.
pub fn render_request(context: &Context, request: &GenerationRequest) -> Result<GeneratedObject> {
    match request {
        GenerationRequest::Item(item) => context.sprite_compositor().render_item(item),
        GenerationRequest::Head(head) => render_player_head(context.skins(), &head.skin, head.big_image),
        GenerationRequest::Tooltip(tooltip) => render_tooltip(context, tooltip),
        GenerationRequest::Inventory(inventory) => render_inventory(context, inventory),
    }
}

/// Render every request in order and compose the results.
pub fn build(context: &Context, requests: &[GenerationRequest], cancel: &CancelToken) -> Result<GeneratedObject> {
    let mut objects = Vec::with_capacity(requests.len());
    for request in requests {
        cancel.check()?;
        tracing::debug!("Rendering {} object", request.kind());
        objects.push(render_request(context, request)?);
    }
    cancel.check()?;
    frames::compose(&objects, &context.frame_layout(), cancel)
}

/// Runs builds against a shared context on the bounded worker.
pub struct Generator {
    context: Arc<Context>,
    worker: BoundedWorker,
}

impl Generator {
    /// Worker count and timeout come from the context's configuration.
    pub fn new(context: Arc<Context>) -> Result<Self> {
        let render = &context.config().render;
        let worker = BoundedWorker::new(render.workers, context.config().timeout())?;
        tracing::debug!(
            "Generator using {} worker thread(s) with a {}ms budget",
            worker.threads(),
            worker.timeout().as_millis()
        );
        Ok(Self::with_worker(context, worker))
    }

    pub fn with_worker(context: Arc<Context>, worker: BoundedWorker) -> Self {
        Self { context, worker }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Build and encode `requests` within the time budget.
    #[tracing::instrument(skip_all, fields(objects = requests.len()))]
    pub fn generate(&self, requests: Vec<GenerationRequest>) -> Result<FinalOutput> {
        let context = Arc::clone(&self.context);
        let output = self.worker.run(move |cancel| {
            let object = build(&context, &requests, cancel)?;
            cancel.check()?;
            FinalOutput::from_object(&object)
        })?;
        tracing::debug!("Generated {} frame(s), animated: {}", output.frame_count, output.is_animated());
        Ok(output)
    }

    /// Render a parsed item description with an optional rarity footer.
    pub fn generate_item(&self, parsed: &ParsedItemDescription, rarity: Option<Rarity>) -> Result<FinalOutput> {
        self.generate(requests_for_item(parsed, rarity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::GeneratorError;
    use crate::font::FontSet;
    use crate::sprite::{GlintTexture, NoSkins, OverlayRegistry, SpriteAtlas};
    use image::Rgba;
    use std::time::Duration;

    fn context() -> Arc<Context> {
        let mut atlas = SpriteAtlas::new();
        atlas.insert("diamond_sword", RgbaImage::from_pixel(16, 16, Rgba([80, 220, 220, 255])));
        let mut config = Config::default();
        config.glint.duration_ms = 330;
        let context = Context::from_parts(
            atlas,
            OverlayRegistry::new(),
            FontSet::builtin(),
            GlintTexture::procedural(),
            Arc::new(NoSkins),
            config,
        )
        .unwrap();
        Arc::new(context)
    }

    fn generator() -> Generator {
        let worker = BoundedWorker::new(2, Duration::from_secs(60)).unwrap();
        Generator::with_worker(context(), worker)
    }

    #[test]
    fn test_static_item_with_tooltip() {
        let output = generator()
            .generate(vec![
                GenerationRequest::Item(ItemRequest { big_image: true, ..ItemRequest::new("diamond_sword") }),
                GenerationRequest::Tooltip(TooltipRequest::lore("%%HEALTH:100%%")),
            ])
            .unwrap();
        assert!(!output.is_animated());
        assert_eq!(output.frame_count, 1);
        assert_eq!(output.delay_ms, None);
        // 160px sprite plus both borders sets the height floor
        assert!(output.preview.height() >= 160 + 30);
    }

    #[test]
    fn test_enchanted_item_animates_with_glint_frames() {
        let generator = generator();
        let expected = generator.context().glint_settings().frame_count();
        let output = generator
            .generate(vec![
                GenerationRequest::Item(ItemRequest { enchanted: true, ..ItemRequest::new("diamond_sword") }),
                GenerationRequest::Tooltip(TooltipRequest::lore("&aPlain")),
            ])
            .unwrap();
        assert!(output.is_animated());
        assert_eq!(output.frame_count, expected);
        assert_eq!(output.delay_ms, Some(33));
    }

    #[test]
    fn test_unknown_item_aborts_build() {
        let result = generator().generate(vec![
            GenerationRequest::Tooltip(TooltipRequest::lore("fine")),
            GenerationRequest::Item(ItemRequest::new("nope")),
        ]);
        match result {
            Err(GeneratorError::NotFound(message)) => assert_eq!(message, "Item with ID `nope` not found"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_request_list() {
        assert!(matches!(generator().generate(Vec::new()), Err(GeneratorError::InvalidInput(_))));
    }

    #[test]
    fn test_head_without_skins_is_not_found() {
        let result = generator().generate(vec![GenerationRequest::Head(HeadRequest {
            skin: "Notch".into(),
            big_image: false,
        })]);
        assert!(matches!(result, Err(GeneratorError::NotFound(_))));
    }

    #[test]
    fn test_tooltip_expands_name_and_lore() {
        let context = context();
        let plain = render_tooltip(&context, &TooltipRequest::lore("&7Health: &c100&r")).unwrap();
        let templated = render_tooltip(&context, &TooltipRequest::lore("%%HEALTH:100%%")).unwrap();
        assert_eq!(plain, templated);
    }

    #[test]
    fn test_build_honours_cancellation() {
        let context = context();
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = build(&context, &[GenerationRequest::Tooltip(TooltipRequest::lore("x"))], &cancel);
        assert!(matches!(result, Err(GeneratorError::Interrupted)));
    }

    #[test]
    fn test_inventory_composes_with_tooltip() {
        let generator = generator();
        let recipe = InventoryRequest::recipe("diamond_sword:5", true);
        let alone = render_inventory(generator.context(), &recipe).unwrap();
        let output = generator
            .generate(vec![
                GenerationRequest::Inventory(recipe),
                GenerationRequest::Tooltip(TooltipRequest::lore("&aShapeless")),
            ])
            .unwrap();
        assert!(!output.is_animated());
        let layout = generator.context().frame_layout();
        let tooltip = render_tooltip(generator.context(), &TooltipRequest::lore("&aShapeless")).unwrap();
        let expected = frames::compose_frame(&[alone.preview(), tooltip.preview()], &layout);
        assert_eq!(output.preview, expected);
    }

    #[test]
    fn test_requests_for_item_order() {
        let engine = crate::templates::TemplateEngine::new().unwrap();
        let parsed = crate::item::parse_item(r#"{"id": "diamond_sword"}"#, &engine).unwrap();
        let requests = requests_for_item(&parsed, Rarity::by_name("legendary"));
        assert!(matches!(requests[0], GenerationRequest::Item(_)));
        match &requests[1] {
            GenerationRequest::Tooltip(tooltip) => assert_eq!(tooltip.rarity, Rarity::by_name("LEGENDARY")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
