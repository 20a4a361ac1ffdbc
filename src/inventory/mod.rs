//! Inventory and crafting-grid images
//!
//! A grid of slots, optionally framed by the container border with a title,
//! filled from an inventory string (see [`parser`]). Each slot shows an item
//! sprite or player head with its stack count. When any placed sprite is
//! animated and animation is enabled, the grid is drawn once per frame with
//! every sprite on frame `i % n`.

pub mod parser;

pub use parser::{parse_inventory, InventoryEntry, MAX_STACK};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::context::Context;
use crate::error::{GeneratorError, Result};
use crate::font::{is_variation_selector, FontSet};
use crate::frames;
use crate::generated::GeneratedObject;
use crate::item::PLAYER_HEAD_ID;
use crate::raster::{blit, draw_glyph, fill_rect};
use crate::sprite::overlay::trim_overlay_name;
use crate::sprite::{render_player_head, ItemRequest, OverlayRegistry};
use crate::text::LineSegment;

/// Slot edge in GUI units
const SLOT_UNITS: i64 = 18;
/// Item sprite edge in GUI units
const ITEM_UNITS: i64 = 16;
const BORDER_UNITS: i64 = 7;
const TITLE_UNITS: i64 = 13;

pub const DEFAULT_INVENTORY_SCALE: u32 = 2;
pub const MAX_INVENTORY_SCALE: u32 = 16;
pub const MAX_GRID_SIDE: u32 = 64;

const BACKGROUND: Rgba<u8> = Rgba([198, 198, 198, 255]);
const SHADOW: Rgba<u8> = Rgba([85, 85, 85, 255]);
const HIGHLIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OUTLINE: Rgba<u8> = Rgba([0, 0, 0, 255]);
const SLOT_FILL: Rgba<u8> = Rgba([139, 139, 139, 255]);
const TITLE_COLOR: Rgba<u8> = Rgba([63, 63, 63, 255]);
const COUNT_SHADOW: Rgba<u8> = Rgba([63, 63, 63, 255]);
const COUNT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A grid of slots filled from an inventory string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRequest {
    pub rows: u32,
    pub slots_per_row: u32,
    pub title: Option<String>,
    /// Inventory string: `material[,modifier...]:slots` entries joined by `%%`
    pub contents: String,
    /// Container frame around the grid
    pub border: bool,
    /// Slot wells; without them items float on transparency
    pub slot_background: bool,
    /// Animate glinting sprites; otherwise their first frame is drawn
    pub animate: bool,
    /// Output pixels per GUI unit
    pub scale: u32,
}

impl InventoryRequest {
    pub fn new(rows: u32, slots_per_row: u32, contents: impl Into<String>) -> Self {
        Self {
            rows,
            slots_per_row,
            title: None,
            contents: contents.into(),
            border: true,
            slot_background: true,
            animate: true,
            scale: DEFAULT_INVENTORY_SCALE,
        }
    }

    /// A 3x3 crafting grid without the container frame
    pub fn recipe(contents: impl Into<String>, slot_background: bool) -> Self {
        Self { border: false, slot_background, ..Self::new(3, 3, contents) }
    }

    pub fn total_slots(&self) -> usize {
        self.rows as usize * self.slots_per_row as usize
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_GRID_SIDE).contains(&self.rows) || !(1..=MAX_GRID_SIDE).contains(&self.slots_per_row) {
            return Err(GeneratorError::invalid(format!(
                "Inventory must have 1-{} rows and slots per row, got {}x{}",
                MAX_GRID_SIDE, self.rows, self.slots_per_row
            )));
        }
        if !(1..=MAX_INVENTORY_SCALE).contains(&self.scale) {
            return Err(GeneratorError::invalid(format!(
                "Inventory scale must be 1-{}, got {}",
                MAX_INVENTORY_SCALE, self.scale
            )));
        }
        Ok(())
    }
}

/// Pixel geometry of one inventory image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryLayout {
    pub unit: i64,
    pub border: i64,
    /// Space above the first slot row
    pub header: i64,
    pub columns: i64,
    pub width: u32,
    pub height: u32,
}

impl InventoryLayout {
    pub fn new(request: &InventoryRequest) -> Self {
        let unit = request.scale as i64;
        let border = if request.border { BORDER_UNITS * unit } else { 0 };
        let header = match (&request.title, request.border) {
            (Some(_), true) => border + (TITLE_UNITS - 3) * unit,
            (Some(_), false) => TITLE_UNITS * unit,
            (None, _) => border,
        };
        let columns = request.slots_per_row as i64;
        let width = columns * SLOT_UNITS * unit + border * 2;
        let height = request.rows as i64 * SLOT_UNITS * unit + header + border;
        Self { unit, border, header, columns, width: width as u32, height: height as u32 }
    }

    pub fn slot_size(&self) -> i64 {
        SLOT_UNITS * self.unit
    }

    pub fn item_size(&self) -> u32 {
        (ITEM_UNITS * self.unit) as u32
    }

    /// Top-left corner of a 1-indexed slot
    pub fn slot_origin(&self, slot: usize) -> (i64, i64) {
        let index = slot.saturating_sub(1) as i64;
        let (row, column) = (index / self.columns, index % self.columns);
        (self.border + column * self.slot_size(), self.header + row * self.slot_size())
    }
}

/// What one entry puts in its slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    /// The `null` material: a blanked-out slot
    Empty,
    Item(ItemRequest),
    Head { skin: String },
}

/// Sort an entry's modifiers into an item or head request.
///
/// `enchant`/`enchanted` and `hover` toggle effects, a known trim material
/// on an armor piece sets the trim, a known color option or `#hex` sets the
/// color, and anything else is kept as the legacy data value.
pub fn slot_content(entry: &InventoryEntry, overlays: &OverlayRegistry) -> SlotContent {
    let material = entry.material.to_lowercase();
    if material == "null" {
        return SlotContent::Empty;
    }

    if material.contains(PLAYER_HEAD_ID) {
        let skin = entry
            .modifiers
            .iter()
            .find_map(|m| m.get(..5).filter(|p| p.eq_ignore_ascii_case("skin=")).map(|_| m[5..].trim().to_string()))
            .unwrap_or_else(|| entry.modifiers.join(","));
        return SlotContent::Head { skin };
    }

    let is_armor = trim_overlay_name(&material).is_some();
    let trims = if is_armor { overlays.trim_materials() } else { Vec::new() };
    let colors = overlays.all_option_names();

    let mut request = ItemRequest { durability: entry.durability, ..ItemRequest::new(&entry.material) };
    let mut data = Vec::new();
    for modifier in &entry.modifiers {
        let token = modifier.to_lowercase();
        match token.as_str() {
            "enchant" | "enchanted" => request.enchanted = true,
            "hover" => request.hover = true,
            _ if trims.contains(&token) => request.armor_trim = Some(token.clone()),
            _ if token.starts_with('#') || colors.contains(&token) => request.color = Some(token.clone()),
            _ => data.push(modifier.clone()),
        }
    }
    if !data.is_empty() {
        request.data = Some(data.join(","));
    }
    SlotContent::Item(request)
}

/// What each slot finally holds: `(entry index, amount)`. Later entries
/// replace earlier ones in a shared slot.
pub fn resolve_slots(entries: &[InventoryEntry], total_slots: usize) -> Vec<Option<(usize, u32)>> {
    let mut slots = vec![None; total_slots];
    for (index, entry) in entries.iter().enumerate() {
        for &(slot, amount) in &entry.placements {
            if let Some(cell) = slot.checked_sub(1).and_then(|i| slots.get_mut(i)) {
                *cell = Some((index, amount));
            }
        }
    }
    slots
}

/// Render an inventory request.
#[tracing::instrument(skip_all, fields(rows = request.rows, slots_per_row = request.slots_per_row))]
pub fn render_inventory(context: &Context, request: &InventoryRequest) -> Result<GeneratedObject> {
    request.validate()?;
    let layout = InventoryLayout::new(request);
    let entries = parse_inventory(&request.contents, request.total_slots())?;
    let slots = resolve_slots(&entries, request.total_slots());

    // Only entries that still own a slot are rendered
    let mut sprite_of_entry: Vec<Option<usize>> = vec![None; entries.len()];
    let mut sprites: Vec<GeneratedObject> = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        if !slots.iter().flatten().any(|(owner, _)| *owner == index) {
            tracing::debug!("Entry '{}' lost every slot to later entries", entry.material);
            continue;
        }
        if let Some(sprite) = render_content(context, &slot_content(entry, context.overlays()), layout.item_size())? {
            sprite_of_entry[index] = Some(sprites.len());
            sprites.push(sprite);
        }
    }

    let base = draw_grid(context.fonts(), request, &layout);
    let animated = request.animate && sprites.iter().any(GeneratedObject::is_animated);
    let (frame_count, delay_ms) = if animated { frames::frame_plan(&sprites) } else { (1, 0) };
    tracing::debug!(
        "Inventory {}x{} with {} placed entries ({} frame(s))",
        layout.width,
        layout.height,
        sprites.len(),
        frame_count
    );

    let mut frames = Vec::with_capacity(frame_count);
    for frame_index in 0..frame_count {
        let mut canvas = base.clone();
        for (slot, cell) in slots.iter().enumerate() {
            let Some((entry, amount)) = *cell else { continue };
            let (x, y) = layout.slot_origin(slot + 1);
            match sprite_of_entry[entry] {
                Some(sprite) => {
                    let image = sprites[sprite].frame(frame_index);
                    draw_stack(&mut canvas, context.fonts(), &layout, image, amount, x, y);
                }
                None => {
                    let unit = layout.unit;
                    fill_rect(&mut canvas, x + unit, y + unit, ITEM_UNITS * unit, ITEM_UNITS * unit, BACKGROUND);
                }
            }
        }
        frames.push(canvas);
    }

    if !animated {
        return frames
            .into_iter()
            .next()
            .map(GeneratedObject::still)
            .ok_or_else(|| GeneratorError::internal("inventory", "no frame was drawn"));
    }
    GeneratedObject::animated(frames, delay_ms).ok_or_else(|| GeneratorError::internal("inventory", "no frame was drawn"))
}

/// Sprite for one entry, fitted to the item size. `None` for empty slots.
fn render_content(context: &Context, content: &SlotContent, size: u32) -> Result<Option<GeneratedObject>> {
    let object = match content {
        SlotContent::Empty => return Ok(None),
        SlotContent::Item(item) => context.sprite_compositor().render_item(item)?,
        SlotContent::Head { skin } => render_player_head(context.skins(), skin, false)?,
    };
    if object.dimensions() == (size, size) {
        return Ok(Some(object));
    }
    Ok(Some(object.map_frames(|frame| imageops::resize(&frame, size, size, FilterType::Nearest))))
}

/// Frame, slot wells and title; everything that does not animate
fn draw_grid(fonts: &FontSet, request: &InventoryRequest, layout: &InventoryLayout) -> RgbaImage {
    let mut canvas = RgbaImage::new(layout.width, layout.height);
    if request.border {
        draw_container(&mut canvas, layout.unit);
    }
    if request.slot_background {
        for slot in 1..=request.total_slots() {
            let (x, y) = layout.slot_origin(slot);
            draw_slot(&mut canvas, x, y, layout.unit);
        }
    }
    if let Some(title) = &request.title {
        let text = LineSegment::parse(title).plain_text();
        let baseline = layout.header - 4 * layout.unit;
        draw_text(&mut canvas, fonts, &text, 8 * layout.unit, baseline, layout.unit, TITLE_COLOR);
    }
    canvas
}

/// The container panel: light fill, white top-left bevel, dark bottom-right
/// bevel and a black outline with rounded corners.
fn draw_container(canvas: &mut RgbaImage, u: i64) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let rects = [
        (BACKGROUND, 3 * u, 3 * u, w - 6 * u, h - 6 * u),
        (BACKGROUND, w - 3 * u, 2 * u, u, u),
        (BACKGROUND, 2 * u, h - 3 * u, u, u),
        (SHADOW, w - 3 * u, 3 * u, 2 * u, h - 4 * u),
        (SHADOW, 3 * u, h - 3 * u, w - 6 * u, 2 * u),
        (SHADOW, w - 4 * u, h - 4 * u, u, u),
        (HIGHLIGHT, u, u, 2 * u, h - 4 * u),
        (HIGHLIGHT, 3 * u, u, w - 6 * u, 2 * u),
        (HIGHLIGHT, 3 * u, 3 * u, u, u),
        (OUTLINE, 0, 2 * u, u, h - 5 * u),
        (OUTLINE, w - u, 3 * u, u, h - 5 * u),
        (OUTLINE, 2 * u, 0, w - 5 * u, u),
        (OUTLINE, 3 * u, h - u, w - 5 * u, u),
        (OUTLINE, u, u, u, u),
        (OUTLINE, w - 3 * u, u, u, u),
        (OUTLINE, w - 2 * u, 2 * u, u, u),
        (OUTLINE, w - 2 * u, h - 2 * u, u, u),
        (OUTLINE, u, h - 3 * u, u, u),
        (OUTLINE, 2 * u, h - 2 * u, u, u),
    ];
    for (color, x, y, width, height) in rects {
        fill_rect(canvas, x, y, width, height, color);
    }
}

/// One recessed slot well
fn draw_slot(canvas: &mut RgbaImage, x: i64, y: i64, u: i64) {
    let edge = (SLOT_UNITS - 1) * u;
    fill_rect(canvas, x + u, y + u, ITEM_UNITS * u, ITEM_UNITS * u, SLOT_FILL);
    fill_rect(canvas, x, y, edge, u, SHADOW);
    fill_rect(canvas, x, y + u, u, edge - u, SHADOW);
    fill_rect(canvas, x + u, y + edge, edge, u, HIGHLIGHT);
    fill_rect(canvas, x + edge, y + u, u, edge - u, HIGHLIGHT);
}

/// Sprite centered in its slot, with the count in the bottom-right corner
/// when more than one.
fn draw_stack(canvas: &mut RgbaImage, fonts: &FontSet, layout: &InventoryLayout, sprite: &RgbaImage, amount: u32, x: i64, y: i64) {
    let inset = (layout.slot_size() - layout.item_size() as i64) / 2;
    blit(canvas, sprite, x + inset, y + inset);
    if amount <= 1 {
        return;
    }

    let u = layout.unit;
    let text = amount.to_string();
    let width = text_width(fonts, &text, u);
    let text_x = x + layout.slot_size() - width;
    let baseline = y + layout.slot_size() - u;
    draw_text(canvas, fonts, &text, text_x + u, baseline + u, u, COUNT_SHADOW);
    draw_text(canvas, fonts, &text, text_x, baseline, u, COUNT_COLOR);
}

fn text_width(fonts: &FontSet, text: &str, pixel: i64) -> i64 {
    text.chars()
        .filter(|c| !is_variation_selector(*c))
        .map(|ch| fonts.resolve(0, ch).0.advance(ch, pixel as u32) as i64)
        .sum()
}

/// Draw regular-weight text with its pen starting at (`x`, `baseline`).
fn draw_text(canvas: &mut RgbaImage, fonts: &FontSet, text: &str, x: i64, baseline: i64, pixel: i64, color: Rgba<u8>) {
    let mut pen = x;
    for ch in text.chars().filter(|c| !is_variation_selector(*c)) {
        let (font, _) = fonts.resolve(0, ch);
        draw_glyph(canvas, &font.rasterize(ch, pixel as u32), pen, baseline, color);
        pen += font.advance(ch, pixel as u32) as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::{BlendType, ColorMode, ItemOverlay, OverlayColorOptions, SpriteAtlas};
    use std::sync::Arc;

    fn context() -> Context {
        let mut atlas = SpriteAtlas::new();
        atlas.insert("diamond", RgbaImage::from_pixel(16, 16, Rgba([90, 230, 230, 255])));
        atlas.insert("stick", RgbaImage::from_pixel(8, 8, Rgba([120, 80, 40, 255])));
        Context::with_atlas(atlas).unwrap()
    }

    fn registry() -> OverlayRegistry {
        let palette = |name: &str, keys: &[&str]| OverlayColorOptions {
            name: name.into(),
            options: keys.iter().map(|k| (k.to_string(), vec![0x123456])).collect(),
            ..Default::default()
        };
        let mut registry = OverlayRegistry::new();
        for (name, options) in [("leather_helmet", palette("leather", &["red"])), ("helmet_trim", palette("trim", &["gold"]))] {
            registry.insert(ItemOverlay {
                name: name.into(),
                blend: BlendType::Normal,
                color_mode: ColorMode::Overlay,
                color_options: Some(Arc::new(options)),
                image: RgbaImage::new(16, 16),
            });
        }
        registry
    }

    fn entry(input: &str) -> InventoryEntry {
        parse_inventory(input, 27).unwrap().remove(0)
    }

    #[test]
    fn test_layout_with_border_and_title() {
        let mut request = InventoryRequest::new(3, 9, "");
        request.title = Some("Chest".into());
        let layout = InventoryLayout::new(&request);
        // 9 slots of 36px plus a 14px border each side
        assert_eq!(layout.width, 9 * 36 + 28);
        // header 14 + 20, three rows, bottom border 14
        assert_eq!(layout.height, 34 + 3 * 36 + 14);
        assert_eq!(layout.slot_origin(1), (14, 34));
        assert_eq!(layout.slot_origin(10), (14, 70));
        assert_eq!(layout.slot_origin(27), (14 + 8 * 36, 34 + 72));
    }

    #[test]
    fn test_recipe_layout_is_bare_grid() {
        let layout = InventoryLayout::new(&InventoryRequest::recipe("", true));
        assert_eq!((layout.width, layout.height), (108, 108));
        assert_eq!(layout.slot_origin(5), (36, 36));
    }

    #[test]
    fn test_modifiers_sorted_into_request() {
        let overlays = registry();
        match slot_content(&entry("leather_helmet,enchant,gold,red,extra,40:1"), &overlays) {
            SlotContent::Item(item) => {
                assert!(item.enchanted);
                assert_eq!(item.armor_trim.as_deref(), Some("gold"));
                assert_eq!(item.color.as_deref(), Some("red"));
                assert_eq!(item.data.as_deref(), Some("extra"));
                assert_eq!(item.durability, Some(40));
            }
            other => panic!("unexpected {:?}", other),
        }

        // Trim materials only count on armor
        match slot_content(&entry("stick,gold,#FF00FF,hover,shiny:1"), &overlays) {
            SlotContent::Item(item) => {
                assert!(item.hover);
                assert_eq!(item.armor_trim, None);
                assert_eq!(item.color.as_deref(), Some("#ff00ff"));
                assert_eq!(item.data.as_deref(), Some("shiny"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_head_and_empty_contents() {
        let overlays = OverlayRegistry::new();
        assert_eq!(
            slot_content(&entry("player_head,skin=Notch:1"), &overlays),
            SlotContent::Head { skin: "Notch".into() }
        );
        assert_eq!(slot_content(&entry("NULL:1"), &overlays), SlotContent::Empty);
    }

    #[test]
    fn test_later_entries_win_shared_slots() {
        let entries = parse_inventory("stone:[1-3]x2%%dirt:2,5", 4).unwrap();
        assert_eq!(resolve_slots(&entries, 4), vec![Some((0, 2)), Some((1, 5)), Some((0, 2)), None]);
    }

    #[test]
    fn test_render_places_items_and_counts() {
        let context = context();
        let request = InventoryRequest::recipe("diamond:1,12%%stick:5%%null:9", true);
        let object = render_inventory(&context, &request).unwrap();
        assert!(!object.is_animated());
        let image = object.preview();
        assert_eq!(image.dimensions(), (108, 108));

        // Sprite fills the slot interior
        assert_eq!(*image.get_pixel(4, 4), Rgba([90, 230, 230, 255]));
        // Small sprites are enlarged to the item size
        assert_eq!(*image.get_pixel(36 + 2, 36 + 2), Rgba([120, 80, 40, 255]));
        assert_eq!(*image.get_pixel(36 + 33, 36 + 33), Rgba([120, 80, 40, 255]));
        // Untouched slot well and blanked slot
        assert_eq!(*image.get_pixel(36 + 4, 4), SLOT_FILL);
        assert_eq!(*image.get_pixel(72 + 4, 72 + 4), BACKGROUND);
        // Stack count drawn in the bottom-right of slot 1
        assert!((12..34).any(|x| (20..34).any(|y| *image.get_pixel(x, y) == COUNT_COLOR)));
        // No count on single items; the well's own highlight starts at 70
        assert!(!(56..70).any(|x| (56..70).any(|y| *image.get_pixel(x, y) == COUNT_COLOR)));
    }

    #[test]
    fn test_enchanted_items_animate_unless_disabled() {
        let context = context();
        let mut request = InventoryRequest::new(1, 3, "diamond,enchanted:2%%stick:3");
        let object = render_inventory(&context, &request).unwrap();
        assert!(object.is_animated());
        assert_eq!(object.frame_count(), context.glint_settings().frame_count());
        assert_eq!(object.delay_ms(), Some(context.glint_settings().frame_delay_ms));

        request.animate = false;
        let still = render_inventory(&context, &request).unwrap();
        assert!(!still.is_animated());
        assert_eq!(still.preview(), object.frame(0));
    }

    #[test]
    fn test_invalid_requests_rejected() {
        let context = context();
        for request in [
            InventoryRequest::new(0, 9, ""),
            InventoryRequest { scale: 0, ..InventoryRequest::new(1, 1, "") },
            InventoryRequest::new(1, 1, "diamond"),
        ] {
            assert!(matches!(render_inventory(&context, &request), Err(GeneratorError::InvalidInput(_))));
        }
        let missing = render_inventory(&context, &InventoryRequest::new(1, 1, "emerald:1"));
        assert!(matches!(missing, Err(GeneratorError::NotFound(_))));
    }
}
