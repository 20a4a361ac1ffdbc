//! Item metadata (JSON renderings of item NBT) into render requests

pub mod component;
pub mod dialect;

pub use dialect::{resolve as resolve_dialect, Dialect, DialectKind, Extracted, DEFAULT_DIALECT, DIALECTS};

use serde_json::Value;

use crate::error::{GeneratorError, Result};
use crate::sprite::{normalize_item_id, ItemRequest};
use crate::templates::TemplateEngine;
use crate::text::visible_length;
use crate::tooltip::clamp_line_length;

pub const PLAYER_HEAD_ID: &str = "player_head";
const SKULL_IDS: [&str; 2] = ["skull", "player_skull"];

/// How the sprite next to the tooltip is produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpriteSource {
    Item(ItemRequest),
    Head { skin: String, big_image: bool },
}

/// Everything needed to render an item described by metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItemDescription {
    pub item_id: String,
    pub dialect: DialectKind,
    pub name: Option<String>,
    /// Lore with placeholders restored where recognized
    pub lore: String,
    pub enchanted: bool,
    pub skin: Option<String>,
    pub max_line_length: Option<usize>,
    pub dye_color: Option<String>,
    pub trim_material: Option<String>,
    pub sprite: SpriteSource,
}

/// `minecraft:` stripped, lowercased, skulls renamed to player heads
pub fn display_item_id(id: &str) -> String {
    let id = normalize_item_id(id);
    if SKULL_IDS.contains(&id.as_str()) {
        PLAYER_HEAD_ID.to_string()
    } else {
        id
    }
}

/// Longest visible lore line, clamped to the allowed line lengths
fn max_line_length(lore: &[String]) -> Option<usize> {
    lore.iter().map(|line| visible_length(line)).max().filter(|len| *len > 0).map(clamp_line_length)
}

/// Parse a JSON item description.
pub fn parse_item(json: &str, templates: &TemplateEngine) -> Result<ParsedItemDescription> {
    let value: Value = serde_json::from_str(json)?;
    parse_item_value(&value, templates)
}

pub fn parse_item_value(value: &Value, templates: &TemplateEngine) -> Result<ParsedItemDescription> {
    let root = value.as_object().ok_or_else(|| GeneratorError::invalid("Item metadata must be a JSON object"))?;
    let id = root
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| GeneratorError::invalid("Item metadata is missing the `id` field"))?;
    let item_id = display_item_id(id);

    let dialect = dialect::resolve(root);
    let extracted = (dialect.extract)(root)?;
    tracing::debug!("Parsed '{}' using the {} dialect", item_id, dialect.kind);

    let is_head = item_id == PLAYER_HEAD_ID;
    let sprite = match (&extracted.skin, is_head) {
        (Some(skin), true) => SpriteSource::Head { skin: skin.clone(), big_image: true },
        _ => SpriteSource::Item(ItemRequest {
            item_id: item_id.clone(),
            enchanted: extracted.enchanted,
            big_image: true,
            color: extracted.dye_color.clone().filter(|_| !is_head),
            armor_trim: extracted.trim_material.clone().filter(|_| !is_head),
            ..Default::default()
        }),
    };

    let max_line_length = max_line_length(&extracted.lore);
    let lore = templates.reverse(&extracted.lore.join("\n"));
    let name = extracted.name.as_deref().map(|name| templates.reverse(name));

    Ok(ParsedItemDescription {
        item_id,
        dialect: dialect.kind,
        name,
        lore,
        enchanted: extracted.enchanted,
        skin: extracted.skin.filter(|_| is_head),
        max_line_length,
        dye_color: extracted.dye_color,
        trim_material: extracted.trim_material,
        sprite,
    })
}
