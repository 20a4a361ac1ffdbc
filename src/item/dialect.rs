//! Schema dialects of item metadata
//!
//! Each dialect pairs a predicate with an extractor. [`DIALECTS`] is tried
//! in order and the first match wins; [`DEFAULT_DIALECT`] handles the rest.

use std::fmt;

use serde_json::{Map, Value};

use super::component::{to_legacy, truthy};
use crate::color::{format_hex_rgb, AMPERSAND_SYMBOL, SECTION_SYMBOL};
use crate::error::{GeneratorError, Result};

type Object = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    /// Data components (`components` object)
    Components,
    /// Pre-component NBT (`tag` object)
    Legacy,
    /// Only the id is understood
    Default,
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DialectKind::Components => "components",
            DialectKind::Legacy => "legacy",
            DialectKind::Default => "default",
        };
        f.write_str(name)
    }
}

/// Fields a dialect knows how to read, before id handling and reverse mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub name: Option<String>,
    /// Lore lines in legacy `&` codes
    pub lore: Vec<String>,
    pub enchanted: bool,
    pub skin: Option<String>,
    pub dye_color: Option<String>,
    /// Armor trim material, e.g. `gold`
    pub trim_material: Option<String>,
}

pub struct Dialect {
    pub kind: DialectKind,
    pub matches: fn(&Object) -> bool,
    pub extract: fn(&Object) -> Result<Extracted>,
}

pub static DIALECTS: &[Dialect] = &[
    Dialect { kind: DialectKind::Components, matches: has_components, extract: extract_components },
    Dialect { kind: DialectKind::Legacy, matches: has_tag, extract: extract_legacy },
];

pub static DEFAULT_DIALECT: Dialect =
    Dialect { kind: DialectKind::Default, matches: |_| true, extract: |_| Ok(Extracted::default()) };

/// First dialect whose predicate accepts `root`
pub fn resolve(root: &Object) -> &'static Dialect {
    DIALECTS.iter().find(|dialect| (dialect.matches)(root)).unwrap_or(&DEFAULT_DIALECT)
}

fn has_components(root: &Object) -> bool {
    root.get("components").is_some_and(Value::is_object)
}

fn has_tag(root: &Object) -> bool {
    root.get("tag").is_some_and(Value::is_object)
}

fn object<'a>(parent: &'a Object, key: &str) -> Option<&'a Object> {
    parent.get(key).and_then(Value::as_object)
}

fn non_empty(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => false,
    }
}

fn dye_hex(value: &Value) -> Option<String> {
    let rgb = match value {
        Value::Object(map) => map.get("rgb").and_then(Value::as_i64),
        other => other.as_i64(),
    }?;
    Some(format_hex_rgb(rgb as u32))
}

/// `material` of a trim object, namespace stripped
fn trim_material(trim: &Value) -> Option<String> {
    let material = trim.get("material").and_then(Value::as_str)?.trim();
    let material = material.rsplit(':').next().unwrap_or(material);
    (!material.is_empty()).then(|| material.to_lowercase())
}

fn texture_value(entry: &Value) -> Option<String> {
    let entry = entry.as_object()?;
    ["value", "Value"].iter().find_map(|key| entry.get(*key).and_then(Value::as_str)).map(str::to_string)
}

fn extract_components(root: &Object) -> Result<Extracted> {
    let Some(components) = object(root, "components") else {
        return Ok(Extracted::default());
    };

    let name = components.get("minecraft:custom_name").map(to_legacy);
    let lore = match components.get("minecraft:lore") {
        Some(Value::Array(lines)) => lines.iter().map(to_legacy).collect(),
        _ => Vec::new(),
    };

    let glint = components.get("minecraft:enchantment_glint_override").and_then(truthy).unwrap_or(false);
    let enchanted = glint
        || ["minecraft:enchantments", "minecraft:stored_enchantments"]
            .iter()
            .filter_map(|key| components.get(*key))
            .any(|enchantments| match enchantments.get("levels") {
                Some(levels) => non_empty(levels),
                None => non_empty(enchantments),
            });

    let skin = object(components, "minecraft:profile").and_then(|profile| match profile.get("properties") {
        Some(Value::Array(properties)) => properties
            .iter()
            .filter(|p| p.get("name").and_then(Value::as_str).map_or(true, |n| n.eq_ignore_ascii_case("textures")))
            .find_map(texture_value),
        Some(Value::Object(properties)) => properties.get("textures").and_then(|t| match t {
            Value::Array(textures) => textures.iter().find_map(texture_value),
            Value::String(value) => Some(value.clone()),
            other => texture_value(other),
        }),
        _ => None,
    });

    let dye_color = components.get("minecraft:dyed_color").and_then(dye_hex);
    let trim_material = components.get("minecraft:trim").and_then(trim_material);

    Ok(Extracted { name, lore, enchanted, skin, dye_color, trim_material })
}

fn legacy_text(value: &Value) -> Option<String> {
    value.as_str().map(|s| s.replace(SECTION_SYMBOL, &AMPERSAND_SYMBOL.to_string()))
}

fn extract_legacy(root: &Object) -> Result<Extracted> {
    let Some(tag) = object(root, "tag") else {
        return Ok(Extracted::default());
    };
    let display = object(tag, "display");

    let name = display.and_then(|d| d.get("Name")).and_then(legacy_text);
    let lore = match display.and_then(|d| d.get("Lore")) {
        Some(Value::Array(lines)) => lines.iter().filter_map(legacy_text).collect(),
        _ => Vec::new(),
    };

    let enchanted = ["Enchantments", "StoredEnchantments", "ench"].iter().filter_map(|key| tag.get(*key)).any(non_empty);

    let textures = object(tag, "SkullOwner")
        .and_then(|owner| object(owner, "Properties"))
        .and_then(|properties| properties.get("textures"))
        .and_then(Value::as_array);
    let skin = match textures.map(Vec::as_slice) {
        None | Some([]) => None,
        Some([texture]) => texture_value(texture),
        Some(_) => return Err(GeneratorError::invalid("There are too many textures on this player head")),
    };

    let dye_color = display.and_then(|d| d.get("color")).and_then(dye_hex);
    let trim_material = tag.get("Trim").and_then(trim_material);

    Ok(Extracted { name, lore, enchanted, skin, dye_color, trim_material })
}
