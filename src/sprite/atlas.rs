//! Item texture atlas: one sprite sheet plus a JSON coordinate table

use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use serde::Deserialize;

use super::registry::Registry;
use crate::error::{GeneratorError, Result};

/// One texture's square region in the sheet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AtlasEntry {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// Item id -> texture, cut out of the atlas sheet once at startup.
#[derive(Debug, Clone, Default)]
pub struct SpriteAtlas {
    textures: HashMap<String, RgbaImage>,
}

/// Read and decode a PNG, mapping a missing file to NotFound.
pub(crate) fn read_png(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(GeneratorError::not_found(format!("Image not found: {}", path.display())));
    }
    let image = image::open(path)
        .map_err(|e| GeneratorError::internal(format!("Failed to decode {}", path.display()), e))?;
    Ok(image.to_rgba8())
}

/// Read a JSON document into `T`, mapping a missing file to NotFound.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| GeneratorError::not_found(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| GeneratorError::invalid(format!("Malformed JSON in {}: {}", path.display(), e)))
}

/// Cut a square region out of a sheet; regions past the edge are rejected.
pub(crate) fn cut(sheet: &RgbaImage, name: &str, x: u32, y: u32, size: u32) -> Result<RgbaImage> {
    let fits = x.checked_add(size).is_some_and(|r| r <= sheet.width())
        && y.checked_add(size).is_some_and(|b| b <= sheet.height());
    if size == 0 || !fits {
        return Err(GeneratorError::invalid(format!(
            "Texture '{}' at ({}, {}) with size {} lies outside the {}x{} sheet",
            name,
            x,
            y,
            size,
            sheet.width(),
            sheet.height()
        )));
    }
    Ok(image::imageops::crop_imm(sheet, x, y, size, size).to_image())
}

/// Lowercase an item id and drop the `minecraft:` namespace
pub fn normalize_item_id(id: &str) -> String {
    let id = id.trim().to_lowercase();
    id.strip_prefix("minecraft:").map(str::to_string).unwrap_or(id)
}

impl SpriteAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the atlas sheet and its coordinate table.
    pub fn load(sheet_path: &Path, coordinates_path: &Path) -> Result<Self> {
        let sheet = read_png(sheet_path)?;
        let entries: Vec<AtlasEntry> = read_json(coordinates_path)?;
        let atlas = Self::from_sheet(&sheet, &entries)?;
        tracing::info!(
            "Loaded texture atlas {}x{} ({} textures)",
            sheet.width(),
            sheet.height(),
            atlas.len()
        );
        Ok(atlas)
    }

    pub fn from_sheet(sheet: &RgbaImage, entries: &[AtlasEntry]) -> Result<Self> {
        let mut atlas = Self::new();
        for entry in entries {
            let texture = cut(sheet, &entry.name, entry.x, entry.y, entry.size)?;
            tracing::trace!("Loaded texture: {} at ({}, {}) with size {}", entry.name, entry.x, entry.y, entry.size);
            atlas.insert(&entry.name, texture);
        }
        Ok(atlas)
    }

    pub fn insert(&mut self, name: &str, texture: RgbaImage) {
        self.textures.insert(normalize_item_id(name), texture);
    }

    /// Base sprite for an item id
    pub fn texture(&self, id: &str) -> Result<&RgbaImage> {
        self.textures
            .get(&normalize_item_id(id))
            .ok_or_else(|| GeneratorError::not_found(format!("Item with ID `{}` not found", id)))
    }

    /// Ids containing `fragment`, sorted
    pub fn search(&self, fragment: &str) -> Vec<&str> {
        let fragment = fragment.to_lowercase();
        let mut found: Vec<&str> =
            self.textures.keys().filter(|name| name.contains(&fragment)).map(String::as_str).collect();
        found.sort_unstable();
        found
    }
}

impl Registry<RgbaImage> for SpriteAtlas {
    fn get(&self, name: &str) -> Option<&RgbaImage> {
        self.textures.get(&normalize_item_id(name))
    }

    fn len(&self) -> usize {
        self.textures.len()
    }

    fn names(&self) -> Box<dyn Iterator<Item = &String> + '_> {
        Box::new(self.textures.keys())
    }
}
