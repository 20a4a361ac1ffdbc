//! Shared fixtures: a small atlas, overlay tables, skins and a config file
//! written into a temporary directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

pub const SKIN_HASH: &str = "0f1e2d3c4b5a69788796a5b4c3d2e1f00f1e2d3c4b5a69788796a5b4c3d2e1f0";

/// Glint frames in the fixture config (330ms / 33ms)
pub const GLINT_FRAMES: usize = 10;

pub struct Fixture {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

fn sword() -> RgbaImage {
    RgbaImage::from_fn(16, 16, |x, y| {
        if x == y || x + 1 == y {
            Rgba([90, 230, 220, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn chestplate() -> RgbaImage {
    RgbaImage::from_fn(16, 16, |x, _| {
        let shade = 100 + (x as u8) * 8;
        Rgba([shade, shade, shade, 255])
    })
}

fn bottle() -> RgbaImage {
    RgbaImage::from_fn(16, 16, |x, y| {
        if (4..12).contains(&x) && (2..15).contains(&y) {
            Rgba([200, 200, 220, 160])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Liquid overlay drawn in the three reference shades
fn liquid() -> RgbaImage {
    RgbaImage::from_fn(16, 16, |x, y| {
        if !(5..11).contains(&x) || !(6..14).contains(&y) {
            return Rgba([0, 0, 0, 0]);
        }
        let shade = [0u8, 128, 255][(y % 3) as usize];
        Rgba([shade, shade, shade, 255])
    })
}

pub fn skin() -> RgbaImage {
    RgbaImage::from_fn(64, 64, |x, y| {
        if (8..16).contains(&x) && (8..16).contains(&y) {
            Rgba([200, 150, 120, 255])
        } else if (40..48).contains(&x) && (8..10).contains(&y) {
            Rgba([60, 40, 20, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn write_json(path: &Path, value: serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

/// Write every data file and a tooltipgen.toml pointing at them.
pub fn fixture() -> Fixture {
    let dir = TempDir::new().expect("should create temp dir");
    let root = dir.path();

    let mut sheet = RgbaImage::new(48, 16);
    image::imageops::replace(&mut sheet, &sword(), 0, 0);
    image::imageops::replace(&mut sheet, &chestplate(), 16, 0);
    image::imageops::replace(&mut sheet, &bottle(), 32, 0);
    sheet.save(root.join("items.png")).unwrap();
    write_json(
        &root.join("items.json"),
        serde_json::json!([
            {"name": "diamond_sword", "x": 0, "y": 0, "size": 16},
            {"name": "leather_chestplate", "x": 16, "y": 0, "size": 16},
            {"name": "potion", "x": 32, "y": 0, "size": 16}
        ]),
    );

    liquid().save(root.join("overlays.png")).unwrap();
    write_json(
        &root.join("overlays.json"),
        serde_json::json!([
            {"name": "potion_liquid", "x": 0, "y": 0, "size": 16, "type": "MAPPED", "colorMode": "OVERLAY", "colorOptions": "potion"}
        ]),
    );
    write_json(
        &root.join("overlay_colors.json"),
        serde_json::json!([
            {"name": "potion", "options": {"red": [16711680, 11141120, 5570560]}, "grayscale": [0, 128, 255]}
        ]),
    );
    write_json(&root.join("bindings.json"), serde_json::json!([{"name": "potion", "overlays": "potion_liquid"}]));

    fs::create_dir_all(root.join("skins")).unwrap();
    skin().save(root.join("skins").join(format!("{}.png", SKIN_HASH))).unwrap();

    let config_path = root.join("tooltipgen.toml");
    fs::write(
        &config_path,
        r#"[data]
atlas = "items.png"
atlas_coordinates = "items.json"
overlay_atlas = "overlays.png"
overlay_coordinates = "overlays.json"
overlay_colors = "overlay_colors.json"
overlay_bindings = "bindings.json"
skins = "skins"

[render]
workers = 2
timeout_ms = 60000

[glint]
duration_ms = 330
"#,
    )
    .unwrap();

    Fixture { dir, config_path }
}

pub fn digest(image: &RgbaImage) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_le_bytes());
    hasher.update(image.height().to_le_bytes());
    hasher.update(image.as_raw());
    hasher.finalize().to_vec()
}
