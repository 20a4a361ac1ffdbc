//! Player head sprites rendered from skin textures

use std::path::{Path, PathBuf};

use base64::Engine;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::Deserialize;

use super::atlas::read_png;
use crate::error::{GeneratorError, Result};
use crate::raster::blit;

const TEXTURE_URL_PREFIXES: [&str; 2] =
    ["http://textures.minecraft.net/texture/", "https://textures.minecraft.net/texture/"];

/// Longest name a player account can have
const MAX_PLAYER_NAME_LENGTH: usize = 16;

const FACE: (u32, u32) = (8, 8);
const HAT: (u32, u32) = (40, 8);
const FACE_SIZE: u32 = 8;

pub const HEAD_SCALE: u32 = 2;
pub const BIG_HEAD_SCALE: u32 = 10;

/// How a head's skin was identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkinReference {
    /// Texture hash as served by the skin CDN
    TextureHash(String),
    /// Account name that needs an external lookup
    PlayerName(String),
}

impl SkinReference {
    /// Classify a raw reference: a 64-digit hex hash, a base64 profile blob,
    /// a short player name, or a texture URL.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(GeneratorError::invalid("Skin reference is empty"));
        }

        if is_hex_hash(raw) {
            return Ok(SkinReference::TextureHash(raw.to_lowercase()));
        }
        if raw.len() > MAX_PLAYER_NAME_LENGTH {
            if let Some(hash) = decode_profile_blob(raw) {
                return Ok(SkinReference::TextureHash(hash));
            }
        }
        if raw.len() <= MAX_PLAYER_NAME_LENGTH {
            let name: String = raw.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
            return Ok(SkinReference::PlayerName(name));
        }

        let hash = strip_texture_url(raw);
        if !hash.is_empty() && hash.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(SkinReference::TextureHash(hash.to_string()))
        } else {
            Err(GeneratorError::invalid(format!("Malformed skin reference: `{}`", raw)))
        }
    }
}

fn is_hex_hash(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

fn strip_texture_url(value: &str) -> &str {
    TEXTURE_URL_PREFIXES.iter().find_map(|prefix| value.strip_prefix(prefix)).unwrap_or(value)
}

#[derive(Deserialize)]
struct ProfileBlob {
    textures: ProfileTextures,
}

#[derive(Deserialize)]
#[serde(rename_all = "UPPERCASE")]
struct ProfileTextures {
    skin: ProfileSkin,
}

#[derive(Deserialize)]
struct ProfileSkin {
    url: String,
}

/// `textures.SKIN.url` of a base64 profile blob, reduced to its hash
fn decode_profile_blob(raw: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(raw).ok()?;
    let blob: ProfileBlob = serde_json::from_slice(&bytes).ok()?;
    Some(strip_texture_url(&blob.textures.skin.url).to_string())
}

/// Source of 64x64 skin textures
pub trait SkinResolver: Send + Sync {
    fn resolve_skin(&self, reference: &SkinReference) -> Result<RgbaImage>;
}

/// Skins stored as `<hash>.png` in a local directory
#[derive(Debug, Clone)]
pub struct DirectorySkinResolver {
    root: PathBuf,
}

impl DirectorySkinResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SkinResolver for DirectorySkinResolver {
    fn resolve_skin(&self, reference: &SkinReference) -> Result<RgbaImage> {
        match reference {
            SkinReference::TextureHash(hash) => {
                let path = self.root.join(format!("{}.png", hash));
                read_png(&path).map_err(|e| match e {
                    GeneratorError::NotFound(_) => {
                        GeneratorError::not_found(format!("Could not find skin with ID: `{}`", hash))
                    }
                    other => other,
                })
            }
            SkinReference::PlayerName(name) => {
                Err(GeneratorError::not_found(format!("Could not find player with name: `{}`", name)))
            }
        }
    }
}

/// Resolver used when no skin directory is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSkins;

impl SkinResolver for NoSkins {
    fn resolve_skin(&self, reference: &SkinReference) -> Result<RgbaImage> {
        let id = match reference {
            SkinReference::TextureHash(hash) => hash,
            SkinReference::PlayerName(name) => name,
        };
        Err(GeneratorError::not_found(format!("Could not find skin with ID: `{}`", id)))
    }
}

/// Face with the hat layer on top, scaled by `scale`.
pub fn render_head(skin: &RgbaImage, scale: u32) -> Result<RgbaImage> {
    if skin.width() < HAT.0 + FACE_SIZE || skin.height() < HAT.1 + FACE_SIZE {
        return Err(GeneratorError::invalid(format!(
            "Skin texture must be at least 48x16, got {}x{}",
            skin.width(),
            skin.height()
        )));
    }

    let mut head = imageops::crop_imm(skin, FACE.0, FACE.1, FACE_SIZE, FACE_SIZE).to_image();
    let hat = imageops::crop_imm(skin, HAT.0, HAT.1, FACE_SIZE, FACE_SIZE).to_image();
    blit(&mut head, &hat, 0, 0);

    let scale = scale.max(1);
    Ok(imageops::resize(&head, FACE_SIZE * scale, FACE_SIZE * scale, FilterType::Nearest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    const HASH: &str = "a8a8d5d9d5b12b1f7c49a2e9b0d6a6e5f2f4c2c1b9b8a7a6a5a4a3a2a1a0a9a8";

    fn skin() -> RgbaImage {
        let mut skin = RgbaImage::new(64, 64);
        for y in 8..16 {
            for x in 8..16 {
                skin.put_pixel(x, y, Rgba([200, 150, 100, 255]));
            }
        }
        // Hat covers only the top-left pixel of the face
        skin.put_pixel(40, 8, Rgba([0, 0, 255, 255]));
        skin
    }

    #[test]
    fn test_parse_references() {
        assert_eq!(SkinReference::parse(HASH).unwrap(), SkinReference::TextureHash(HASH.into()));
        assert_eq!(
            SkinReference::parse("Notch").unwrap(),
            SkinReference::PlayerName("Notch".into())
        );
        let url = format!("http://textures.minecraft.net/texture/{}", &HASH[..40]);
        assert_eq!(SkinReference::parse(&url).unwrap(), SkinReference::TextureHash(HASH[..40].into()));
    }

    #[test]
    fn test_parse_base64_blob() {
        let json = format!(r#"{{"textures":{{"SKIN":{{"url":"http://textures.minecraft.net/texture/{}"}}}}}}"#, HASH);
        let blob = base64::engine::general_purpose::STANDARD.encode(json);
        assert_eq!(SkinReference::parse(&blob).unwrap(), SkinReference::TextureHash(HASH.into()));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(SkinReference::parse(""), Err(GeneratorError::InvalidInput(_))));
        assert!(matches!(
            SkinReference::parse("this is not a texture reference at all"),
            Err(GeneratorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_render_head() {
        let head = render_head(&skin(), HEAD_SCALE).unwrap();
        assert_eq!(head.dimensions(), (16, 16));
        assert_eq!(*head.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*head.get_pixel(1, 1), Rgba([0, 0, 255, 255]));
        assert_eq!(*head.get_pixel(2, 2), Rgba([200, 150, 100, 255]));

        let big = render_head(&skin(), BIG_HEAD_SCALE).unwrap();
        assert_eq!(big.dimensions(), (80, 80));
    }

    #[test]
    fn test_render_head_rejects_small_skin() {
        assert!(render_head(&RgbaImage::new(16, 16), 2).is_err());
    }

    #[test]
    fn test_directory_resolver() {
        let dir = tempdir().unwrap();
        skin().save(dir.path().join(format!("{}.png", HASH))).unwrap();
        let resolver = DirectorySkinResolver::new(dir.path());

        let found = resolver.resolve_skin(&SkinReference::TextureHash(HASH.into())).unwrap();
        assert_eq!(found.dimensions(), (64, 64));

        let missing = resolver.resolve_skin(&SkinReference::TextureHash("abc".into())).unwrap_err();
        assert_eq!(missing.to_string(), "Could not find skin with ID: `abc`");

        let player = resolver.resolve_skin(&SkinReference::PlayerName("Notch".into()));
        assert!(matches!(player, Err(GeneratorError::NotFound(_))));
    }
}
