//! PNG/GIF output and file path generation

use image::RgbaImage;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::pipeline::FinalOutput;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Write already-encoded GIF bytes.
pub fn save_gif(bytes: &[u8], path: &Path) -> Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// `path` with the extension matching the output kind
pub fn with_output_extension(path: &Path, animated: bool) -> PathBuf {
    path.with_extension(if animated { "gif" } else { "png" })
}

/// Save a build result: GIF bytes when animated, otherwise the PNG preview.
///
/// The extension of `path` is replaced to match. Returns the written path.
pub fn write_output(output: &FinalOutput, path: &Path) -> Result<PathBuf> {
    let path = with_output_extension(path, output.is_animated());
    match &output.gif {
        Some(bytes) => save_gif(bytes, &path)?,
        None => save_png(&output.preview, &path)?,
    }
    Ok(path)
}

/// Output path for one rendered input.
///
/// | Scenario | Output |
/// |----------|--------|
/// | No `-o` | `input.png` next to the input |
/// | `-o out.png`, single input | `out.png` |
/// | `-o dir/` | `dir/{input stem}.png` |
/// | `-o out.png`, several inputs | `out_{input stem}.png` |
pub fn generate_output_path(input: &Path, output_arg: Option<&Path>, is_single: bool) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(format!("{}.png", stem))
            } else if is_single {
                output.to_path_buf()
            } else {
                let out_stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
                let parent = output.parent().unwrap_or(Path::new(""));
                parent.join(format!("{}_{}.png", out_stem, stem))
            }
        }
        None => input.with_extension("png"),
    }
}
