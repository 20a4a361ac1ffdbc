//! Composition of several generated objects into one output
//!
//! Objects are laid out left to right, vertically centered. When any of them
//! is animated the result is animated too: output frame `i` takes frame
//! `i % n` from an object with `n` frames, so short loops repeat alongside
//! longer ones.

use image::RgbaImage;

use crate::error::{GeneratorError, Result};
use crate::generated::GeneratedObject;
use crate::raster::blit;
use crate::worker::CancelToken;

/// Horizontal gap between adjacent objects
pub const DEFAULT_OBJECT_PADDING: u32 = 25;
/// Transparent border around the composed image
pub const DEFAULT_BORDER_PADDING: u32 = 15;
/// Delay used when no animated input declares one
pub const DEFAULT_FRAME_DELAY_MS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub object_padding: u32,
    pub border_padding: u32,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self { object_padding: DEFAULT_OBJECT_PADDING, border_padding: DEFAULT_BORDER_PADDING }
    }
}

impl FrameLayout {
    /// Canvas size for parts of the given sizes
    pub fn canvas_size(&self, sizes: &[(u32, u32)]) -> (u32, u32) {
        let gaps = sizes.len().saturating_sub(1) as u32 * self.object_padding;
        let width = sizes.iter().map(|(w, _)| w).sum::<u32>() + gaps;
        let height = sizes.iter().map(|(_, h)| *h).max().unwrap_or(0);
        (width + 2 * self.border_padding, height + 2 * self.border_padding)
    }
}

/// Output frame count and delay for a list of objects.
///
/// The count is the largest frame count; the delay is the first nonzero one
/// declared by an animated object.
pub fn frame_plan(objects: &[GeneratedObject]) -> (usize, u32) {
    let count = objects.iter().map(GeneratedObject::frame_count).max().unwrap_or(1);
    let delay = objects
        .iter()
        .filter_map(GeneratedObject::delay_ms)
        .find(|delay| *delay > 0)
        .unwrap_or(DEFAULT_FRAME_DELAY_MS);
    (count, delay)
}

/// Pick, for every output frame, the frame each object contributes.
pub fn synchronize(objects: &[GeneratedObject]) -> Vec<Vec<&RgbaImage>> {
    let (count, _) = frame_plan(objects);
    (0..count).map(|i| objects.iter().map(|object| object.frame(i)).collect()).collect()
}

/// Draw one output frame from its parts.
pub fn compose_frame(parts: &[&RgbaImage], layout: &FrameLayout) -> RgbaImage {
    let sizes: Vec<(u32, u32)> = parts.iter().map(|part| part.dimensions()).collect();
    let (width, height) = layout.canvas_size(&sizes);
    let inner_height = height - 2 * layout.border_padding;

    let mut canvas = RgbaImage::new(width, height);
    let mut x = layout.border_padding as i64;
    for part in parts {
        let y = layout.border_padding as i64 + (inner_height - part.height()) as i64 / 2;
        blit(&mut canvas, part, x, y);
        x += (part.width() + layout.object_padding) as i64;
    }
    canvas
}

fn validate(objects: &[GeneratedObject]) -> Result<()> {
    if objects.is_empty() {
        return Err(GeneratorError::invalid("No generators were provided"));
    }
    for (index, object) in objects.iter().enumerate() {
        if object.frame_count() == 0 {
            return Err(GeneratorError::invalid(format!("Generated object #{} has no frames", index + 1)));
        }
        if object.frames().iter().any(|frame| frame.width() == 0 || frame.height() == 0) {
            return Err(GeneratorError::invalid(format!("Generated object #{} has no pixels", index + 1)));
        }
    }
    Ok(())
}

/// Compose `objects` in order, honouring cancellation between frames.
pub fn compose(objects: &[GeneratedObject], layout: &FrameLayout, cancel: &CancelToken) -> Result<GeneratedObject> {
    validate(objects)?;

    if !objects.iter().any(GeneratedObject::is_animated) {
        let parts: Vec<&RgbaImage> = objects.iter().map(GeneratedObject::preview).collect();
        return Ok(GeneratedObject::still(compose_frame(&parts, layout)));
    }

    let (count, delay_ms) = frame_plan(objects);
    tracing::debug!("Composing {} objects into {} frames at {}ms", objects.len(), count, delay_ms);

    let mut frames = Vec::with_capacity(count);
    for parts in synchronize(objects) {
        cancel.check()?;
        frames.push(compose_frame(&parts, layout));
    }
    GeneratedObject::animated(frames, delay_ms).ok_or_else(|| GeneratorError::internal("Frame composition", "no frames"))
}
