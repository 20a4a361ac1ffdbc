//! The raster produced by every generator

use image::RgbaImage;

/// Either one static raster or an animation.
///
/// An animation always has at least one frame: the representation is
/// private and [`GeneratedObject::animated`] rejects an empty frame list.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedObject {
    repr: Repr,
}

#[derive(Debug, Clone, PartialEq)]
enum Repr {
    Static(RgbaImage),
    Animated { frames: Vec<RgbaImage>, delay_ms: u32 },
}

impl GeneratedObject {
    pub fn still(image: RgbaImage) -> Self {
        Self { repr: Repr::Static(image) }
    }

    /// Build an animation; an empty frame list is rejected.
    pub fn animated(frames: Vec<RgbaImage>, delay_ms: u32) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Self { repr: Repr::Animated { frames, delay_ms } })
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.repr, Repr::Animated { .. })
    }

    /// Static objects count as one frame
    pub fn frame_count(&self) -> usize {
        match &self.repr {
            Repr::Static(_) => 1,
            Repr::Animated { frames, .. } => frames.len(),
        }
    }

    /// Declared delay; static objects have none
    pub fn delay_ms(&self) -> Option<u32> {
        match &self.repr {
            Repr::Static(_) => None,
            Repr::Animated { delay_ms, .. } => Some(*delay_ms),
        }
    }

    /// Frame `index`, wrapping around the frame count
    pub fn frame(&self, index: usize) -> &RgbaImage {
        match &self.repr {
            Repr::Static(image) => image,
            Repr::Animated { frames, .. } => &frames[index % frames.len()],
        }
    }

    /// The static image, or the first frame of an animation
    pub fn preview(&self) -> &RgbaImage {
        self.frame(0)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.preview().dimensions()
    }

    /// All frames, a static image being a single one
    pub fn frames(&self) -> Vec<&RgbaImage> {
        (0..self.frame_count()).map(|i| self.frame(i)).collect()
    }

    /// Animation frames and delay, `None` for a static object
    pub fn animation(&self) -> Option<(&[RgbaImage], u32)> {
        match &self.repr {
            Repr::Static(_) => None,
            Repr::Animated { frames, delay_ms } => Some((frames, *delay_ms)),
        }
    }

    /// Apply `f` to every frame, keeping the animation shape.
    pub fn map_frames<F>(self, mut f: F) -> Self
    where
        F: FnMut(RgbaImage) -> RgbaImage,
    {
        let repr = match self.repr {
            Repr::Static(image) => Repr::Static(f(image)),
            Repr::Animated { frames, delay_ms } => Repr::Animated { frames: frames.into_iter().map(f).collect(), delay_ms },
        };
        Self { repr }
    }
}
