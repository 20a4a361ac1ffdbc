//! GIF encoding of animated output

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::error::{GeneratorError, Result};
use crate::generated::GeneratedObject;

/// Quantizer speed handed to the encoder (1 best, 30 fastest)
const ENCODER_SPEED: i32 = 10;

/// GIF delays are centiseconds, never zero
pub fn delay_centiseconds(delay_ms: u32) -> u32 {
    (delay_ms / 10).max(1)
}

/// Encode frames into a looping GIF byte stream.
pub fn encode_gif(frames: &[RgbaImage], delay_ms: u32) -> Result<Vec<u8>> {
    if frames.is_empty() {
        return Err(GeneratorError::invalid("Cannot encode an animation without frames"));
    }

    let delay = Delay::from_numer_denom_ms(delay_centiseconds(delay_ms) * 10, 1);
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, ENCODER_SPEED);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| GeneratorError::internal("Failed to encode animation", e))?;
        for image in frames {
            encoder
                .encode_frame(Frame::from_parts(image.clone(), 0, 0, delay))
                .map_err(|e| GeneratorError::internal("Failed to encode animation", e))?;
        }
    }
    Ok(bytes)
}

/// GIF bytes for an animated object, `None` for a static one.
pub fn encode_object(object: &GeneratedObject) -> Result<Option<Vec<u8>>> {
    match object.animation() {
        None => Ok(None),
        Some((frames, delay_ms)) => encode_gif(frames, delay_ms).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifDecoder;
    use image::{AnimationDecoder, Rgba};
    use std::io::Cursor;

    fn create_test_frame(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, color)
    }

    #[test]
    fn test_delay_centiseconds() {
        assert_eq!(delay_centiseconds(0), 1);
        assert_eq!(delay_centiseconds(9), 1);
        assert_eq!(delay_centiseconds(50), 5);
        assert_eq!(delay_centiseconds(33), 3);
    }

    #[test]
    fn test_encode_gif_decodes_back() {
        let frames = vec![
            create_test_frame(4, 3, Rgba([255, 0, 0, 255])),
            create_test_frame(4, 3, Rgba([0, 255, 0, 255])),
            create_test_frame(4, 3, Rgba([0, 0, 255, 255])),
        ];
        let bytes = encode_gif(&frames, 50).unwrap();
        assert_eq!(&bytes[..6], b"GIF89a");

        let decoder = GifDecoder::new(Cursor::new(bytes)).unwrap();
        let decoded = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(decoded.len(), 3);
        let (numer, denom) = decoded[0].delay().numer_denom_ms();
        assert_eq!(numer / denom, 50);
        assert_eq!(decoded[0].buffer().dimensions(), (4, 3));
    }

    #[test]
    fn test_encode_empty_rejected() {
        assert!(matches!(encode_gif(&[], 50), Err(GeneratorError::InvalidInput(_))));
    }

    #[test]
    fn test_static_object_has_no_gif() {
        let still = GeneratedObject::still(create_test_frame(1, 1, Rgba([0, 0, 0, 255])));
        assert!(encode_object(&still).unwrap().is_none());
    }
}
