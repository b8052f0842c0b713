use crate::ImageError;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, ImageFormat};
use std::path::Path;

/// A batch of frames laid out as `[batch, height, width, channels]`, with
/// channel values normalized to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    data: Vec<f32>,
    batch: usize,
    height: usize,
    width: usize,
    channels: usize,
}

impl ImageBatch {
    pub fn new(
        data: Vec<f32>,
        batch: usize,
        height: usize,
        width: usize,
        channels: usize,
    ) -> Result<Self, ImageError> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(ImageError::UnsupportedChannels(channels));
        }
        if height == 0 || width == 0 {
            return Err(ImageError::Shape(format!(
                "frames must be at least 1x1, got {width}x{height}"
            )));
        }
        let expected = batch
            .checked_mul(height)
            .and_then(|n| n.checked_mul(width))
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| ImageError::Shape("shape overflows usize".to_string()))?;
        if data.len() != expected {
            return Err(ImageError::Shape(format!(
                "expected {expected} values for [{batch}, {height}, {width}, {channels}], got {}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            batch,
            height,
            width,
            channels,
        })
    }

    /// Build a batch from RGB frames given as `frames[frame][y][x] = [r, g, b]`.
    pub fn from_rgb_frames(frames: &[Vec<Vec<[f32; 3]>>]) -> Result<Self, ImageError> {
        let height = frames.first().map_or(0, Vec::len);
        let width = frames
            .first()
            .and_then(|frame| frame.first())
            .map_or(0, Vec::len);

        let mut data = Vec::with_capacity(frames.len() * height * width * 3);
        for (index, frame) in frames.iter().enumerate() {
            if frame.len() != height || frame.iter().any(|row| row.len() != width) {
                return Err(ImageError::Shape(format!(
                    "frame {index} does not match the {width}x{height} size of frame 0"
                )));
            }
            for pixel in frame.iter().flatten() {
                data.extend_from_slice(pixel);
            }
        }

        Self::new(data, frames.len(), height, width, 3)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batch
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch == 0
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Channel values of one frame, row-major.
    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        if index >= self.batch {
            return None;
        }
        let frame_len = self.height * self.width * self.channels;
        let start = index * frame_len;
        self.data.get(start..start + frame_len)
    }
}

/// A base64 image ready to embed in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Standard-alphabet base64 of the image file bytes.
    pub data: String,
    /// MIME subtype, e.g. "png". The media type sent is `image/{subtype}`.
    pub media_subtype: String,
}

impl EncodedImage {
    /// Wrap raw image file bytes, sniffing the format from the magic bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let format = image::guess_format(bytes)
            .map_err(|_| ImageError::UnsupportedFormat("unrecognized image data".to_string()))?;
        let media_subtype = match format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            other => return Err(ImageError::UnsupportedFormat(format!("{other:?}"))),
        };
        Ok(Self {
            data: BASE64_STANDARD.encode(bytes),
            media_subtype: media_subtype.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    #[must_use]
    pub fn media_type(&self) -> String {
        format!("image/{}", self.media_subtype)
    }
}

/// Encode the first frame of the batch as a base64 PNG.
pub fn encode_batch(batch: &ImageBatch) -> Result<EncodedImage, ImageError> {
    let png = encode_png(batch)?;
    Ok(EncodedImage {
        data: BASE64_STANDARD.encode(png),
        media_subtype: "png".to_string(),
    })
}

/// PNG bytes of the first frame of the batch.
pub fn encode_png(batch: &ImageBatch) -> Result<Vec<u8>, ImageError> {
    let frame = batch.frame(0).ok_or(ImageError::EmptyBatch)?;
    let pixels: Vec<u8> = frame.iter().copied().map(to_u8).collect();

    let width = u32::try_from(batch.width())
        .map_err(|_| ImageError::Shape(format!("width {} too large", batch.width())))?;
    let height = u32::try_from(batch.height())
        .map_err(|_| ImageError::Shape(format!("height {} too large", batch.height())))?;
    let color_type = match batch.channels() {
        1 => ExtendedColorType::L8,
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        other => return Err(ImageError::UnsupportedChannels(other)),
    };

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(&pixels, width, height, color_type)?;
    Ok(png)
}

// Clamp then truncate, like `np.clip(x * 255, 0, 255).astype(np.uint8)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(value: f32) -> u8 {
    if value.is_finite() {
        (value.clamp(0.0, 1.0) * 255.0) as u8
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_png(png: &[u8]) -> image::RgbImage {
        image::load_from_memory_with_format(png, ImageFormat::Png)
            .unwrap()
            .to_rgb8()
    }

    #[test]
    fn scales_values_to_bytes() {
        assert_eq!(to_u8(0.0), 0);
        assert_eq!(to_u8(1.0), 255);
        assert_eq!(to_u8(0.5), 127);
        assert_eq!(to_u8(-0.2), 0);
        assert_eq!(to_u8(1.7), 255);
        assert_eq!(to_u8(f32::NAN), 0);
    }

    #[test]
    fn rejects_mismatched_shape() {
        let err = ImageBatch::new(vec![0.0; 5], 1, 1, 2, 3).unwrap_err();
        assert!(matches!(err, ImageError::Shape(_)));
    }

    #[test]
    fn rejects_zero_sized_frames() {
        for (height, width) in [(0, 0), (0, 4), (4, 0)] {
            let err = ImageBatch::new(Vec::new(), 1, height, width, 3).unwrap_err();
            assert!(matches!(err, ImageError::Shape(_)), "{height}x{width}: {err:?}");
        }
    }

    #[test]
    fn rejects_unsupported_channels() {
        let err = ImageBatch::new(vec![0.0; 2], 1, 1, 1, 2).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedChannels(2)));
    }

    #[test]
    fn empty_batch_fails_to_encode() {
        let batch = ImageBatch::new(Vec::new(), 0, 4, 4, 3).unwrap();
        assert!(batch.is_empty());
        assert!(matches!(
            encode_batch(&batch).unwrap_err(),
            ImageError::EmptyBatch
        ));
    }

    #[test]
    fn encodes_first_frame_only() {
        let red = [1.0, 0.0, 0.0];
        let blue = [0.0, 0.0, 1.0];
        let batch = ImageBatch::from_rgb_frames(&[
            vec![vec![red, red], vec![red, red]],
            vec![vec![blue, blue], vec![blue, blue]],
        ])
        .unwrap();
        assert_eq!(batch.len(), 2);

        let decoded = decode_png(&encode_png(&batch).unwrap());
        assert_eq!(decoded.dimensions(), (2, 2));
        assert!(decoded.pixels().all(|p| p.0 == [255, 0, 0]));
    }

    #[test]
    fn png_round_trips_pixel_values() {
        let values = [
            [[0.0, 0.25, 0.5], [0.75, 1.0, 0.1]],
            [[0.2, 0.4, 0.6], [0.8, 0.9, 0.3]],
            [[0.33, 0.66, 0.99], [0.01, 0.02, 0.03]],
        ];
        let frame: Vec<Vec<[f32; 3]>> = values.iter().map(|row| row.to_vec()).collect();
        let batch = ImageBatch::from_rgb_frames(&[frame]).unwrap();

        let decoded = decode_png(&encode_png(&batch).unwrap());
        assert_eq!(decoded.dimensions(), (2, 3));
        for (y, row) in values.iter().enumerate() {
            for (x, pixel) in row.iter().enumerate() {
                let actual = decoded.get_pixel(x as u32, y as u32).0;
                for channel in 0..3 {
                    let expected = pixel[channel] * 255.0;
                    let diff = (f32::from(actual[channel]) - expected).abs();
                    assert!(diff <= 1.0, "pixel ({x}, {y}) channel {channel}: {diff}");
                }
            }
        }
    }

    #[test]
    fn base64_decodes_back_to_png_bytes() {
        let batch = ImageBatch::new(vec![0.5; 4 * 4 * 3], 1, 4, 4, 3).unwrap();
        let png = encode_png(&batch).unwrap();
        let encoded = encode_batch(&batch).unwrap();

        assert_eq!(encoded.media_subtype, "png");
        assert_eq!(encoded.media_type(), "image/png");
        assert_eq!(BASE64_STANDARD.decode(&encoded.data).unwrap(), png);
    }

    #[test]
    fn sniffs_format_of_raw_bytes() {
        let batch = ImageBatch::new(vec![0.0; 3], 1, 1, 1, 3).unwrap();
        let png = encode_png(&batch).unwrap();
        assert_eq!(EncodedImage::from_bytes(&png).unwrap().media_subtype, "png");

        let jpeg_header = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(
            EncodedImage::from_bytes(&jpeg_header).unwrap().media_subtype,
            "jpeg"
        );

        assert!(matches!(
            EncodedImage::from_bytes(b"not an image").unwrap_err(),
            ImageError::UnsupportedFormat(_)
        ));
    }
}
