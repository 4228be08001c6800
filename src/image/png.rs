//! PNG input and output.
//!
//! Images are written as 8-bit RGBA. Scaling is nearest-neighbour so hard
//! mask edges stay crisp.

use std::io::Cursor;
use std::path::Path;

use ::image::{ImageBuffer, ImageFormat, RgbaImage};

use crate::error::{ArlunioError, Result};

use super::{buffer_len, Image};

impl Image {
    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let buffer = self.to_rgba_image()?;
        let mut bytes = Cursor::new(Vec::new());
        buffer
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| ArlunioError::image(format!("Failed to encode PNG: {}", e)))?;

        Ok(bytes.into_inner())
    }

    /// Decode PNG bytes. Any colour type is converted to RGBA.
    pub fn decode_png(bytes: &[u8]) -> Result<Self> {
        let decoded = ::image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| ArlunioError::image(format!("Failed to decode PNG: {}", e)))?
            .to_rgba8();

        Ok(Self::from_rgba_image(decoded))
    }

    /// Write a PNG file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.to_rgba_image()?
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| ArlunioError::Io {
                path: path.to_path_buf(),
                message: format!("Failed to write PNG: {}", e),
            })
    }

    /// Read a PNG file.
    pub fn open(path: &Path) -> Result<Self> {
        let decoded = ::image::open(path)
            .map_err(|e| ArlunioError::Io {
                path: path.to_path_buf(),
                message: format!("Failed to read image: {}", e),
            })?
            .to_rgba8();

        Ok(Self::from_rgba_image(decoded))
    }

    /// Scale by an integer factor, repeating each pixel. A factor of 0 is
    /// treated as 1.
    ///
    /// Fails when the scaled image would not fit in memory.
    pub fn upscale(&self, scale: usize) -> Result<Image> {
        let scale = scale.max(1);
        if scale == 1 {
            return Ok(self.clone());
        }

        let (width, height) = match (self.width.checked_mul(scale), self.height.checked_mul(scale)) {
            (Some(width), Some(height)) => (width, height),
            _ => return Err(too_large_to_scale(self, scale)),
        };
        let len = buffer_len(width, height).map_err(|_| too_large_to_scale(self, scale))?;
        if self.pixels.is_empty() {
            return Ok(Image {
                width,
                height,
                pixels: Vec::new(),
            });
        }

        let mut pixels = Vec::with_capacity(len);

        for row in self.pixels.chunks(self.width * 4) {
            let mut scaled_row = Vec::with_capacity(width * 4);
            for px in row.chunks(4) {
                for _ in 0..scale {
                    scaled_row.extend_from_slice(px);
                }
            }
            for _ in 0..scale {
                pixels.extend_from_slice(&scaled_row);
            }
        }

        Ok(Image {
            width,
            height,
            pixels,
        })
    }

    fn to_rgba_image(&self) -> Result<RgbaImage> {
        let (width, height) = (to_u32(self.width)?, to_u32(self.height)?);
        ImageBuffer::from_raw(width, height, self.pixels.clone())
            .ok_or_else(|| ArlunioError::image(format!("Pixel buffer does not fit a {}", self)))
    }

    fn from_rgba_image(buffer: RgbaImage) -> Self {
        Image {
            width: buffer.width() as usize,
            height: buffer.height() as usize,
            pixels: buffer.into_raw(),
        }
    }
}

fn too_large_to_scale(image: &Image, scale: usize) -> ArlunioError {
    ArlunioError::image(format!("Cannot scale a {} by {}", image, scale))
        .with_help("Use a smaller scale factor")
}

fn to_u32(dimension: usize) -> Result<u32> {
    u32::try_from(dimension)
        .map_err(|_| ArlunioError::image(format!("Dimension {} is too large for PNG", dimension)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;
    use tempfile::tempdir;

    fn checker() -> Image {
        let mut image = Image::new(2, 2);
        image.set(0, 0, Colour::BLACK);
        image.set(1, 1, Colour::BLACK);
        image
    }

    #[test]
    fn test_save_and_open() {
        let image = checker();
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        image.save(&path).unwrap();
        assert!(path.exists());

        let loaded = Image::open(&path).unwrap();
        assert_eq!(loaded, image);
        assert_eq!(loaded.get(0, 0), Some(Colour::BLACK));
        assert_eq!(loaded.get(1, 0), Some(Colour::WHITE));
    }

    #[test]
    fn test_encode_keeps_transparency() {
        let mut image = Image::filled(2, 1, Colour::TRANSPARENT);
        image.set(1, 0, Colour::new(255, 0, 0, 128));

        let bytes = image.encode_png().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let decoded = Image::decode_png(&bytes).unwrap();
        assert_eq!(decoded.get(0, 0), Some(Colour::TRANSPARENT));
        assert_eq!(decoded.get(1, 0), Some(Colour::new(255, 0, 0, 128)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Image::decode_png(b"not a png").is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = Image::open(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, ArlunioError::Io { .. }));
    }

    #[test]
    fn test_upscale() {
        let image = checker().upscale(2).unwrap();
        assert_eq!(image.to_string(), "4x4 Image");
        assert_eq!(image.get(0, 0), Some(Colour::BLACK));
        assert_eq!(image.get(1, 1), Some(Colour::BLACK));
        assert_eq!(image.get(2, 0), Some(Colour::WHITE));
        assert_eq!(image.get(3, 3), Some(Colour::BLACK));
    }

    #[test]
    fn test_upscale_zero_treated_as_one() {
        let image = checker();
        assert_eq!(image.upscale(0).unwrap(), image);
    }

    #[test]
    fn test_upscale_rejects_huge_factor() {
        let image = Image::new(256, 256);
        let err = image.upscale(u32::MAX as usize).unwrap_err();
        assert!(matches!(err, ArlunioError::Image { .. }));
        assert!(image.upscale(usize::MAX).is_err());
    }
}
