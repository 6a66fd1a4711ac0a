use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;

use crate::color::RgbColor;
use crate::error::{Result, ThemeError};

/// Fixed raster every image is reduced to before quantization, so the cost of
/// palette extraction does not depend on the source resolution.
pub const SAMPLE_WIDTH: u32 = 150;
pub const SAMPLE_HEIGHT: u32 = 75;

/// Downsampled RGB8 copy of a source image
#[derive(Clone, Debug)]
pub struct SampledImage {
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl SampledImage {
    pub fn new(buffer: Vec<u8>, width: u32, height: u32) -> Self {
        Self { buffer, width, height }
    }

    /// Decode already-read image bytes; `path` is only used for error reporting.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(|source| ThemeError::InvalidImage {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_rgb(&decoded.to_rgb8()))
    }

    /// Nearest-neighbour resize to the fixed sampling raster.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let resized = image::imageops::resize(image, SAMPLE_WIDTH, SAMPLE_HEIGHT, FilterType::Nearest);
        let (width, height) = resized.dimensions();
        Self::new(resized.into_raw(), width, height)
    }

    pub fn pixel_count(&self) -> usize {
        self.buffer.len() / 3
    }

    pub fn pixels(&self) -> impl Iterator<Item = RgbColor> + '_ {
        self.buffer.chunks_exact(3).map(|p| RgbColor(p[0], p[1], p[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_resizes_to_fixed_raster() {
        let source = RgbImage::from_fn(640, 480, |x, _| Rgb([(x % 256) as u8, 0, 0]));
        let sample = SampledImage::from_rgb(&source);
        assert_eq!((sample.width, sample.height), (SAMPLE_WIDTH, SAMPLE_HEIGHT));
        assert_eq!(sample.pixel_count(), (SAMPLE_WIDTH * SAMPLE_HEIGHT) as usize);
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let err = SampledImage::from_bytes(Path::new("notes.txt"), b"definitely not a png").unwrap_err();
        assert!(matches!(err, ThemeError::InvalidImage { .. }));
    }

    #[test]
    fn test_flat_image_stays_flat() {
        let source = RgbImage::from_pixel(10, 10, Rgb([7, 8, 9]));
        let sample = SampledImage::from_rgb(&source);
        assert!(sample.pixels().all(|p| p == RgbColor(7, 8, 9)));
    }
}
