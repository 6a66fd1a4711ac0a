use color_thief::ColorFormat;
use log::debug;

use super::Quantizer;
use crate::color::RgbColor;
use crate::decoder::SampledImage;
use crate::error::Result;

/// Median-cut extraction over a 5-bit-per-channel color histogram.
pub struct HistogramQuantizer {
    /// Pixel sampling step (1 = every pixel)
    pub quality: u8,
}

impl Default for HistogramQuantizer {
    fn default() -> Self {
        Self { quality: 3 }
    }
}

impl Quantizer for HistogramQuantizer {
    fn name(&self) -> &'static str {
        "histogram"
    }

    fn quantize(&self, image: &SampledImage, count: usize) -> Result<Vec<RgbColor>> {
        let max_colors = count.clamp(2, u8::MAX as usize) as u8;
        let quality = self.quality.clamp(1, 10);

        match color_thief::get_palette(&image.buffer, ColorFormat::Rgb, quality, max_colors) {
            Ok(palette) => Ok(palette.into_iter().map(|c| RgbColor(c.r, c.g, c.b)).collect()),
            // Median cut cannot split a box holding a single color (flat or all-white images);
            // report an empty reduction and let the caller decide.
            Err(err) => {
                debug!("median cut gave up: {:?}", err);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ThemeError;
    use image::{Rgb, RgbImage};

    fn gradient() -> SampledImage {
        let source = RgbImage::from_fn(96, 96, |x, y| {
            Rgb([(x * 255 / 95) as u8, (y * 255 / 95) as u8, ((x + y) * 255 / 190) as u8 / 2])
        });
        SampledImage::from_rgb(&source)
    }

    #[test]
    fn test_gradient_yields_a_palette() {
        let colors = HistogramQuantizer::default().extract(&gradient(), 16).unwrap();
        assert!(colors.len() > 8 && colors.len() <= 16);
    }

    #[test]
    fn test_is_deterministic() {
        let image = gradient();
        let quantizer = HistogramQuantizer::default();
        assert_eq!(quantizer.quantize(&image, 16).unwrap(), quantizer.quantize(&image, 16).unwrap());
        assert_eq!(quantizer.dominant(&image).unwrap(), quantizer.dominant(&image).unwrap());
    }

    #[test]
    fn test_flat_image_is_insufficient() {
        let flat = SampledImage::from_rgb(&RgbImage::from_pixel(32, 32, Rgb([40, 90, 200])));
        let err = HistogramQuantizer::default().extract(&flat, 16).unwrap_err();
        assert!(matches!(err, ThemeError::InsufficientPalette { .. }));
    }
}
