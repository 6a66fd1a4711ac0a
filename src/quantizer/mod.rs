//! Image → small ordered color set reduction.
//!
//! Two interchangeable strategies sit behind [`Quantizer`]: a median-cut
//! histogram extractor and a clean-room K-means clusterer.

pub mod histogram;
pub mod kmeans;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::RgbColor;
use crate::decoder::SampledImage;
use crate::error::{Result, ThemeError};

pub use histogram::HistogramQuantizer;
pub use kmeans::KMeansQuantizer;

/// A palette extraction must yield strictly more distinct colors than this.
pub const MIN_DISTINCT_COLORS: usize = 8;

pub trait Quantizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Up to `count` representative colors, most dominant first.
    fn quantize(&self, image: &SampledImage, count: usize) -> Result<Vec<RgbColor>>;

    /// Palette extraction: like [`Quantizer::quantize`] but duplicates are
    /// dropped and near-flat images are rejected.
    fn extract(&self, image: &SampledImage, count: usize) -> Result<Vec<RgbColor>> {
        let colors = dedup_ordered(self.quantize(image, count)?);
        if colors.len() <= MIN_DISTINCT_COLORS {
            return Err(ThemeError::InsufficientPalette { found: colors.len() });
        }
        Ok(colors)
    }

    /// The single most dominant color of the image.
    fn dominant(&self, image: &SampledImage) -> Result<RgbColor> {
        self.quantize(image, 2)?
            .first()
            .copied()
            .ok_or(ThemeError::InsufficientPalette { found: 0 })
    }
}

fn dedup_ordered(colors: Vec<RgbColor>) -> Vec<RgbColor> {
    let mut unique = Vec::with_capacity(colors.len());
    for color in colors {
        if !unique.contains(&color) {
            unique.push(color);
        }
    }
    unique
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum QuantizerKind {
    #[default]
    Histogram,
    Kmeans,
}

impl QuantizerKind {
    /// Same as [`Quantizer::name`] of the built strategy
    pub fn name(self) -> &'static str {
        match self {
            QuantizerKind::Histogram => "histogram",
            QuantizerKind::Kmeans => "kmeans",
        }
    }

    /// `seed` only affects the K-means strategy; unseeded runs are not reproducible.
    pub fn build(self, seed: Option<u64>) -> Box<dyn Quantizer> {
        match self {
            QuantizerKind::Histogram => Box::new(HistogramQuantizer::default()),
            QuantizerKind::Kmeans => Box::new(KMeansQuantizer::new(seed)),
        }
    }
}

impl FromStr for QuantizerKind {
    type Err = ThemeError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "histogram" => Ok(QuantizerKind::Histogram),
            "kmeans" | "k_means" => Ok(QuantizerKind::Kmeans),
            other => Err(ThemeError::UnknownQuantizer(other.to_string())),
        }
    }
}
