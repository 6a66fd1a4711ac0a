//! Palette synthesis engines.
//!
//! An [`Engine`] is assembled from four independent parts instead of a class
//! per combination: a [`Quantizer`], a base-color [`Selection`], a
//! [`DominantStyle`] and a [`PaletteExpansion`] table.

pub mod hue;
pub mod palette;
pub mod vibrance;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::space::{change_rgb_saturation, change_rgb_value};
use crate::color::RgbColor;
use crate::decoder::SampledImage;
use crate::error::{Result, ThemeError};
use crate::quantizer::{KMeansQuantizer, Quantizer, QuantizerKind};

pub use palette::{PaletteExpansion, Slots, ThemePalette};

/// Colors requested from the quantizer when building a palette
pub const PALETTE_SIZE: usize = 16;
/// Value the dominant color is forced to so it stays legible
pub const DOMINANT_VALUE: f64 = 0.7;
pub const PASTEL_DOMINANT_SATURATION: f64 = 0.4;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    #[default]
    Vibrance,
    Hue,
    Pastel,
    #[value(name = "pastel_hue")]
    PastelHue,
    Kmeans,
}

impl EngineKind {
    /// Identity used in cache keys
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Vibrance => "vibrance",
            EngineKind::Hue => "hue",
            EngineKind::Pastel => "pastel",
            EngineKind::PastelHue => "pastel_hue",
            EngineKind::Kmeans => "kmeans",
        }
    }

    /// Quantizer the engine uses unless configured otherwise
    pub fn default_quantizer(self) -> QuantizerKind {
        match self {
            EngineKind::Kmeans => QuantizerKind::Kmeans,
            _ => QuantizerKind::Histogram,
        }
    }

    fn parts(self) -> (Selection, DominantStyle, &'static PaletteExpansion) {
        match self {
            EngineKind::Vibrance => (Selection::Vibrance, DominantStyle::Standard, &palette::STANDARD),
            EngineKind::Hue => (Selection::Hue, DominantStyle::Standard, &palette::STANDARD),
            EngineKind::Pastel => (Selection::Vibrance, DominantStyle::Pastel, &palette::PASTEL),
            EngineKind::PastelHue => (Selection::Hue, DominantStyle::Pastel, &palette::PASTEL),
            EngineKind::Kmeans => (Selection::Dominance, DominantStyle::Standard, &palette::STANDARD),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = ThemeError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "vibrance" => Ok(EngineKind::Vibrance),
            "hue" => Ok(EngineKind::Hue),
            "pastel" => Ok(EngineKind::Pastel),
            "pastel_hue" | "pastel-hue" => Ok(EngineKind::PastelHue),
            "kmeans" | "k_means" => Ok(EngineKind::Kmeans),
            other => Err(ThemeError::UnknownEngine(other.to_string())),
        }
    }
}

/// How the 7 base colors are picked
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Most vibrant 7 of a 16-color reduction, in dominance order
    Vibrance,
    /// Canonical terminal hues anchored on the dominant color
    Hue,
    /// The 7 most dominant colors as-is
    Dominance,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DominantStyle {
    Standard,
    /// Full brightness, low saturation
    Pastel,
}

pub struct Engine {
    kind: EngineKind,
    quantizer: Box<dyn Quantizer>,
    selection: Selection,
    dominant_style: DominantStyle,
    expansion: &'static PaletteExpansion,
}

impl Engine {
    pub fn new(kind: EngineKind, quantizer: Box<dyn Quantizer>) -> Self {
        let (selection, dominant_style, expansion) = kind.parts();
        Self { kind, quantizer, selection, dominant_style, expansion }
    }

    /// Build from configuration. The K-means engine always clusters with the
    /// K-means quantizer; the others use the configured strategy.
    pub fn from_kinds(kind: EngineKind, quantizer: QuantizerKind, seed: Option<u64>) -> Self {
        let quantizer: Box<dyn Quantizer> = match kind {
            EngineKind::Kmeans => Box::new(KMeansQuantizer::new(seed)),
            _ => quantizer.build(seed),
        };
        Self::new(kind, quantizer)
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn quantizer_name(&self) -> &'static str {
        self.quantizer.name()
    }

    /// Identity of this engine in cache keys: the engine name, suffixed with
    /// the quantizer when it is not the engine's default one, so palettes from
    /// different quantizers never share a record.
    pub fn cache_name(&self) -> String {
        let quantizer = self.quantizer_name();
        if quantizer == self.kind.default_quantizer().name() {
            self.name().to_string()
        } else {
            format!("{}-{}", self.name(), quantizer)
        }
    }

    /// The 7 base colors; index 0 anchors background and foreground.
    pub fn generate(&self, image: &SampledImage) -> Result<Vec<RgbColor>> {
        match self.selection {
            Selection::Vibrance => {
                let colors = self.quantizer.extract(image, PALETTE_SIZE)?;
                Ok(vibrance::sort_colors(&colors))
            }
            Selection::Hue => {
                let dominant = self.get_dominant_color(image)?;
                let distance = hue::get_min_distance_hues(dominant);
                Ok(hue::shift_hues_distance(&hue::generate_base_colors(dominant), distance))
            }
            Selection::Dominance => {
                let mut colors = self.quantizer.extract(image, PALETTE_SIZE)?;
                colors.truncate(vibrance::BASE_COLOR_COUNT);
                Ok(colors)
            }
        }
    }

    pub fn get_dominant_color(&self, image: &SampledImage) -> Result<RgbColor> {
        let dominant = change_rgb_value(self.quantizer.dominant(image)?, Some(DOMINANT_VALUE));
        Ok(match self.dominant_style {
            DominantStyle::Standard => dominant,
            DominantStyle::Pastel => change_rgb_saturation(
                change_rgb_value(dominant, Some(1.0)),
                Some(PASTEL_DOMINANT_SATURATION),
            ),
        })
    }

    pub fn get_palette(&self, base: &[RgbColor]) -> ThemePalette {
        self.expansion.expand(base)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("kind", &self.kind)
            .field("quantizer", &self.quantizer.name())
            .field("selection", &self.selection)
            .field("dominant_style", &self.dominant_style)
            .finish()
    }
}
