use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between reading an image and publishing a theme.
///
/// Per-image variants (`InsufficientPalette`, `InvalidImage`) are isolated by the
/// batch generator; `NoPreGenTheme` drives the generate-then-retry update protocol.
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("quantizer found only {found} distinct colors, more than 8 are required")]
    InsufficientPalette { found: usize },

    #[error("no pre-generated theme for {} with engine `{engine}`", image.display())]
    NoPreGenTheme { image: PathBuf, engine: String },

    #[error("{} is not a decodable image", path.display())]
    InvalidImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no templates found in {}", .0.display())]
    TemplateDirectoryMissing(PathBuf),

    #[error("{} does not contain any images", .0.display())]
    NoImages(PathBuf),

    #[error("unknown engine `{0}` (expected vibrance, hue, pastel, pastel_hue or kmeans)")]
    UnknownEngine(String),

    #[error("unknown quantizer `{0}` (expected histogram or kmeans)")]
    UnknownQuantizer(String),

    #[error("invalid hex color `{0}`")]
    InvalidHex(String),

    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ThemeError>;
