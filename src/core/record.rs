use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::RgbColor;
use crate::engine::ThemePalette;
use crate::error::Result;
use crate::utils::file_utils;

/// One cached theme: both palette variants, the source image and its
/// dominant color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteRecord {
    pub colors: ThemePalette,
    pub wallpaper: PathBuf,
    pub primary: RgbColor,
}

impl PaletteRecord {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        file_utils::write_atomic(path, &json)?;
        Ok(())
    }
}

/// Read a hand-written `{"dark": {...}, "light": {...}}` palette.
pub fn load_custom_palette(path: &Path) -> Result<ThemePalette> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}
