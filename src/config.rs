use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::record::load_custom_palette;
use crate::engine::{Engine, EngineKind, ThemePalette};
use crate::error::Result;
use crate::quantizer::QuantizerKind;
use crate::utils::{file_utils, paths};

/// User configuration, stored as `config.json`. Missing fields fall back to
/// their defaults, so partial files are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineKind,
    pub quantizer: QuantizerKind,
    /// Only used by the K-means quantizer; unset means a fresh seed per run
    pub kmeans_seed: Option<u64>,
    pub light: bool,
    pub progress: bool,
    #[serde(rename = "override")]
    pub override_existing: bool,
    pub run_hooks: bool,
    pub data_directory: PathBuf,
    pub cache_directory: PathBuf,
    pub template_directory: PathBuf,
    pub hooks_directory: PathBuf,
    pub custom_theme_path: PathBuf,
    pub use_custom_theme: bool,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = paths::config_dir();
        Self {
            engine: EngineKind::default(),
            quantizer: QuantizerKind::default(),
            kmeans_seed: None,
            light: false,
            progress: false,
            override_existing: false,
            run_hooks: true,
            data_directory: paths::data_dir(),
            cache_directory: paths::cache_dir(),
            template_directory: config_dir.join("templates"),
            hooks_directory: config_dir.join("hooks"),
            custom_theme_path: config_dir.join("theme.json"),
            use_custom_theme: false,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Load `path`, writing the defaults there first if it does not exist.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        let config = Self::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        config.save(path)?;
        info!("wrote default configuration to {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        file_utils::write_atomic(path, &json)?;
        Ok(())
    }

    pub fn build_engine(&self) -> Engine {
        Engine::from_kinds(self.engine, self.quantizer, self.kmeans_seed)
    }

    /// The hand-written palette, when custom themes are enabled.
    pub fn custom_palette(&self) -> Result<Option<ThemePalette>> {
        if !self.use_custom_theme {
            return Ok(None);
        }
        load_custom_palette(&self.custom_theme_path).map(Some)
    }

    pub fn hooks(&self) -> Option<PathBuf> {
        self.run_hooks.then(|| self.hooks_directory.clone())
    }
}
