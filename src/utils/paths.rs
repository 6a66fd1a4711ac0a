use std::path::PathBuf;

pub const APP_NAME: &str = "wallhue";

/// Falls back to `~/.<name>` when the platform has no XDG equivalent, and to the
/// working directory when there is no home either.
fn resolve(base: Option<PathBuf>, fallback: &str) -> PathBuf {
    base.map(|dir| dir.join(APP_NAME))
        .or_else(|| dirs::home_dir().map(|home| home.join(fallback).join(APP_NAME)))
        .unwrap_or_else(|| PathBuf::from(fallback).join(APP_NAME))
}

pub fn config_dir() -> PathBuf {
    resolve(dirs::config_dir(), ".config")
}

pub fn cache_dir() -> PathBuf {
    resolve(dirs::cache_dir(), ".cache")
}

pub fn data_dir() -> PathBuf {
    resolve(dirs::data_dir(), ".local/share")
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.json")
}
