//! Publishing a cached theme: template rendering, the `image` symlink and hooks.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rand::seq::SliceRandom;

use crate::color::RgbColor;
use crate::core::hooks;
use crate::core::record::PaletteRecord;
use crate::core::theme_store::{CacheKey, GenerateOptions, ThemeStore};
use crate::engine::{Engine, Slots};
use crate::error::{Result, ThemeError};
use crate::utils::file_utils;

pub const TEMPLATE_SUFFIX: &str = ".base";
pub const IMAGE_LINK: &str = "image";

/// What an update left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTheme {
    pub wallpaper: PathBuf,
    pub rendered: Vec<PathBuf>,
    pub hooks_run: usize,
}

pub struct Applier<'a> {
    store: &'a ThemeStore,
    template_dir: PathBuf,
    output_dir: PathBuf,
    hooks_dir: Option<PathBuf>,
}

impl<'a> Applier<'a> {
    /// `hooks_dir = None` disables hooks.
    pub fn new(store: &'a ThemeStore, template_dir: PathBuf, output_dir: PathBuf, hooks_dir: Option<PathBuf>) -> Self {
        Self { store, template_dir, output_dir, hooks_dir }
    }

    pub fn image_link(&self) -> PathBuf {
        self.output_dir.join(IMAGE_LINK)
    }

    /// Apply the cached theme for `image`, failing with `NoPreGenTheme` on a miss.
    /// `cache_name` is the engine's cache identity, see [`Engine::cache_name`].
    pub fn update(&self, image: &Path, cache_name: &str, light: bool) -> Result<AppliedTheme> {
        let key = CacheKey::for_image(image, cache_name)?;
        let record = self.store.lookup(&key)?.ok_or_else(|| ThemeError::NoPreGenTheme {
            image: image.to_path_buf(),
            engine: cache_name.to_string(),
        })?;
        self.apply(image, &record, light)
    }

    /// Update, generating the record first when it is missing. Generation
    /// happens at most once; a second miss is returned as is.
    pub fn update_theme(&self, image: &Path, engine: &Engine, options: &GenerateOptions, light: bool) -> Result<AppliedTheme> {
        let cache_name = engine.cache_name();
        match self.update(image, &cache_name, light) {
            Err(ThemeError::NoPreGenTheme { .. }) => {
                info!("no cached {} theme for {}, generating", cache_name, image.display());
                let mut report = self.store.generate(&[image.to_path_buf()], engine, options);
                if let Some(err) = report.take_failure(image) {
                    return Err(err);
                }
                self.update(image, &cache_name, light)
            }
            other => other,
        }
    }

    /// The image the `image` symlink currently points at.
    pub fn current_image(&self) -> Result<PathBuf> {
        Ok(fs::read_link(self.image_link())?)
    }

    fn apply(&self, image: &Path, record: &PaletteRecord, light: bool) -> Result<AppliedTheme> {
        fs::create_dir_all(&self.output_dir)?;
        let slots = record.colors.variant(light);

        // 1. Templates
        let rendered = match render_templates(&self.template_dir, &self.output_dir, slots, record.primary) {
            Ok(rendered) => rendered,
            Err(ThemeError::TemplateDirectoryMissing(dir)) => {
                warn!("no templates found in {}, skipping rendering", dir.display());
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        // 2. Symlink
        let wallpaper = fs::canonicalize(image)?;
        file_utils::replace_symlink(&wallpaper, &self.image_link())?;

        // 3. Hooks
        let hooks_run = match &self.hooks_dir {
            Some(dir) => hooks::run_hooks(dir, light)?,
            None => 0,
        };

        info!("applied {} theme from {}", if light { "light" } else { "dark" }, wallpaper.display());
        Ok(AppliedTheme { wallpaper, rendered, hooks_run })
    }
}

/// Pick the image to apply: the file itself, or a random image of a directory.
pub fn resolve_image(path: &Path) -> Result<PathBuf> {
    let images = file_utils::get_image_list(path)?;
    images
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| ThemeError::NoImages(path.to_path_buf()))
}

pub fn render_template(template: &str, slots: &Slots, primary: RgbColor) -> String {
    let mut out = template.to_string();
    for (name, hex) in slots.named() {
        out = out.replace(&format!("[{}]", name), &hex);
    }

    let named = [
        ("[background]", slots.hex(0)),
        ("[background_light]", slots.hex(8)),
        ("[foreground]", slots.hex(15)),
        ("[foreground_dark]", slots.hex(7)),
        ("[primary]", primary.to_hex()),
    ];
    for (placeholder, hex) in named {
        out = out.replace(placeholder, &hex);
    }
    out
}

/// Render every `*.base` template of `template_dir` into `output_dir`.
pub fn render_templates(template_dir: &Path, output_dir: &Path, slots: &Slots, primary: RgbColor) -> Result<Vec<PathBuf>> {
    if !template_dir.is_dir() {
        return Err(ThemeError::TemplateDirectoryMissing(template_dir.to_path_buf()));
    }

    let mut templates: Vec<(PathBuf, String)> = fs::read_dir(template_dir)?
        .filter_map(|entry| entry.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter_map(|p| {
            let name = p.file_name()?.to_str()?;
            let output = name.strip_suffix(TEMPLATE_SUFFIX)?;
            if output.is_empty() {
                return None;
            }
            let output = output.to_string();
            Some((p, output))
        })
        .collect();
    templates.sort();

    if templates.is_empty() {
        return Err(ThemeError::TemplateDirectoryMissing(template_dir.to_path_buf()));
    }

    let mut rendered = Vec::with_capacity(templates.len());
    for (template, output) in templates {
        let source = fs::read_to_string(&template)?;
        let target = output_dir.join(output);
        file_utils::write_atomic(&target, render_template(&source, slots, primary).as_bytes())?;
        debug!("rendered {} -> {}", template.display(), target.display());
        rendered.push(target);
    }
    Ok(rendered)
}
