//! Content-addressed palette cache.
//!
//! Records live in `<cache>/themes/{hash}-{engine}.json`. A record is written
//! once per key and only replaced wholesale when regeneration is forced.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::core::record::PaletteRecord;
use crate::decoder::SampledImage;
use crate::engine::{Engine, ThemePalette};
use crate::error::{Result, ThemeError};
use crate::utils::file_utils;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub content_hash: String,
    pub engine: String,
}

impl CacheKey {
    pub fn new(bytes: &[u8], engine: &str) -> Self {
        Self { content_hash: file_utils::content_hash(bytes), engine: engine.to_string() }
    }

    pub fn for_image(path: &Path, engine: &str) -> Result<Self> {
        Ok(Self { content_hash: file_utils::hash_file(path)?, engine: engine.to_string() })
    }

    pub fn file_name(&self) -> String {
        format!("{}-{}.json", self.content_hash, self.engine)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GenerateOptions<'a> {
    /// Regenerate records that already exist
    pub override_existing: bool,
    pub progress: bool,
    /// Use this palette instead of synthesizing one
    pub custom_palette: Option<&'a ThemePalette>,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub generated: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, ThemeError)>,
}

impl GenerateReport {
    /// Remove and return the error recorded for `image`.
    pub fn take_failure(&mut self, image: &Path) -> Option<ThemeError> {
        let index = self.failed.iter().position(|(path, _)| path == image)?;
        Some(self.failed.remove(index).1)
    }
}

enum Outcome {
    Generated,
    Skipped,
    Failed(ThemeError),
}

#[derive(Debug, Clone)]
pub struct ThemeStore {
    themes_dir: PathBuf,
}

impl ThemeStore {
    pub fn open(cache_directory: &Path) -> Result<Self> {
        let themes_dir = cache_directory.join("themes");
        fs::create_dir_all(&themes_dir)?;
        Ok(Self { themes_dir })
    }

    pub fn themes_dir(&self) -> &Path {
        &self.themes_dir
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.themes_dir.join(key.file_name())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    /// `Ok(None)` on a miss; a present but unreadable record is an error.
    pub fn lookup(&self, key: &CacheKey) -> Result<Option<PaletteRecord>> {
        match PaletteRecord::load(&self.path_for(key)) {
            Ok(record) => Ok(Some(record)),
            Err(ThemeError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn store(&self, key: &CacheKey, record: &PaletteRecord) -> Result<()> {
        record.save(&self.path_for(key))
    }

    /// Synthesize and persist records for every image not cached yet.
    ///
    /// Images are processed in parallel. A failing image is recorded in the
    /// report and the rest of the batch carries on; every record counted as
    /// generated is on disk when this returns.
    pub fn generate(&self, images: &[PathBuf], engine: &Engine, options: &GenerateOptions) -> GenerateReport {
        let total = images.len();
        let bar = if options.progress { ProgressBar::new(total as u64) } else { ProgressBar::hidden() };
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} [{bar:30}] {pos}/{len} {wide_msg}") {
            bar.set_style(style.progress_chars("=> "));
        }
        let done = AtomicUsize::new(0);

        let outcomes: Vec<(PathBuf, Outcome)> = images
            .par_iter()
            .map(|image| {
                let outcome = match self.generate_one(image, engine, options) {
                    Ok(true) => Outcome::Generated,
                    Ok(false) => Outcome::Skipped,
                    Err(e) => Outcome::Failed(e),
                };

                let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                match &outcome {
                    Outcome::Generated => info!("[{}/{}] generated {} theme for {}", n, total, engine.name(), image.display()),
                    Outcome::Skipped => debug!("[{}/{}] {} already cached", n, total, image.display()),
                    Outcome::Failed(e) => warn!("[{}/{}] {}: {}", n, total, image.display(), e),
                }
                bar.set_message(image.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
                bar.inc(1);

                (image.clone(), outcome)
            })
            .collect();
        bar.finish_and_clear();

        let mut report = GenerateReport::default();
        for (image, outcome) in outcomes {
            match outcome {
                Outcome::Generated => report.generated += 1,
                Outcome::Skipped => report.skipped += 1,
                Outcome::Failed(e) => report.failed.push((image, e)),
            }
        }
        report
    }

    /// `Ok(false)` when the record already exists and was left alone.
    fn generate_one(&self, image: &Path, engine: &Engine, options: &GenerateOptions) -> Result<bool> {
        // 1. Key from raw bytes, before any decoding
        let bytes = file_utils::read_file(image)?;
        let key = CacheKey::new(&bytes, &engine.cache_name());
        if !options.override_existing && self.contains(&key) {
            return Ok(false);
        }

        // 2. Decode and downsample
        let sample = SampledImage::from_bytes(image, &bytes)?;
        debug!("{} sampled to {}x{}", image.display(), sample.width, sample.height);

        // 3. Synthesize
        let primary = engine.get_dominant_color(&sample)?;
        let colors = match options.custom_palette {
            Some(palette) => *palette,
            None => engine.get_palette(&engine.generate(&sample)?),
        };

        // 4. Persist
        let wallpaper = fs::canonicalize(image).unwrap_or_else(|_| image.to_path_buf());
        self.store(&key, &PaletteRecord { colors, wallpaper, primary })?;
        Ok(true)
    }

    /// Remove every cached record.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.themes_dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::engine::EngineKind;
    use crate::quantizer::QuantizerKind;
    use crate::quantizer::testing::FixedQuantizer;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    pub(crate) fn write_png(dir: &Path, name: &str, seed: u8) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, seed])).save(&path).unwrap();
        path
    }

    /// Smooth three-channel gradient: plenty of distinct colors for the real quantizers.
    pub(crate) fn write_gradient_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_fn(96, 96, |x, y| Rgb([(x * 255 / 95) as u8, (y * 255 / 95) as u8, ((x + y) * 255 / 190) as u8 / 2]))
            .save(&path)
            .unwrap();
        path
    }

    pub(crate) fn counting_engine() -> (Engine, Arc<AtomicUsize>) {
        let quantizer = FixedQuantizer::rainbow();
        let calls = quantizer.calls.clone();
        (Engine::new(EngineKind::Vibrance, Box::new(quantizer)), calls)
    }

    #[test]
    fn test_key_names_file() {
        let key = CacheKey::new(b"", "hue");
        assert_eq!(key.file_name(), "e3b0c44298fc1c149afb-hue.json");
        assert_ne!(CacheKey::new(b"x", "hue"), CacheKey::new(b"x", "pastel"));
    }

    #[test]
    fn test_lookup_miss() {
        let cache = tempfile::tempdir().unwrap();
        let store = ThemeStore::open(cache.path()).unwrap();
        assert!(store.themes_dir().is_dir());
        assert!(store.lookup(&CacheKey::new(b"nothing", "vibrance")).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let cache = tempfile::tempdir().unwrap();
        let store = ThemeStore::open(cache.path()).unwrap();
        let key = CacheKey::new(b"img", "vibrance");
        fs::write(store.path_for(&key), b"{").unwrap();
        assert!(matches!(store.lookup(&key), Err(ThemeError::Json(_))));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let walls = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let images = vec![write_png(walls.path(), "a.png", 0), write_png(walls.path(), "b.png", 90)];
        let store = ThemeStore::open(cache.path()).unwrap();
        let (engine, calls) = counting_engine();

        let first = store.generate(&images, &engine, &GenerateOptions::default());
        assert_eq!((first.generated, first.skipped), (2, 0));
        let after_first = calls.load(Ordering::SeqCst);
        assert!(after_first > 0);

        let second = store.generate(&images, &engine, &GenerateOptions::default());
        assert_eq!((second.generated, second.skipped), (0, 2));
        assert_eq!(calls.load(Ordering::SeqCst), after_first);
        assert_eq!(fs::read_dir(store.themes_dir()).unwrap().count(), 2);
    }

    #[test]
    fn test_quantizers_get_separate_records() {
        let walls = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let images = vec![write_gradient_png(walls.path(), "gradient.png")];
        let store = ThemeStore::open(cache.path()).unwrap();
        let histogram = Engine::from_kinds(EngineKind::Vibrance, QuantizerKind::Histogram, None);
        let kmeans = Engine::from_kinds(EngineKind::Vibrance, QuantizerKind::Kmeans, Some(1));

        let first = store.generate(&images, &histogram, &GenerateOptions::default());
        assert_eq!(first.generated, 1, "{:?}", first.failed);
        let second = store.generate(&images, &kmeans, &GenerateOptions::default());
        assert_eq!((second.generated, second.skipped), (1, 0), "{:?}", second.failed);

        let hash = file_utils::hash_file(&images[0]).unwrap();
        assert!(store.themes_dir().join(format!("{}-vibrance.json", hash)).is_file());
        assert!(store.themes_dir().join(format!("{}-vibrance-kmeans.json", hash)).is_file());
    }

    #[test]
    fn test_override_regenerates() {
        let walls = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let images = vec![write_png(walls.path(), "a.png", 0)];
        let store = ThemeStore::open(cache.path()).unwrap();
        let (engine, _) = counting_engine();

        store.generate(&images, &engine, &GenerateOptions::default());
        let options = GenerateOptions { override_existing: true, ..Default::default() };
        assert_eq!(store.generate(&images, &engine, &options).generated, 1);
    }

    #[test]
    fn test_identical_bytes_share_a_record() {
        let walls = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let a = write_png(walls.path(), "a.png", 7);
        let copy = walls.path().join("copy.png");
        fs::copy(&a, &copy).unwrap();
        let store = ThemeStore::open(cache.path()).unwrap();
        let (engine, _) = counting_engine();

        store.generate(&[a.clone()], &engine, &GenerateOptions::default());
        let report = store.generate(&[copy.clone()], &engine, &GenerateOptions::default());
        assert_eq!(report.skipped, 1);
        assert_eq!(
            CacheKey::for_image(&a, &engine.cache_name()).unwrap(),
            CacheKey::for_image(&copy, &engine.cache_name()).unwrap()
        );
    }

    #[test]
    fn test_bad_image_does_not_abort_batch() {
        let walls = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let broken = walls.path().join("broken.png");
        fs::write(&broken, b"definitely not a png").unwrap();
        let good = write_png(walls.path(), "good.png", 3);
        let store = ThemeStore::open(cache.path()).unwrap();
        let (engine, _) = counting_engine();

        let mut report = store.generate(&[broken.clone(), good.clone()], &engine, &GenerateOptions::default());
        assert_eq!(report.generated, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(report.take_failure(&good).is_none());
        assert!(matches!(report.take_failure(&broken), Some(ThemeError::InvalidImage { .. })));
        assert!(report.failed.is_empty());

        let key = CacheKey::for_image(&good, &engine.cache_name()).unwrap();
        let record = store.lookup(&key).unwrap().unwrap();
        assert_eq!(record.wallpaper, fs::canonicalize(&good).unwrap());
        assert_eq!(record.colors.dark.len(), 16);
    }

    #[test]
    fn test_custom_palette_replaces_synthesis() {
        let walls = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let image = write_png(walls.path(), "a.png", 0);
        let store = ThemeStore::open(cache.path()).unwrap();
        let (engine, _) = counting_engine();
        let custom = crate::engine::palette::PASTEL.expand(&[crate::color::RgbColor(1, 2, 3)]);

        let options = GenerateOptions { custom_palette: Some(&custom), ..Default::default() };
        store.generate(&[image.clone()], &engine, &options);

        let record = store.lookup(&CacheKey::for_image(&image, &engine.cache_name()).unwrap()).unwrap().unwrap();
        assert_eq!(record.colors, custom);
        assert_eq!(record.primary, crate::color::RgbColor(178, 0, 0));
    }

    #[test]
    fn test_clear_removes_records() {
        let walls = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let store = ThemeStore::open(cache.path()).unwrap();
        let (engine, _) = counting_engine();
        store.generate(&[write_png(walls.path(), "a.png", 0)], &engine, &GenerateOptions::default());

        assert_eq!(store.clear().unwrap(), 1);
        assert_eq!(fs::read_dir(store.themes_dir()).unwrap().count(), 0);
    }
}
