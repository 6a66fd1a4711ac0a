mod color;
mod config;
mod core;
mod decoder;
mod engine;
mod error;
mod logging;
mod quantizer;
mod utils;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm};
use log::debug;

use crate::config::Config;
use crate::core::applier::resolve_image;
use crate::core::{Applier, CacheKey, GenerateOptions, ThemeStore};
use crate::engine::{EngineKind, ThemePalette};
use crate::error::ThemeError;
use crate::quantizer::QuantizerKind;
use crate::utils::{file_utils, paths};

const WARRANTY: &str = "\
wallhue is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
PARTICULAR PURPOSE. See the GNU General Public License for more details.";

#[derive(Parser)]
#[command(author, version, about = "Generate color themes from wallpapers and apply them to templates", long_about = None)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Configuration file (defaults to the XDG config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

/// Engine selection shared by every command that touches the cache
#[derive(Args, Clone, Default)]
struct EngineArgs {
    #[arg(short, long, value_enum)]
    backend: Option<EngineKind>,
    #[arg(short, long, value_enum)]
    quantizer: Option<QuantizerKind>,
    /// Seed for the K-means quantizer
    #[arg(long)]
    seed: Option<u64>,
    /// Use this palette file instead of synthesizing one
    #[arg(short, long)]
    theme: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-generate themes for an image or a directory of images
    Generate {
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        engine: EngineArgs,
        /// Regenerate themes that are already cached
        #[arg(short, long)]
        r#override: bool,
        #[arg(short, long)]
        progress: bool,
    },
    /// Apply the theme of an image (a directory picks one at random)
    Update {
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        engine: EngineArgs,
        #[arg(short, long)]
        light: bool,
        #[arg(long)]
        no_hooks: bool,
    },
    /// Re-apply the current wallpaper
    Preserve {
        #[arg(short, long, value_enum)]
        backend: Option<EngineKind>,
        #[arg(short, long)]
        light: bool,
        #[arg(long)]
        no_hooks: bool,
    },
    /// Print the cached palette of an image
    Palette {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, value_enum)]
        backend: Option<EngineKind>,
        #[arg(short, long, value_enum)]
        quantizer: Option<QuantizerKind>,
        #[arg(short, long)]
        light: bool,
    },
    /// Delete every cached theme
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the warranty notice
    Warranty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(paths::config_file);
    let mut config = Config::load_or_init(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    debug!("configuration: {:?}", config);

    match cli.command {
        Commands::Generate { input, engine, r#override, progress } => {
            apply_engine_args(&mut config, &engine);
            config.override_existing |= r#override;
            config.progress |= progress;
            generate(&config, &input)?;
        }
        Commands::Update { input, engine, light, no_hooks } => {
            apply_engine_args(&mut config, &engine);
            config.light |= light;
            config.run_hooks &= !no_hooks;
            let image = resolve_image(&input).with_context(|| format!("No usable image at {}", input.display()))?;
            update(&config, &image)?;
        }
        Commands::Preserve { backend, light, no_hooks } => {
            if let Some(kind) = backend {
                config.engine = kind;
            }
            config.light |= light;
            config.run_hooks &= !no_hooks;

            let store = ThemeStore::open(&config.cache_directory)?;
            let applier = Applier::new(&store, config.template_directory.clone(), config.data_directory.clone(), None);
            let image = applier.current_image().context("No wallpaper has been applied yet")?;
            update(&config, &image)?;
        }
        Commands::Palette { input, backend, quantizer, light } => {
            if let Some(kind) = backend {
                config.engine = kind;
            }
            if let Some(kind) = quantizer {
                config.quantizer = kind;
            }
            print_palette(&config, &input, config.light || light)?;
        }
        Commands::Clear { yes } => {
            clear(&config, yes)?;
        }
        Commands::Warranty => {
            println!("{}", WARRANTY);
        }
    }

    Ok(())
}

fn apply_engine_args(config: &mut Config, args: &EngineArgs) {
    if let Some(kind) = args.backend {
        config.engine = kind;
    }
    if let Some(kind) = args.quantizer {
        config.quantizer = kind;
    }
    if args.seed.is_some() {
        config.kmeans_seed = args.seed;
    }
    if let Some(theme) = &args.theme {
        config.custom_theme_path = theme.clone();
        config.use_custom_theme = true;
    }
}

fn load_custom_palette(config: &Config) -> Result<Option<ThemePalette>> {
    config
        .custom_palette()
        .with_context(|| format!("Failed to read custom theme {}", config.custom_theme_path.display()))
}

fn generate(config: &Config, input: &Path) -> Result<()> {
    // 1. Collect images
    let images = file_utils::get_image_list(input).with_context(|| format!("No usable images at {}", input.display()))?;

    // 2. Build engine and store
    let engine = config.build_engine();
    let store = ThemeStore::open(&config.cache_directory)
        .with_context(|| format!("Failed to open cache at {}", config.cache_directory.display()))?;
    let custom = load_custom_palette(config)?;
    let options = GenerateOptions {
        override_existing: config.override_existing,
        progress: config.progress,
        custom_palette: custom.as_ref(),
    };

    // 3. Run the batch
    let report = store.generate(&images, &engine, &options);
    for (image, err) in &report.failed {
        eprintln!("Failed to generate a theme for {}: {}", image.display(), err);
    }
    println!(
        "Generated {} {} theme(s), {} already cached, {} failed",
        report.generated,
        engine.cache_name(),
        report.skipped,
        report.failed.len()
    );

    if report.generated + report.skipped == 0 {
        anyhow::bail!("No theme could be generated from {}", input.display());
    }
    Ok(())
}

fn update(config: &Config, image: &Path) -> Result<()> {
    let engine = config.build_engine();
    let store = ThemeStore::open(&config.cache_directory)
        .with_context(|| format!("Failed to open cache at {}", config.cache_directory.display()))?;
    let custom = load_custom_palette(config)?;
    let options = GenerateOptions {
        override_existing: false,
        progress: config.progress,
        custom_palette: custom.as_ref(),
    };

    let applier = Applier::new(
        &store,
        config.template_directory.clone(),
        config.data_directory.clone(),
        config.hooks(),
    );
    let applied = applier
        .update_theme(image, &engine, &options, config.light)
        .with_context(|| format!("Failed to apply a theme for {}", image.display()))?;

    println!(
        "Applied {} theme for {} ({} file(s) rendered, {} hook(s) run)",
        engine.name(),
        applied.wallpaper.display(),
        applied.rendered.len(),
        applied.hooks_run
    );
    Ok(())
}

fn print_palette(config: &Config, image: &Path, light: bool) -> Result<()> {
    let store = ThemeStore::open(&config.cache_directory)?;
    let cache_name = config.build_engine().cache_name();
    let key = CacheKey::for_image(image, &cache_name).with_context(|| format!("Failed to read {}", image.display()))?;
    let record = store.lookup(&key)?.ok_or_else(|| ThemeError::NoPreGenTheme {
        image: image.to_path_buf(),
        engine: cache_name.clone(),
    })?;

    let output = serde_json::json!({
        "wallpaper": record.wallpaper,
        "primary": record.primary,
        "colors": record.colors.variant(light),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn clear(config: &Config, yes: bool) -> Result<()> {
    let store = ThemeStore::open(&config.cache_directory)?;
    let confirmed = yes
        || Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete every cached theme in {}?", store.themes_dir().display()))
            .default(false)
            .interact()?;

    if !confirmed {
        println!("Nothing deleted.");
        return Ok(());
    }

    let removed = store.clear()?;
    println!("Removed {} cached theme(s).", removed);
    Ok(())
}
