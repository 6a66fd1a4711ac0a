pub mod applier;
pub mod hooks;
pub mod record;
pub mod theme_store;

pub use applier::Applier;
pub use theme_store::{CacheKey, GenerateOptions, ThemeStore};
