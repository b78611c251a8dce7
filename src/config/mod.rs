/// Application configuration loading from config.toml
pub mod app;

/// Backend URL resolution from the environment
pub mod backend;

pub use app::{AppConfig, BackendConfig, ListConfig, load_config, load_default_config};
