//! Configuration loading and management

mod loader;

pub use loader::{generate_default_config, AysaConfig, CONFIG_ENV_VAR};
