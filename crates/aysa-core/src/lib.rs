//! # aysa-core
//!
//! Core library for the AySA CLI providing:
//! - Configuration file parsing (~/.aysa/config.yaml)
//! - Type definitions for the registry, release and stage sections
//! - Persistence of `config set` / `config unset` edits

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::AysaConfig;
pub use error::{Error, Result};
pub use utils::get_home_dir;
