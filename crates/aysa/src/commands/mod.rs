//! CLI command implementations

pub mod common;
pub mod config;
pub mod registry;
pub mod release;
pub mod remote;
pub mod version;
