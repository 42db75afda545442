//! Docker Registry v2 client for the AySA CLI
//!
//! This crate provides:
//! - Image reference parsing (`[registry/][namespace/]image[:tag]`)
//! - An HTTP transport with basic auth and registry error decoding
//! - Catalog and tag listings, slim and fat manifests
//! - Operations: list, inspect, retag (copy a tag without moving layers),
//!   delete and release promotion
//!
//! # Example
//!
//! ```no_run
//! use aysa_core::types::{RegistryConfig, ReleaseConfig};
//! use aysa_registry::RegistryOperations;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), aysa_registry::RegistryError> {
//!     let mut settings = RegistryConfig::for_host("registry.example.com:5000");
//!     settings.namespace = "team".to_string();
//!
//!     let ops = RegistryOperations::new(&settings, ReleaseConfig::default())?;
//!     let rc = ops.copy_tag("team/app", "dev", "rc").await?;
//!     println!("Created {}", rc);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod entity;
pub mod error;
pub mod listing;
pub mod manifest;
pub mod operations;
pub mod reference;
pub mod transport;

pub use client::RegistryClient;
pub use error::{RegistryError, Result};
pub use manifest::{Manifest, SlimManifest};
pub use operations::{
    normalize_image, normalize_image_list, normalize_tag_filter, DeletePolicy, DeleteReport,
    ImageDetails, RegistryOperations, ReleaseStage, TagFilter, WILDCARD,
};
pub use reference::{scheme_for, validate_token, ImageReference};
pub use transport::{MediaType, RegistryTransport};

/// Version of the aysa-registry crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent sent with every registry request
pub const USER_AGENT: &str = concat!("aysa-cli/", env!("CARGO_PKG_VERSION"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(USER_AGENT.ends_with(VERSION));
    }
}
