//! Typed access to the registry entities

use crate::entity::{Endpoint, FAT_MANIFEST, MANIFEST};
use crate::error::Result;
use crate::listing::Listing;
use crate::manifest::{Manifest, SlimManifest};
use crate::transport::{MediaType, RegistryResponse, RegistryTransport, RequestOptions};
use aysa_core::types::RegistryConfig;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

/// Client for a Docker Registry v2 endpoint
///
/// Every call goes to the registry; nothing is cached between calls.
pub struct RegistryClient {
    transport: RegistryTransport,
}

impl RegistryClient {
    /// Create a client from the registry configuration section
    pub fn new(settings: &RegistryConfig) -> Result<Self> {
        Ok(Self {
            transport: RegistryTransport::new(settings)?,
        })
    }

    pub fn from_transport(transport: RegistryTransport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &RegistryTransport {
        &self.transport
    }

    /// Repository listing (`/_catalog`)
    pub fn catalog(&self) -> Listing<'_> {
        Listing::catalog(&self.transport)
    }

    /// Tag listing of a repository
    pub fn tags(&self, name: &str) -> Result<Listing<'_>> {
        Listing::tags(&self.transport, name)
    }

    fn manifest_endpoint(&self, name: &str, reference: &str) -> Result<Endpoint<'_>> {
        Endpoint::bound(
            &self.transport,
            &MANIFEST,
            &[("name", name), ("reference", reference)],
        )
    }

    async fn get_slim(&self, name: &str, reference: &str) -> Result<RegistryResponse> {
        self.manifest_endpoint(name, reference)?
            .request(Method::GET, RequestOptions::default())
            .await
    }

    /// Raw v2 manifest, in the exact form that is PUT back on retag
    pub async fn slim_manifest(&self, name: &str, reference: &str) -> Result<SlimManifest> {
        let response = self.get_slim(name, reference).await?;
        let content_type = response
            .content_type()
            .unwrap_or(MediaType::V2.as_str())
            .to_string();
        let digest = response.digest().map(str::to_string);

        Ok(SlimManifest {
            body: response.body,
            content_type,
            digest,
        })
    }

    /// Parsed v2 manifest
    pub async fn manifest(&self, name: &str, reference: &str) -> Result<Manifest> {
        let response = self.get_slim(name, reference).await?;
        let raw: Value = response.json()?;
        Ok(Manifest::new(raw, response.digest().map(str::to_string)))
    }

    /// Manifest fetched with the manifest-list media type (carries `history`)
    pub async fn fat_manifest(&self, name: &str, reference: &str) -> Result<Manifest> {
        let response = Endpoint::bound(
            &self.transport,
            &FAT_MANIFEST,
            &[("name", name), ("reference", reference)],
        )?
        .request(Method::GET, RequestOptions::default())
        .await?;
        let raw: Value = response.json()?;
        Ok(Manifest::new(raw, response.digest().map(str::to_string)))
    }

    /// `Docker-Content-Digest` of the slim manifest
    pub async fn digest(&self, name: &str, reference: &str) -> Result<Option<String>> {
        let response = self.get_slim(name, reference).await?;
        Ok(response.digest().map(str::to_string))
    }

    /// Store `manifest` under `reference`, returning the digest the registry reports
    pub async fn put_manifest(
        &self,
        name: &str,
        reference: &str,
        manifest: &SlimManifest,
    ) -> Result<Option<String>> {
        debug!(
            "PUT manifest {}:{} ({} bytes, {})",
            name,
            reference,
            manifest.body.len(),
            manifest.content_type
        );
        let response = self
            .manifest_endpoint(name, reference)?
            .request(
                Method::PUT,
                RequestOptions::body(manifest.content_type.clone(), manifest.body.clone()),
            )
            .await?;
        Ok(response.digest().map(str::to_string))
    }

    /// Delete the manifest at `reference` (tag or digest)
    pub async fn delete_manifest(&self, name: &str, reference: &str) -> Result<()> {
        debug!("DELETE manifest {}:{}", name, reference);
        self.manifest_endpoint(name, reference)?
            .request(Method::DELETE, RequestOptions::default())
            .await?;
        Ok(())
    }
}
