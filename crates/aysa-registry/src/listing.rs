//! Fetch-once listings over the catalog and tag endpoints

use crate::entity::{Endpoint, CATALOG, TAGS};
use crate::error::{RegistryError, Result};
use crate::transport::{RegistryTransport, RequestOptions};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

/// A catalog or tag listing
///
/// The first call to [`Listing::entries`] issues the GET; later calls reuse
/// the cached page for the lifetime of the listing.
pub struct Listing<'a> {
    endpoint: Endpoint<'a>,
    response_key: &'static str,
    prefix_filter: Option<String>,
    entries: Option<Vec<String>>,
}

impl<'a> Listing<'a> {
    /// Repository names from `/_catalog`
    pub fn catalog(transport: &'a RegistryTransport) -> Self {
        Self::from_endpoint(Endpoint::new(transport, &CATALOG), "repositories")
    }

    /// Tag names of a repository
    pub fn tags(transport: &'a RegistryTransport, name: &str) -> Result<Self> {
        let endpoint = Endpoint::bound(transport, &TAGS, &[("name", name)])?;
        Ok(Self::from_endpoint(endpoint, "tags"))
    }

    fn from_endpoint(endpoint: Endpoint<'a>, default_key: &'static str) -> Self {
        let response_key = endpoint.kind().response_key.unwrap_or(default_key);
        Self {
            endpoint,
            response_key,
            prefix_filter: None,
            entries: None,
        }
    }

    /// Only yield entries starting with `prefix`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix_filter = Some(prefix).filter(|p| !p.is_empty());
        self
    }

    async fn fetch(&mut self) -> Result<&[String]> {
        if self.entries.is_none() {
            let response = self
                .endpoint
                .request(Method::GET, RequestOptions::default())
                .await?;
            let document: Value = response.json()?;

            let entries = match document.get(self.response_key) {
                None => return Err(RegistryError::missing_key(self.response_key)),
                Some(Value::Null) => Vec::new(),
                Some(value) => serde_json::from_value::<Vec<String>>(value.clone())?,
            };
            debug!(
                "{} listing returned {} entries",
                self.endpoint.kind().name,
                entries.len()
            );
            self.entries = Some(entries);
        }
        Ok(self.entries.as_deref().unwrap_or_default())
    }

    /// Entries, filtered by the prefix
    pub async fn entries(&mut self) -> Result<impl Iterator<Item = &str> + '_> {
        let prefix = self.prefix_filter.clone();
        let entries = self.fetch().await?;
        Ok(entries
            .iter()
            .map(String::as_str)
            .filter(move |e| prefix.as_deref().map_or(true, |p| e.starts_with(p))))
    }

    /// Owned entries, filtered by the prefix
    pub async fn into_entries(mut self) -> Result<Vec<String>> {
        Ok(self.entries().await?.map(str::to_string).collect())
    }
}
