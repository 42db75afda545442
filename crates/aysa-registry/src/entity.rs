//! Registry API entities
//!
//! Each entity declares its URL (or URL template), the HTTP methods it
//! accepts and an optional forced `Accept` media type. An [`Endpoint`] binds
//! an entity to a transport and concrete URL parameters.

use crate::error::{RegistryError, Result};
use crate::transport::{MediaType, RegistryResponse, RegistryTransport, RequestOptions};
use reqwest::Method;

/// Static description of a registry API resource
#[derive(Debug)]
pub struct EntityKind {
    pub name: &'static str,
    /// Fixed path, for entities without parameters
    pub url: Option<&'static str>,
    /// Path with `{param}` placeholders
    pub url_template: Option<&'static str>,
    pub methods: &'static [&'static str],
    /// Media type sent as `Accept` regardless of the caller's choice
    pub accept: Option<MediaType>,
    /// JSON key holding the entries of a listing
    pub response_key: Option<&'static str>,
}

impl EntityKind {
    pub fn supports(&self, method: &Method) -> bool {
        self.methods.iter().any(|m| *m == method.as_str())
    }
}

/// `GET /_catalog`
pub const CATALOG: EntityKind = EntityKind {
    name: "Catalog",
    url: Some("/_catalog"),
    url_template: None,
    methods: &["GET"],
    accept: None,
    response_key: Some("repositories"),
};

/// `GET /{name}/tags/list`
pub const TAGS: EntityKind = EntityKind {
    name: "Tags",
    url: None,
    url_template: Some("/{name}/tags/list"),
    methods: &["GET"],
    accept: None,
    response_key: Some("tags"),
};

/// `GET|PUT|DELETE /{name}/manifests/{reference}` (slim, v2 media type)
pub const MANIFEST: EntityKind = EntityKind {
    name: "Manifest",
    url: None,
    url_template: Some("/{name}/manifests/{reference}"),
    methods: &["GET", "PUT", "DELETE"],
    accept: None,
    response_key: None,
};

/// `GET /{name}/manifests/{reference}` with the manifest-list media type
pub const FAT_MANIFEST: EntityKind = EntityKind {
    name: "FatManifest",
    url: None,
    url_template: Some("/{name}/manifests/{reference}"),
    methods: &["GET"],
    accept: Some(MediaType::V2List),
    response_key: None,
};

/// An entity bound to a transport and, once bound, to a concrete path
pub struct Endpoint<'a> {
    transport: &'a RegistryTransport,
    kind: &'static EntityKind,
    url: Option<String>,
}

impl<'a> Endpoint<'a> {
    /// Endpoint using the entity's fixed URL (if it has one)
    pub fn new(transport: &'a RegistryTransport, kind: &'static EntityKind) -> Self {
        Self {
            transport,
            kind,
            url: kind.url.map(str::to_string),
        }
    }

    /// Endpoint with its URL template filled from `params`
    pub fn bound(
        transport: &'a RegistryTransport,
        kind: &'static EntityKind,
        params: &[(&str, &str)],
    ) -> Result<Self> {
        let mut endpoint = Self::new(transport, kind);
        endpoint.bind(params)?;
        Ok(endpoint)
    }

    /// Fill the URL template; entities without one reject this
    pub fn bind(&mut self, params: &[(&str, &str)]) -> Result<()> {
        let template = self
            .kind
            .url_template
            .ok_or_else(|| RegistryError::unsupported_operation("bind", self.kind.name))?;

        let url = params.iter().fold(template.to_string(), |url, (key, value)| {
            url.replace(&format!("{{{}}}", key), value)
        });
        self.url = Some(url);
        Ok(())
    }

    pub fn kind(&self) -> &'static EntityKind {
        self.kind
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn transport(&self) -> &'a RegistryTransport {
        self.transport
    }

    /// Issue `method` against the endpoint
    pub async fn request(
        &self,
        method: Method,
        mut options: RequestOptions,
    ) -> Result<RegistryResponse> {
        let url = self
            .url
            .as_deref()
            .ok_or_else(|| RegistryError::unsupported_operation("request", self.kind.name))?;

        if !self.kind.supports(&method) {
            return Err(RegistryError::unsupported_method(method.as_str(), url));
        }

        if self.kind.accept.is_some() {
            options.accept = self.kind.accept;
        }

        self.transport.request(method, url, options).await
    }
}
