//! HTTP transport to a Docker Registry v2 endpoint

use crate::error::{RegistryError, Result};
use crate::reference::scheme_for;
use aysa_core::types::RegistryConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the manifest digest
pub const DIGEST_HEADER: &str = "Docker-Content-Digest";

/// Manifest media types understood by the registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaType {
    /// Schema 1 manifest
    V1,
    /// Schema 2 manifest
    #[default]
    V2,
    /// Manifest list ("fat" manifest)
    V2List,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::V1 => "application/vnd.docker.distribution.manifest.v1+json",
            MediaType::V2 => "application/vnd.docker.distribution.manifest.v2+json",
            MediaType::V2List => "application/vnd.docker.distribution.manifest.list.v2+json",
        }
    }

    /// Look up a media type by its short key (`v1`, `v2`, `v2f`), defaulting to v2
    pub fn from_key(key: &str) -> Self {
        match key {
            "v1" => MediaType::V1,
            "v2f" => MediaType::V2List,
            _ => MediaType::V2,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional parts of a registry request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the default v2 `Accept`
    pub accept: Option<MediaType>,
    /// `Content-Type` of the body
    pub content_type: Option<String>,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn accept(media_type: MediaType) -> Self {
        Self {
            accept: Some(media_type),
            ..Self::default()
        }
    }

    /// Body sent verbatim with the given content type
    pub fn body(content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            body: Some(body),
            ..Self::default()
        }
    }
}

/// Successful (2xx) registry response, fully read
#[derive(Debug, Clone)]
pub struct RegistryResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RegistryResponse {
    /// Header value as text
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `Docker-Content-Digest` header
    pub fn digest(&self) -> Option<&str> {
        self.header(DIGEST_HEADER)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Authenticated HTTP session bound to one registry host
pub struct RegistryTransport {
    client: reqwest::Client,
    host: String,
    scheme: &'static str,
    credentials: Option<(String, String)>,
}

impl RegistryTransport {
    /// Build a transport from the registry configuration section
    ///
    /// `insecure` forces plain HTTP and skips certificate checks; otherwise
    /// `verify` decides whether certificates are checked.
    pub fn new(settings: &RegistryConfig) -> Result<Self> {
        let credentials = match settings.credentials.as_deref() {
            Some(value) => {
                let (user, password) = value
                    .split_once(':')
                    .ok_or(RegistryError::InvalidCredentials)?;
                if user.is_empty() {
                    return Err(RegistryError::InvalidCredentials);
                }
                Some((user.to_string(), password.to_string()))
            }
            None => None,
        };

        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(settings.insecure || !settings.verify)
            .build()?;

        let host = settings.host.trim().trim_end_matches('/').to_string();
        let scheme = scheme_for(&host, settings.insecure);
        debug!("Registry transport for {}://{}", scheme, host);

        Ok(Self {
            client,
            host,
            scheme,
            credentials,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> &str {
        self.scheme
    }

    /// `{scheme}://{host}/v2`
    pub fn base_url(&self) -> String {
        format!("{}://{}/v2", self.scheme, self.host)
    }

    /// Send a request to `base_url() + path`
    ///
    /// A non-2xx response becomes `RegistryError::Registry` when the body is a
    /// registry error document (first entry wins) and `RegistryError::Http`
    /// otherwise.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<RegistryResponse> {
        let url = url::Url::parse(&format!("{}{}", self.base_url(), path))?;
        debug!("{} {}", method, url);

        let accept = options.accept.unwrap_or_default();
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept.as_str()));

        let mut request = self.client.request(method, url.clone()).headers(headers);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }
        if let Some(content_type) = options.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        trace!("{} {} ({} bytes)", status, url, body.len());

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), url.as_str(), &body));
        }

        Ok(RegistryResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

fn error_from_body(status: u16, url: &str, body: &[u8]) -> RegistryError {
    if let Ok(document) = serde_json::from_slice::<ErrorDocument>(body) {
        if let Some(first) = document.errors.into_iter().next() {
            return RegistryError::registry(first.code, first.message);
        }
    }

    let body = String::from_utf8_lossy(body).trim().to_string();
    RegistryError::Http {
        status,
        url: url.to_string(),
        body: if body.is_empty() {
            "(no response body)".to_string()
        } else {
            body
        },
    }
}
