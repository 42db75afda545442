//! Image reference parsing
//!
//! A reference has the shape `[registry/][namespace/]image[:tag]`. The leading
//! segment is treated as a registry when it is `localhost`, a dotted domain, or
//! any host with a `:port` suffix (`registry:5000/app`). Any other leading
//! segment is a namespace, even when it is really a short hostname
//! (`registry/app` has namespace `registry`).

use crate::error::{RegistryError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const TAG_SEP: char = ':';
const REPO_SEP: char = '/';

/// Characters rejected by [`validate_token`] unless another set is given
pub const DEFAULT_EXCLUDED: &str = "|#@";

static REGISTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:localhost|[\w\-]+(?:\.[\w\-]+)+)(?::\d{1,5})?|[\w\-]+:\d{1,5})/")
        .expect("registry regex is valid")
});

static REPOSITORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[/:._-][a-z0-9]+)*$").expect("repository regex is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w][\w.-]{0,127}$").expect("tag regex is valid"));

static PLAIN_HTTP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(localhost|.*\.local(?:host)?)(?::\d{1,5})?$")
        .expect("plain http regex is valid")
});

/// Parsed `{registry}/{namespace}/{image}:{tag}` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    registry: Option<String>,
    namespace: Option<String>,
    repository: String,
    image: String,
    tag: Option<String>,
}

impl ImageReference {
    /// Parse a raw reference such as `registry.example.com:5000/team/app:1.2`
    pub fn parse(raw: &str) -> Result<Self> {
        let value = raw.trim();

        let registry = REGISTRY_RE.find(value).map(|m| m.as_str().to_string());
        let remainder = match &registry {
            Some(r) => &value[r.len()..],
            None => value,
        };

        let (repository, tag) = match remainder.rsplit_once(TAG_SEP) {
            Some((repo, tag)) => (repo, Some(tag)),
            None => (remainder, None),
        };

        if !REPOSITORY_RE.is_match(repository) || tag.is_some_and(|t| !TAG_RE.is_match(t)) {
            return Err(RegistryError::malformed(raw));
        }

        let (namespace, image) = match repository.rsplit_once(REPO_SEP) {
            Some((ns, image)) => (Some(ns.to_string()), image.to_string()),
            None => (None, repository.to_string()),
        };

        Ok(Self {
            registry,
            namespace,
            repository: repository.to_string(),
            image,
            tag: tag.map(str::to_string),
        })
    }

    /// Reference for a catalog repository and one of its tags
    pub fn with_tag(repository: &str, tag: &str) -> Result<Self> {
        Self::parse(&format!("{}{}{}", repository, TAG_SEP, tag))
    }

    /// Registry host including the trailing `/`, if one was given
    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Path before the image name
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Namespace and image, without registry or tag
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Final path segment
    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Tag, or `MissingTag` for a bare repository
    pub fn require_tag(&self) -> Result<&str> {
        self.tag()
            .ok_or_else(|| RegistryError::missing_tag(self.full()))
    }

    /// `repository:tag` (just the repository when untagged)
    pub fn image_tag(&self) -> String {
        match &self.tag {
            Some(tag) => format!("{}{}{}", self.repository, TAG_SEP, tag),
            None => self.repository.clone(),
        }
    }

    /// `registry` + `image_tag()`
    pub fn full(&self) -> String {
        format!("{}{}", self.registry.as_deref().unwrap_or(""), self.image_tag())
    }
}

impl FromStr for ImageReference {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}

// Listings are sorted by image name first
impl Ord for ImageReference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.image
            .cmp(&other.image)
            .then_with(|| self.repository.cmp(&other.repository))
            .then_with(|| self.tag.cmp(&other.tag))
            .then_with(|| self.registry.cmp(&other.registry))
            .then_with(|| self.namespace.cmp(&other.namespace))
    }
}

impl PartialOrd for ImageReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// URL scheme for a registry host
///
/// `http` when `insecure` is set or the host is `localhost`, `*.local` or
/// `*.localhost` (with or without a port); `https` otherwise.
pub fn scheme_for(host: &str, insecure: bool) -> &'static str {
    if insecure || PLAIN_HTTP_RE.is_match(host) {
        "http"
    } else {
        "https"
    }
}

/// True when `value` is non-empty and contains none of the `exclude` characters
pub fn validate_token(value: &str, exclude: Option<&str>) -> bool {
    let exclude = exclude.unwrap_or(DEFAULT_EXCLUDED);
    !value.is_empty() && !value.chars().any(|c| exclude.contains(c))
}
