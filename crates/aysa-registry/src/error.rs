//! Error types for aysa-registry

use thiserror::Error;

/// Result type alias using the registry error type
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Failures raised while parsing references or talking to a registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Reference whose repository part is not a valid repository name
    #[error("Malformed image reference: \"{value}\"")]
    MalformedReference { value: String },

    /// Error document returned by the registry (`{"errors": [...]}`)
    #[error("{code}: {message}")]
    Registry { code: String, message: String },

    /// HTTP method not allowed for the entity
    #[error("Method \"{method}\" not supported for \"{url}\"")]
    UnsupportedMethod { method: String, url: String },

    /// Operation not available on the entity
    #[error("Operation \"{operation}\" not supported for entity \"{entity}\"")]
    UnsupportedOperation { operation: String, entity: String },

    /// Listing response without the expected key
    #[error("Key \"{key}\" not found in the registry response")]
    MissingResponseKey { key: String },

    /// Operation that needs a tagged reference received an untagged one
    #[error("Image reference \"{reference}\" has no tag")]
    MissingTag { reference: String },

    /// Credentials that are not in `user:password` form
    #[error("Invalid registry credentials: expected \"user:password\"")]
    InvalidCredentials,

    /// Non-2xx response without a registry error document
    #[error("Registry returned {status} for {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    /// Connection, TLS or timeout failure
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Response body that is not valid JSON
    #[error("Failed to parse registry response: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Invalid URL built from the registry host
    #[error("Invalid registry URL: {0}")]
    Url(#[from] url::ParseError),
}

impl RegistryError {
    /// Create a malformed reference error
    pub fn malformed(value: impl Into<String>) -> Self {
        Self::MalformedReference {
            value: value.into(),
        }
    }

    /// Create a registry error from an error document entry
    pub fn registry(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registry {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported method error
    pub fn unsupported_method(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
            url: url.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported_operation(operation: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
            entity: entity.into(),
        }
    }

    /// Create a missing response key error
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingResponseKey { key: key.into() }
    }

    /// Create a missing tag error
    pub fn missing_tag(reference: impl Into<String>) -> Self {
        Self::MissingTag {
            reference: reference.into(),
        }
    }

    /// Registry error code, when the registry returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Registry { code, .. } => Some(code),
            _ => None,
        }
    }

    /// True for `MANIFEST_UNKNOWN`, `NAME_UNKNOWN` or a plain 404
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Registry { code, .. } => code == "MANIFEST_UNKNOWN" || code == "NAME_UNKNOWN",
            Self::Http { status, .. } => *status == 404,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::registry("MANIFEST_UNKNOWN", "manifest unknown");
        assert_eq!(err.to_string(), "MANIFEST_UNKNOWN: manifest unknown");
        assert_eq!(err.code(), Some("MANIFEST_UNKNOWN"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_http_error_not_found() {
        let err = RegistryError::Http {
            status: 404,
            url: "http://localhost:5000/v2/_catalog".to_string(),
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.code(), None);
        assert!(!RegistryError::InvalidCredentials.is_not_found());
    }
}
