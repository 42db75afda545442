//! Configuration file types (~/.aysa/config.yaml)

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Root of the configuration file: one keyed section per concern
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AysaConfigFile {
    /// Container registry endpoint
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Tag names used by release promotion
    #[serde(default)]
    pub release: ReleaseConfig,

    /// Development deployment host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development: Option<StageConfig>,

    /// QA/testing deployment host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<StageConfig>,
}

/// Registry section
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry host with optional port (e.g. "registry.example.com:5000")
    #[serde(default)]
    pub host: String,

    /// Default namespace every image lives under
    #[serde(default)]
    pub namespace: String,

    /// Force plain HTTP and skip certificate verification
    #[serde(default)]
    pub insecure: bool,

    /// Verify TLS certificates (ignored when `insecure` is set)
    #[serde(default = "default_true")]
    pub verify: bool,

    /// Basic credentials in the form `user:password`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            namespace: String::new(),
            insecure: false,
            verify: true,
            credentials: None,
        }
    }
}

impl RegistryConfig {
    /// Build a registry section for a host, leaving everything else at defaults
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Credentials with the password replaced, safe for display
    pub fn masked_credentials(&self) -> Option<String> {
        self.credentials.as_ref().map(|c| match c.split_once(':') {
            Some((user, _)) => format!("{}:****", user),
            None => "****".to_string(),
        })
    }
}

// Credentials never end up in debug logs
impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("host", &self.host)
            .field("namespace", &self.namespace)
            .field("insecure", &self.insecure)
            .field("verify", &self.verify)
            .field("credentials", &self.masked_credentials())
            .finish()
    }
}

/// Release section: which tag is promoted to which
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
    /// Tag copied when promoting to QA
    #[serde(default = "default_qa_source")]
    pub qa_source: String,

    /// Release-candidate tag created for QA
    #[serde(default = "default_qa_target")]
    pub qa_target: String,

    /// Tag copied when promoting to production
    #[serde(default = "default_prod_source")]
    pub prod_source: String,

    /// Production tag
    #[serde(default = "default_prod_target")]
    pub prod_target: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            qa_source: default_qa_source(),
            qa_target: default_qa_target(),
            prod_source: default_prod_source(),
            prod_target: default_prod_target(),
        }
    }
}

/// Remote host section for a deployment stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    /// SSH host
    #[serde(default)]
    pub host: String,

    /// SSH user
    #[serde(default)]
    pub user: String,

    /// SSH port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Private key file (`~` is expanded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkey: Option<Utf8PathBuf>,

    /// Directory holding the docker-compose project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_qa_source() -> String {
    "dev".to_string()
}

fn default_qa_target() -> String {
    "rc".to_string()
}

fn default_prod_source() -> String {
    "rc".to_string()
}

fn default_prod_target() -> String {
    "latest".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let registry: RegistryConfig = serde_yaml_ng::from_str("host: registry.local:5000").unwrap();
        assert_eq!(registry.host, "registry.local:5000");
        assert!(registry.verify);
        assert!(!registry.insecure);
        assert!(registry.namespace.is_empty());
    }

    #[test]
    fn test_release_defaults() {
        let release = ReleaseConfig::default();
        assert_eq!(release.qa_source, "dev");
        assert_eq!(release.qa_target, "rc");
        assert_eq!(release.prod_source, "rc");
        assert_eq!(release.prod_target, "latest");
    }

    #[test]
    fn test_masked_credentials() {
        let mut registry = RegistryConfig::for_host("registry.local");
        assert_eq!(registry.masked_credentials(), None);

        registry.credentials = Some("dashboard:secret".to_string());
        assert_eq!(
            registry.masked_credentials().as_deref(),
            Some("dashboard:****")
        );
        assert!(!format!("{:?}", registry).contains("secret"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result = serde_yaml_ng::from_str::<AysaConfigFile>("registry:\n  hots: typo\n");
        assert!(result.is_err());
    }
}
