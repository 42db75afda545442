//! What `aysa version` reports: the build, the User-Agent sent to the
//! registry, and the configuration the other commands would use

use aysa_core::config::AysaConfig;
use aysa_core::types::ReleaseConfig;
use camino::Utf8Path;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,

    /// Short commit hash, when built from a git checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,

    pub user_agent: String,

    /// Configuration file selected by `-E`, `AYSA_CONFIG` or the default path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,

    /// Promotion tags from that file, `None` when it cannot be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseFlow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseFlow {
    pub qa: String,
    pub prod: String,
}

impl From<&ReleaseConfig> for ReleaseFlow {
    fn from(release: &ReleaseConfig) -> Self {
        Self {
            qa: format!("{} -> {}", release.qa_source, release.qa_target),
            prod: format!("{} -> {}", release.prod_source, release.prod_target),
        }
    }
}

impl VersionInfo {
    /// Build information only
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("AYSA_GIT_SHA").map(String::from),
            user_agent: aysa_registry::USER_AGENT.to_string(),
            config_path: None,
            release: None,
        }
    }

    /// Add the configuration path and its release tags
    ///
    /// A missing or invalid file is not an error here; the path is still
    /// reported so the user can see where aysa looks.
    pub fn with_config(mut self, env: Option<&Utf8Path>) -> Self {
        self.config_path = AysaConfig::resolve_path(env).ok().map(|p| p.to_string());
        self.release = AysaConfig::load_file(env)
            .ok()
            .map(|config| ReleaseFlow::from(config.release()));
        self
    }

    /// One-line form: `aysa 1.0.0 (abc1234)`
    pub fn display(&self) -> String {
        match &self.commit {
            Some(commit) => format!("aysa {} ({})", self.version, commit),
            None => format!("aysa {}", self.version),
        }
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}
