//! Configuration file loading, editing and persistence

use crate::error::{Error, Result};
use crate::types::{AysaConfigFile, RegistryConfig, ReleaseConfig, Stage, StageConfig};
use crate::utils::get_home_dir;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::{Mapping, Value};
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration template
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/embedded/"]
#[prefix = ""]
struct EmbeddedTemplates;

/// Environment variable pointing at an alternative configuration file
pub const CONFIG_ENV_VAR: &str = "AYSA_CONFIG";

const CONFIG_DIR_NAME: &str = ".aysa";
const CONFIG_FILE_NAME: &str = "config.yaml";
const TEMPLATE_NAME: &str = "config.yaml";

/// Value shape of an editable key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Text,
    Flag,
    Port,
}

const REGISTRY_KEYS: &[(&str, KeyKind)] = &[
    ("host", KeyKind::Text),
    ("namespace", KeyKind::Text),
    ("insecure", KeyKind::Flag),
    ("verify", KeyKind::Flag),
    ("credentials", KeyKind::Text),
];

const RELEASE_KEYS: &[(&str, KeyKind)] = &[
    ("qa_source", KeyKind::Text),
    ("qa_target", KeyKind::Text),
    ("prod_source", KeyKind::Text),
    ("prod_target", KeyKind::Text),
];

const STAGE_KEYS: &[(&str, KeyKind)] = &[
    ("host", KeyKind::Text),
    ("user", KeyKind::Text),
    ("port", KeyKind::Port),
    ("pkey", KeyKind::Text),
    ("path", KeyKind::Text),
];

/// Loaded AySA configuration
#[derive(Debug, Clone)]
pub struct AysaConfig {
    /// The parsed configuration
    pub config: AysaConfigFile,

    /// Path to the configuration file
    pub config_path: Utf8PathBuf,
}

impl AysaConfig {
    /// Load configuration and apply `AYSA_REGISTRY_*` environment overrides
    ///
    /// Resolution order for the file: explicit path, `AYSA_CONFIG`, then
    /// `~/.aysa/config.yaml`.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration exactly as written on disk
    pub fn load_file(path: Option<&Utf8Path>) -> Result<Self> {
        let config_path = Self::resolve_path(path)?;
        debug!("Loading configuration from {}", config_path);

        let content = fs::read_to_string(&config_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(config_path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let config: AysaConfigFile = if content.trim().is_empty() {
            AysaConfigFile::default()
        } else {
            serde_yaml_ng::from_str(&content)?
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Wrap an in-memory configuration that will be saved to `config_path`
    pub fn new(config: AysaConfigFile, config_path: Utf8PathBuf) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Default location of the configuration file (~/.aysa/config.yaml)
    pub fn default_path() -> Result<Utf8PathBuf> {
        let home = get_home_dir()?;
        let home = Utf8PathBuf::try_from(home)
            .map_err(|_| Error::invalid_config("Home directory path is not valid UTF-8"))?;
        Ok(home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Pick the configuration path from the argument, the environment or the default
    pub fn resolve_path(path: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
        if let Some(p) = path {
            return Ok(crate::utils::expand_home(p));
        }
        match env::var(CONFIG_ENV_VAR) {
            Ok(p) if !p.trim().is_empty() => Ok(crate::utils::expand_home(Utf8Path::new(p.trim()))),
            _ => Self::default_path(),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("AYSA_REGISTRY_HOST") {
            debug!("AYSA_REGISTRY_HOST overrides registry.host");
            self.config.registry.host = val;
        }

        if let Ok(val) = env::var("AYSA_REGISTRY_NAMESPACE") {
            debug!("AYSA_REGISTRY_NAMESPACE overrides registry.namespace");
            self.config.registry.namespace = val;
        }

        if let Ok(val) = env::var("AYSA_REGISTRY_CREDENTIALS") {
            debug!("AYSA_REGISTRY_CREDENTIALS overrides registry.credentials");
            self.config.registry.credentials = Some(val).filter(|v| !v.is_empty());
        }
    }

    /// Get the inner configuration file
    pub fn inner(&self) -> &AysaConfigFile {
        &self.config
    }

    /// Registry section; fails if no host is configured
    pub fn registry(&self) -> Result<&RegistryConfig> {
        if self.config.registry.host.trim().is_empty() {
            return Err(Error::missing_field("registry.host"));
        }
        Ok(&self.config.registry)
    }

    /// Release tag names
    pub fn release(&self) -> &ReleaseConfig {
        &self.config.release
    }

    /// Remote host section of a stage; fails if absent or without a host
    pub fn stage(&self, stage: Stage) -> Result<&StageConfig> {
        let section = match stage {
            Stage::Development => self.config.development.as_ref(),
            Stage::Quality => self.config.quality.as_ref(),
        };
        match section {
            Some(s) if !s.host.trim().is_empty() => Ok(s),
            Some(_) => Err(Error::missing_field(format!("{}.host", stage))),
            None => Err(Error::missing_field(stage.as_str())),
        }
    }

    /// Read a `section.key` value as displayed by `config show`
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let (section, field, _) = lookup_key(key)?;
        let root = serde_yaml_ng::to_value(&self.config)?;
        let value = root
            .get(section)
            .and_then(|s| s.get(field))
            .and_then(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                Value::Bool(b) => Some(b.to_string()),
                Value::Number(n) => Some(n.to_string()),
                other => serde_yaml_ng::to_string(other).ok(),
            });
        Ok(value)
    }

    /// Set a `section.key` value, validating it against the file model
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field, kind) = lookup_key(key)?;
        let new_value = match kind {
            KeyKind::Text => Value::String(value.to_string()),
            KeyKind::Flag => Value::Bool(parse_flag(value).ok_or_else(|| {
                Error::invalid_config(format!("{} expects true or false, got '{}'", key, value))
            })?),
            KeyKind::Port => {
                let port: u16 = value.trim().parse().map_err(|_| {
                    Error::invalid_config(format!("{} expects a port number, got '{}'", key, value))
                })?;
                Value::Number(port.into())
            }
        };

        self.edit(|root| {
            let entry = root
                .entry(Value::String(section.to_string()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            if !entry.is_mapping() {
                *entry = Value::Mapping(Mapping::new());
            }
            if let Value::Mapping(map) = entry {
                map.insert(Value::String(field.to_string()), new_value);
            }
        })
    }

    /// Remove a `section.key` value, restoring its default
    ///
    /// A bare stage name (`development`, `quality`) removes the whole section.
    pub fn unset(&mut self, key: &str) -> Result<()> {
        if let Ok(stage) = key.parse::<Stage>() {
            if key == stage.as_str() {
                self.edit(|root| {
                    root.remove(stage.as_str());
                })?;
                return Ok(());
            }
        }

        let (section, field, _) = lookup_key(key)?;
        self.edit(|root| {
            if let Some(Value::Mapping(map)) = root.get_mut(section) {
                map.remove(field);
            }
        })
    }

    /// Apply an edit to the YAML tree and re-validate it through the file model
    fn edit(&mut self, apply: impl FnOnce(&mut Mapping)) -> Result<()> {
        let mut root = match serde_yaml_ng::to_value(&self.config)? {
            Value::Mapping(map) => map,
            _ => Mapping::new(),
        };
        apply(&mut root);
        self.config = serde_yaml_ng::from_value(Value::Mapping(root))?;
        Ok(())
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(&self.config).map_err(Error::from)
    }

    /// Save configuration to its file, creating the parent directory
    pub fn save(&self) -> Result<()> {
        self.save_to(&self.config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = self.to_yaml()?;
        fs::write(path, content)?;
        debug!("Configuration saved to {}", path);
        Ok(())
    }
}

/// Embedded configuration template written by `config init`
pub fn generate_default_config() -> Result<String> {
    let file = EmbeddedTemplates::get(TEMPLATE_NAME).ok_or_else(|| {
        Error::config_not_found(format!("Embedded template not found: {}", TEMPLATE_NAME))
    })?;
    let content = std::str::from_utf8(&file.data)
        .map_err(|_| Error::invalid_config("Invalid UTF-8 in embedded config template"))?;
    Ok(content.to_string())
}

fn lookup_key(key: &str) -> Result<(&'static str, &'static str, KeyKind)> {
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| Error::unknown_key(key))?;

    let (section, keys): (&'static str, &[(&'static str, KeyKind)]) = match section {
        "registry" => ("registry", REGISTRY_KEYS),
        "release" => ("release", RELEASE_KEYS),
        "development" => ("development", STAGE_KEYS),
        "quality" => ("quality", STAGE_KEYS),
        _ => return Err(Error::unknown_key(key)),
    };

    keys.iter()
        .find(|(name, _)| *name == field)
        .map(|(name, kind)| (section, *name, *kind))
        .ok_or_else(|| Error::unknown_key(key))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> Utf8PathBuf {
        let path = dir.path().join("config.yaml");
        fs::write(&path, content).unwrap();
        Utf8PathBuf::from_path_buf(path).expect("path should be valid UTF-8")
    }

    const SAMPLE: &str = r#"
registry:
  host: registry.example.com:5000
  namespace: team
  credentials: dashboard:secret
development:
  host: dev.example.com
  user: deploy
  path: /opt/stack
"#;

    #[test]
    fn test_default_template_parses() {
        let template = generate_default_config().unwrap();
        let config: AysaConfigFile = serde_yaml_ng::from_str(&template).unwrap();
        assert_eq!(config.release, ReleaseConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_sample() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, SAMPLE);
        let config = AysaConfig::load_file(Some(&path)).unwrap();

        let registry = config.registry().unwrap();
        assert_eq!(registry.host, "registry.example.com:5000");
        assert_eq!(registry.namespace, "team");
        assert!(registry.verify);

        let dev = config.stage(Stage::Development).unwrap();
        assert_eq!(dev.user, "deploy");
        assert_eq!(dev.path.as_deref(), Some("/opt/stack"));

        let err = config.stage(Stage::Quality).unwrap_err();
        assert!(matches!(err, Error::MissingField { .. }));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let path = Utf8Path::new("/tmp/nonexistent-aysa-config-12345.yaml");
        let err = AysaConfig::load_file(Some(path)).unwrap_err();
        assert!(
            matches!(err, Error::ConfigNotFound { .. }),
            "Expected ConfigNotFound, got: {:?}",
            err
        );
        assert!(err.to_string().contains("nonexistent-aysa-config-12345.yaml"));
    }

    #[test]
    fn test_load_invalid_yaml_syntax() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "registry:\n  host: x\n  bad_indent: [[[");
        let err = AysaConfig::load_file(Some(&path)).unwrap_err();
        assert!(
            matches!(err, Error::YamlParse(_)),
            "Expected YamlParse, got: {:?}",
            err
        );
    }

    #[test]
    fn test_missing_registry_host() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "release:\n  qa_target: candidate\n");
        let config = AysaConfig::load_file(Some(&path)).unwrap();
        assert_eq!(config.release().qa_target, "candidate");
        assert_eq!(config.release().qa_source, "dev");

        let err = config.registry().unwrap_err();
        assert!(err.to_string().contains("registry.host"));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, SAMPLE);

        env::set_var("AYSA_REGISTRY_HOST", "localhost:5000");
        env::set_var("AYSA_REGISTRY_NAMESPACE", "other");
        let config = AysaConfig::load(Some(&path));
        env::remove_var("AYSA_REGISTRY_HOST");
        env::remove_var("AYSA_REGISTRY_NAMESPACE");

        let config = config.unwrap();
        assert_eq!(config.config.registry.host, "localhost:5000");
        assert_eq!(config.config.registry.namespace, "other");
        assert_eq!(
            config.config.registry.credentials.as_deref(),
            Some("dashboard:secret")
        );
    }

    #[test]
    #[serial]
    fn test_config_env_var_path() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, SAMPLE);

        env::set_var(CONFIG_ENV_VAR, path.as_str());
        let resolved = AysaConfig::resolve_path(None);
        env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(resolved.unwrap(), path);
    }

    #[test]
    fn test_set_and_save() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, SAMPLE);
        let mut config = AysaConfig::load_file(Some(&path)).unwrap();

        config.set("registry.insecure", "yes").unwrap();
        config.set("quality.host", "qa.example.com").unwrap();
        config.set("quality.port", "2222").unwrap();
        config.set("release.prod_target", "1.0").unwrap();
        config.save().unwrap();

        let reloaded = AysaConfig::load_file(Some(&path)).unwrap();
        assert!(reloaded.config.registry.insecure);
        let qa = reloaded.stage(Stage::Quality).unwrap();
        assert_eq!(qa.host, "qa.example.com");
        assert_eq!(qa.port, Some(2222));
        assert_eq!(reloaded.release().prod_target, "1.0");
        assert_eq!(
            reloaded.get("quality.port").unwrap().as_deref(),
            Some("2222")
        );
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = AysaConfig::new(AysaConfigFile::default(), "unused.yaml".into());

        assert!(matches!(
            config.set("registry.hots", "x").unwrap_err(),
            Error::UnknownKey { .. }
        ));
        assert!(matches!(
            config.set("production.host", "x").unwrap_err(),
            Error::UnknownKey { .. }
        ));
        assert!(matches!(
            config.set("registry", "x").unwrap_err(),
            Error::UnknownKey { .. }
        ));
        assert!(config.set("development.port", "ssh").is_err());
        assert!(config.set("registry.verify", "maybe").is_err());
    }

    #[test]
    fn test_unset_restores_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, SAMPLE);
        let mut config = AysaConfig::load_file(Some(&path)).unwrap();

        config.set("release.qa_source", "nightly").unwrap();
        config.unset("release.qa_source").unwrap();
        assert_eq!(config.release().qa_source, "dev");

        config.unset("registry.credentials").unwrap();
        assert!(config.config.registry.credentials.is_none());

        config.unset("development").unwrap();
        assert!(config.config.development.is_none());
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join(".aysa").join("config.yaml"))
            .expect("path should be valid UTF-8");
        let config = AysaConfig::new(AysaConfigFile::default(), path.clone());
        config.save().unwrap();
        assert!(path.exists());
    }
}
