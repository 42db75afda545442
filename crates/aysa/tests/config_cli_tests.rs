//! Integration tests for the config workflow behind `aysa config`
//!
//! Exercises init (embedded template), set, unset and reload against a
//! temporary configuration file, the same sequence the CLI commands run.

use aysa_core::config::{generate_default_config, AysaConfig};
use aysa_core::types::Stage;
use camino::Utf8PathBuf;
use tempfile::TempDir;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn init_config(dir: &TempDir) -> Utf8PathBuf {
    let path = Utf8PathBuf::from_path_buf(dir.path().join(".aysa").join("config.yaml"))
        .expect("temp path should be UTF-8");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, generate_default_config().unwrap()).unwrap();
    path
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[test]
fn test_template_loads_with_release_defaults() {
    let dir = TempDir::new().unwrap();
    let path = init_config(&dir);

    let config = AysaConfig::load_file(Some(&path)).unwrap();
    assert_eq!(config.release().qa_source, "dev");
    assert_eq!(config.release().qa_target, "rc");
    assert_eq!(config.release().prod_source, "rc");
    assert_eq!(config.release().prod_target, "latest");
}

#[test]
fn test_set_then_reload_registry_and_stage() {
    let dir = TempDir::new().unwrap();
    let path = init_config(&dir);

    let mut config = AysaConfig::load_file(Some(&path)).unwrap();
    config.set("registry.host", "registry.example.com:5000").unwrap();
    config.set("registry.namespace", "team").unwrap();
    config.set("development.host", "dev.example.com").unwrap();
    config.set("development.user", "deploy").unwrap();
    config.set("development.port", "2222").unwrap();
    config.save().unwrap();

    let reloaded = AysaConfig::load_file(Some(&path)).unwrap();
    let registry = reloaded.registry().unwrap();
    assert_eq!(registry.host, "registry.example.com:5000");
    assert_eq!(registry.namespace, "team");

    let stage = reloaded.stage(Stage::Development).unwrap();
    assert_eq!(stage.user, "deploy");
    assert_eq!(stage.port, Some(2222));
}

#[test]
fn test_unset_stage_section() {
    let dir = TempDir::new().unwrap();
    let path = init_config(&dir);

    let mut config = AysaConfig::load_file(Some(&path)).unwrap();
    config.set("quality.host", "qa.example.com").unwrap();
    config.set("quality.user", "deploy").unwrap();
    config.save().unwrap();

    let mut config = AysaConfig::load_file(Some(&path)).unwrap();
    assert!(config.stage(Stage::Quality).is_ok());
    config.unset("quality").unwrap();
    config.save().unwrap();

    let reloaded = AysaConfig::load_file(Some(&path)).unwrap();
    assert!(reloaded.stage(Stage::Quality).is_err());
}

#[test]
fn test_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let path = init_config(&dir);

    let mut config = AysaConfig::load_file(Some(&path)).unwrap();
    assert!(config.set("registry.hostname", "x").is_err());
    assert!(config.set("development.port", "not-a-port").is_err());
}
