//! Config command

use anyhow::{anyhow, Context, Result};
use aysa_core::config::{generate_default_config, AysaConfig};
use camino::Utf8Path;

use crate::cli::{
    ConfigCommands, ConfigGetArgs, ConfigInitArgs, ConfigSetArgs, ConfigShowArgs, ConfigUnsetArgs,
};
use crate::commands::common::load_config;
use crate::output;

pub fn run(cmd: ConfigCommands, env: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Init(args) => init(args, env),
        ConfigCommands::Show(args) => show(args, env),
        ConfigCommands::Get(args) => get(args, env),
        ConfigCommands::Set(args) => set(args, env),
        ConfigCommands::Unset(args) => unset(args, env),
    }
}

fn init(args: ConfigInitArgs, env: Option<&Utf8Path>) -> Result<()> {
    let path = AysaConfig::resolve_path(env)?;

    if path.exists() && !args.force {
        return Err(anyhow!(
            "File {} already exists. Use --force to overwrite.",
            path
        ));
    }

    let content = generate_default_config().context("Failed to generate config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent))?;
    }
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path))?;

    output::success(&format!("Created {}", path));
    output::info("Edit the registry section, or run `aysa config set registry.host <host>`");
    Ok(())
}

fn show(args: ConfigShowArgs, env: Option<&Utf8Path>) -> Result<()> {
    let mut config = load_config(env)?;
    // never print the password
    config.config.registry.credentials = config.config.registry.masked_credentials();

    if args.json {
        output::json(&config.config)?;
    } else {
        output::info(&format!("Configuration: {}", config.config_path));
        println!("{}", config.to_yaml()?);
    }
    Ok(())
}

fn get(args: ConfigGetArgs, env: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(env)?;
    match config.get(&args.key)? {
        Some(value) => println!("{}", value),
        None => output::warning(&format!("{} is not set", args.key)),
    }
    Ok(())
}

// Edits start from the file as written so environment overrides are not persisted
fn set(args: ConfigSetArgs, env: Option<&Utf8Path>) -> Result<()> {
    let mut config = AysaConfig::load_file(env).context("Failed to load configuration")?;
    config.set(&args.key, &args.value)?;
    config.save()?;

    output::success(&format!("Set {} in {}", args.key, config.config_path));
    Ok(())
}

fn unset(args: ConfigUnsetArgs, env: Option<&Utf8Path>) -> Result<()> {
    let mut config = AysaConfig::load_file(env).context("Failed to load configuration")?;
    config.unset(&args.key)?;
    config.save()?;

    output::success(&format!("Removed {} from {}", args.key, config.config_path));
    Ok(())
}
