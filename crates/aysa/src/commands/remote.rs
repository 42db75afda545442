//! Remote commands: docker-compose on the development and quality hosts

use anyhow::{Context, Result};
use aysa_core::config::AysaConfig;
use aysa_core::types::Stage;
use aysa_remote::{CleanupPolicy, ComposeDeployer, RemoteSession, SshSession};
use camino::Utf8Path;

use crate::cli::{RemoteCommands, RemoteConfirmArgs, RemoteServiceArgs, RemoteUpArgs, StageArgs};
use crate::commands::common::{confirm, load_config};
use crate::output;

pub async fn run(cmd: RemoteCommands, env: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(env)?;

    match cmd {
        RemoteCommands::Up(args) => up(&config, args).await,
        RemoteCommands::Down(args) => down(&config, args).await,
        RemoteCommands::Start(args) => services(&config, args, Verb::Start).await,
        RemoteCommands::Stop(args) => services(&config, args, Verb::Stop).await,
        RemoteCommands::Restart(args) => services(&config, args, Verb::Restart).await,
        RemoteCommands::Prune(args) => prune(&config, args).await,
        RemoteCommands::Ls(args) => ls(&config, args).await,
        RemoteCommands::Ps(args) => ps(&config, args).await,
    }
}

/// Open a compose deployer on the host of `stage` and print its banner
fn deployer(config: &AysaConfig, stage: Stage) -> Result<ComposeDeployer<SshSession>> {
    let section = config.stage(stage)?;
    let session = SshSession::from_stage(stage, section)
        .with_context(|| format!("Invalid {} stage", stage))?;
    output::stage(stage.as_str(), &session.target());
    Ok(ComposeDeployer::new(session))
}

fn stage_names(stages: &[Stage]) -> String {
    stages
        .iter()
        .map(Stage::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

async fn up(config: &AysaConfig, args: RemoteUpArgs) -> Result<()> {
    let stages = args.target.stage.stages();
    if !confirm(
        &format!("Redeploy services on {}?", stage_names(&stages)),
        args.target.yes,
    )? {
        return Ok(());
    }

    let policy = if args.best_effort_cleanup {
        CleanupPolicy::BestEffort
    } else {
        CleanupPolicy::Strict
    };

    for stage in stages {
        let deployer = deployer(config, stage)?;
        let spinner = output::spinner("Deploying...");
        let result = deployer.deploy(&args.target.services, policy).await;
        spinner.finish_and_clear();

        let report = result.with_context(|| format!("Deploy on {} failed", stage))?;
        for warning in &report.warnings {
            output::warning(warning);
        }
        output::success(&format!(
            "Deployed {} service(s), {} image(s) refreshed",
            report.services.len(),
            report.images.len()
        ));
    }
    Ok(())
}

async fn down(config: &AysaConfig, args: RemoteConfirmArgs) -> Result<()> {
    let stages = args.stage.stages();
    if !confirm(
        &format!("Stop and remove services on {}?", stage_names(&stages)),
        args.yes,
    )? {
        return Ok(());
    }

    for stage in stages {
        deployer(config, stage)?
            .down()
            .await
            .with_context(|| format!("docker-compose down on {} failed", stage))?;
        output::success("Services removed");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Start,
    Stop,
    Restart,
}

impl Verb {
    fn as_str(&self) -> &'static str {
        match self {
            Verb::Start => "start",
            Verb::Stop => "stop",
            Verb::Restart => "restart",
        }
    }
}

async fn services(config: &AysaConfig, args: RemoteServiceArgs, verb: Verb) -> Result<()> {
    let stages = args.stage.stages();
    let selection = if args.services.is_empty() {
        "all services".to_string()
    } else {
        args.services.join(", ")
    };
    if !confirm(
        &format!("{} {} on {}?", verb.as_str(), selection, stage_names(&stages)),
        args.yes,
    )? {
        return Ok(());
    }

    for stage in stages {
        let deployer = deployer(config, stage)?;
        let touched = match verb {
            Verb::Start => deployer.start(&args.services).await,
            Verb::Stop => deployer.stop(&args.services).await,
            Verb::Restart => deployer.restart(&args.services).await,
        }
        .with_context(|| format!("docker-compose {} on {} failed", verb.as_str(), stage))?;

        if touched.is_empty() {
            output::warning("No services in the compose project");
        } else {
            output::success(&format!("{}: {}", verb.as_str(), touched.join(", ")));
        }
    }
    Ok(())
}

async fn prune(config: &AysaConfig, args: RemoteConfirmArgs) -> Result<()> {
    let stages = args.stage.stages();
    if !confirm(
        &format!(
            "Remove services, images and volumes on {}?",
            stage_names(&stages)
        ),
        args.yes,
    )? {
        return Ok(());
    }

    for stage in stages {
        deployer(config, stage)?
            .prune()
            .await
            .with_context(|| format!("Prune on {} failed", stage))?;
        output::success("Services, images and volumes removed");
    }
    Ok(())
}

async fn ls(config: &AysaConfig, args: StageArgs) -> Result<()> {
    for stage in args.stages() {
        let services = deployer(config, stage)?.ls().await?;
        if services.is_empty() {
            output::info("No services");
        }
        for service in &services {
            output::bullet(service);
        }
    }
    Ok(())
}

async fn ps(config: &AysaConfig, args: StageArgs) -> Result<()> {
    for stage in args.stages() {
        let table = deployer(config, stage)?.ps().await?;
        println!("{}", table.trim_end());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(stage_names(&[Stage::Development]), "development");
        assert_eq!(
            stage_names(&[Stage::Development, Stage::Quality]),
            "development, quality"
        );
    }

    #[test]
    fn test_deployer_requires_stage_section() {
        let config = AysaConfig::new(Default::default(), "/tmp/aysa.yaml".into());
        let err = deployer(&config, Stage::Quality).err().unwrap();
        assert!(err.to_string().contains("quality"));
    }
}
