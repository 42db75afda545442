//! CLI argument parsing with clap

use aysa_core::types::Stage;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// AySA - registry tagging and remote docker-compose deployments
#[derive(Parser, Debug)]
#[command(name = "aysa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file [default: $AYSA_CONFIG or ~/.aysa/config.yaml]
    #[arg(short = 'E', long)]
    pub env: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Manage image tags in the registry
    #[command(subcommand)]
    Registry(RegistryCommands),

    /// Promote images between release stages
    #[command(subcommand)]
    Release(ReleaseCommands),

    /// Deploy and manage services on the stage hosts
    #[command(subcommand)]
    Remote(RemoteCommands),
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Config commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a commented configuration template
    Init(ConfigInitArgs),

    /// Show the resolved configuration
    Show(ConfigShowArgs),

    /// Print one value (e.g. registry.host)
    Get(ConfigGetArgs),

    /// Set one value and save the file
    Set(ConfigSetArgs),

    /// Remove one value, or a whole stage section, and save the file
    Unset(ConfigUnsetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    /// Dotted key, e.g. registry.namespace
    pub key: String,
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Dotted key, e.g. development.host
    pub key: String,

    /// New value
    pub value: String,
}

#[derive(Args, Debug)]
pub struct ConfigUnsetArgs {
    /// Dotted key, or a stage name to drop the whole section
    pub key: String,
}

// Registry commands
#[derive(Subcommand, Debug)]
pub enum RegistryCommands {
    /// List the tags available in the registry
    Ls(RegistryLsArgs),

    /// Create a tag from an existing one
    Add(RegistryAddArgs),

    /// Delete existing tags
    Delete(RegistryDeleteArgs),
}

#[derive(Args, Debug)]
pub struct RegistryLsArgs {
    /// Repositories to list (namespace is added when missing)
    #[arg(value_name = "IMAGE")]
    pub images: Vec<String>,

    /// Comma separated tags, e.g. "dev,rc,latest"
    #[arg(short = 't', long = "filter-tags", default_value = "*")]
    pub tags: String,

    /// List repositories without their tags
    #[arg(long, conflicts_with_all = ["verbose", "manifest"])]
    pub repos_only: bool,

    /// Show creation date and digest of every tag
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the manifest history of every tag (overrides --verbose)
    #[arg(short, long)]
    pub manifest: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RegistryAddArgs {
    /// Existing image and tag, e.g. app:dev
    #[arg(value_name = "SOURCE_IMAGE_TAG")]
    pub source: String,

    /// Tag to create
    #[arg(value_name = "TARGET_TAG")]
    pub target_tag: String,
}

#[derive(Args, Debug)]
pub struct RegistryDeleteArgs {
    /// Images and tags to delete, e.g. app:dev
    #[arg(value_name = "IMAGE_TAG", required = true)]
    pub images: Vec<String>,

    /// Answer yes to every question
    #[arg(short, long)]
    pub yes: bool,

    /// Keep deleting after a failure and report every failed tag
    #[arg(long)]
    pub continue_on_error: bool,
}

// Release commands
#[derive(Subcommand, Debug)]
pub enum ReleaseCommands {
    /// Tag development images as release candidates
    Qa(ReleaseArgs),

    /// Tag release candidates as the production release
    Prod(ReleaseArgs),
}

#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Repositories to promote (all with the source tag when empty)
    #[arg(value_name = "IMAGE")]
    pub images: Vec<String>,

    /// Answer yes to every question
    #[arg(short, long)]
    pub yes: bool,
}

// Remote commands
#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// Redeploy services: remove containers and images, then bring them up
    Up(RemoteUpArgs),

    /// Stop and remove services, networks and volumes
    Down(RemoteConfirmArgs),

    /// Start services
    Start(RemoteServiceArgs),

    /// Stop services
    Stop(RemoteServiceArgs),

    /// Restart services
    Restart(RemoteServiceArgs),

    /// Remove services together with their images and volumes
    Prune(RemoteConfirmArgs),

    /// List the services of each stage
    Ls(StageArgs),

    /// Show container status of each stage
    Ps(StageArgs),
}

/// Stage selection shared by remote commands
#[derive(Args, Debug, Clone, Default)]
pub struct StageArgs {
    /// Development stage
    #[arg(short, long)]
    pub development: bool,

    /// QA/testing stage
    #[arg(short, long)]
    pub quality: bool,
}

impl StageArgs {
    /// Selected stages; development when none is given
    pub fn stages(&self) -> Vec<Stage> {
        let selected: Vec<Stage> = Stage::ALL
            .into_iter()
            .filter(|stage| match stage {
                Stage::Development => self.development,
                Stage::Quality => self.quality,
            })
            .collect();

        if selected.is_empty() {
            vec![Stage::Development]
        } else {
            selected
        }
    }
}

#[derive(Args, Debug)]
pub struct RemoteConfirmArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Answer yes to every question
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct RemoteServiceArgs {
    /// Services to act on (all when empty)
    #[arg(value_name = "SERVICE")]
    pub services: Vec<String>,

    #[command(flatten)]
    pub stage: StageArgs,

    /// Answer yes to every question
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct RemoteUpArgs {
    #[command(flatten)]
    pub target: RemoteServiceArgs,

    /// Warn instead of failing when old containers or images cannot be removed
    #[arg(long)]
    pub best_effort_cleanup: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_top_level_flags() {
        let cli = parse(&["aysa", "-vv", "-E", "/tmp/aysa.yaml", "version", "--json"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert_eq!(cli.env.as_deref().map(|p| p.as_str()), Some("/tmp/aysa.yaml"));
        assert!(matches!(cli.command, Commands::Version(VersionArgs { json: true })));
    }

    #[test]
    fn test_registry_ls_defaults() {
        let cli = parse(&["aysa", "registry", "ls"]);
        match cli.command {
            Commands::Registry(RegistryCommands::Ls(args)) => {
                assert!(args.images.is_empty());
                assert_eq!(args.tags, "*");
                assert!(!args.verbose && !args.manifest && !args.repos_only);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_registry_ls_subcommand_verbose_is_not_global() {
        let cli = parse(&["aysa", "registry", "ls", "-v", "-t", "dev,rc", "app"]);
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Registry(RegistryCommands::Ls(args)) => {
                assert!(args.verbose);
                assert_eq!(args.tags, "dev,rc");
                assert_eq!(args.images, vec!["app"]);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_registry_ls_repos_only_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["aysa", "registry", "ls", "--repos-only", "-v"]).is_err());
    }

    #[test]
    fn test_registry_delete_requires_image() {
        assert!(Cli::try_parse_from(["aysa", "registry", "delete", "-y"]).is_err());

        let cli = parse(&["aysa", "registry", "delete", "-y", "app:dev", "web:rc"]);
        match cli.command {
            Commands::Registry(RegistryCommands::Delete(args)) => {
                assert!(args.yes);
                assert!(!args.continue_on_error);
                assert_eq!(args.images, vec!["app:dev", "web:rc"]);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_remote_quality_flag_is_not_quiet() {
        let cli = parse(&["aysa", "-q", "remote", "up", "-q", "-y", "web", "--best-effort-cleanup"]);
        assert!(cli.quiet);
        match cli.command {
            Commands::Remote(RemoteCommands::Up(args)) => {
                assert_eq!(args.target.stage.stages(), vec![Stage::Quality]);
                assert_eq!(args.target.services, vec!["web"]);
                assert!(args.target.yes);
                assert!(args.best_effort_cleanup);
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_stage_selection() {
        assert_eq!(StageArgs::default().stages(), vec![Stage::Development]);
        let both = StageArgs {
            development: true,
            quality: true,
        };
        assert_eq!(both.stages(), vec![Stage::Development, Stage::Quality]);
    }

    #[test]
    fn test_release_and_config_commands() {
        let cli = parse(&["aysa", "release", "prod", "app", "web"]);
        assert!(matches!(
            cli.command,
            Commands::Release(ReleaseCommands::Prod(ReleaseArgs { ref images, yes: false })) if images.len() == 2
        ));

        let cli = parse(&["aysa", "config", "set", "registry.host", "r.example.com"]);
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Set(ConfigSetArgs { ref key, .. })) if key == "registry.host"
        ));
    }
}
