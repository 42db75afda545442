//! Release commands: promote tags between stages

use anyhow::{Context, Result};
use aysa_registry::{normalize_image_list, ReleaseStage};
use camino::Utf8Path;

use crate::cli::{ReleaseArgs, ReleaseCommands};
use crate::commands::common::{confirm, load_config, registry_operations};
use crate::output;

pub async fn run(cmd: ReleaseCommands, env: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ReleaseCommands::Qa(args) => promote(args, ReleaseStage::Qa, env).await,
        ReleaseCommands::Prod(args) => promote(args, ReleaseStage::Prod, env).await,
    }
}

async fn promote(args: ReleaseArgs, stage: ReleaseStage, env: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(env)?;
    let ops = registry_operations(&config)?;
    let (source, target) = stage.tags(ops.release());

    let images = normalize_image_list(&args.images, ops.namespace())?;
    let selection = if images.is_empty() {
        format!("every image tagged '{}'", source)
    } else {
        images.join(", ")
    };

    output::header(&format!("Release {}", stage.to_string().to_uppercase()));
    output::kv("images", &selection);
    output::kv("tags", &format!("{} -> {}", source, target));
    if !confirm(&format!("Tag {} as '{}'?", selection, target), args.yes)? {
        return Ok(());
    }

    let spinner = output::spinner(&format!("Promoting '{}' to '{}'...", source, target));
    let result = ops.promote(&images, stage).await;
    spinner.finish_and_clear();

    let promoted = result.with_context(|| format!("Release {} failed", stage))?;
    if promoted.is_empty() {
        output::warning(&format!("No images tagged '{}' were found", source));
        return Ok(());
    }
    for reference in &promoted {
        output::success(&format!("Created {}", reference.image_tag()));
    }
    Ok(())
}
