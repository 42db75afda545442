//! Registry commands
//!
//! - ls: list repositories and tags under the configured namespace
//! - add: create a tag pointing at the manifest of an existing one
//! - delete: remove tags

use anyhow::{anyhow, Context, Result};
use aysa_registry::{
    normalize_image_list, normalize_tag_filter, DeletePolicy, ImageReference, RegistryOperations,
};
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::{Map, Value};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::{RegistryAddArgs, RegistryCommands, RegistryDeleteArgs, RegistryLsArgs};
use crate::commands::common::{confirm, load_config, registry_operations};
use crate::output;

pub async fn run(cmd: RegistryCommands, env: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(env)?;
    let ops = registry_operations(&config)?;

    match cmd {
        RegistryCommands::Ls(args) => ls(&ops, args).await,
        RegistryCommands::Add(args) => add(&ops, args).await,
        RegistryCommands::Delete(args) => delete(&ops, args).await,
    }
}

// ============================================================================
// List Command
// ============================================================================

/// How much detail `ls` fetches per tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Detail {
    None,
    Summary,
    Manifest,
}

impl Detail {
    fn from_args(args: &RegistryLsArgs) -> Self {
        if args.manifest {
            Detail::Manifest
        } else if args.verbose {
            Detail::Summary
        } else {
            Detail::None
        }
    }
}

#[derive(Debug, Serialize)]
struct ImageEntry {
    repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    history: Option<Map<String, Value>>,
}

#[derive(Tabled)]
struct ImageRow {
    image: String,
    tag: String,
    created: String,
    digest: String,
}

/// Render a manifest `created` timestamp in UTC, keeping unparsable values as-is
fn format_created(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

impl From<&ImageEntry> for ImageRow {
    fn from(entry: &ImageEntry) -> Self {
        Self {
            image: entry.repository.clone(),
            tag: entry.tag.clone().unwrap_or_default(),
            created: entry
                .created
                .as_deref()
                .map_or_else(|| "-".to_string(), format_created),
            digest: entry.digest.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

async fn describe(
    ops: &RegistryOperations,
    reference: &ImageReference,
    detail: Detail,
) -> Result<ImageEntry> {
    let mut entry = ImageEntry {
        repository: reference.repository().to_string(),
        tag: reference.tag().map(str::to_string),
        created: None,
        digest: None,
        history: None,
    };

    let Some(tag) = reference.tag() else {
        return Ok(entry);
    };
    if detail == Detail::None {
        return Ok(entry);
    }

    let details = ops
        .inspect(reference.repository(), tag)
        .await
        .with_context(|| format!("Failed to inspect {}", reference.image_tag()))?;
    entry.created = details.created;
    entry.digest = details.digest;
    if detail == Detail::Manifest {
        entry.history = Some(details.history);
    }
    Ok(entry)
}

fn print_entry(entry: &ImageEntry, detail: Detail) -> Result<()> {
    match &entry.tag {
        Some(tag) => output::bullet(&format!("{}:{}", entry.repository, tag)),
        None => output::bullet(&entry.repository),
    }

    match detail {
        Detail::None => {}
        Detail::Summary => {
            let created = entry.created.as_deref().map(format_created);
            output::kv("created", created.as_deref().unwrap_or("-"));
            output::kv("digest", entry.digest.as_deref().unwrap_or("-"));
        }
        Detail::Manifest => {
            if let Some(history) = &entry.history {
                output::json(history)?;
            }
        }
    }
    Ok(())
}

async fn ls(ops: &RegistryOperations, args: RegistryLsArgs) -> Result<()> {
    let repos = normalize_image_list(&args.images, ops.namespace())?;
    let tag_filter = if args.repos_only {
        None
    } else {
        Some(normalize_tag_filter(Some(&args.tags)))
    };
    let detail = Detail::from_args(&args);

    let stream = ops.list_images(&repos, tag_filter);
    futures::pin_mut!(stream);

    // JSON and the verbose table need every row; plain output streams as tags arrive
    if args.json || detail == Detail::Summary {
        let mut entries = Vec::new();
        while let Some(reference) = stream.try_next().await? {
            entries.push(describe(ops, &reference, detail).await?);
        }

        if args.json {
            return output::json(&entries);
        }
        if entries.is_empty() {
            output::info("No images found");
            return Ok(());
        }
        let rows: Vec<ImageRow> = entries.iter().map(ImageRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
        return Ok(());
    }

    output::header("Images");
    let mut count = 0usize;
    while let Some(reference) = stream.try_next().await? {
        print_entry(&describe(ops, &reference, detail).await?, detail)?;
        count += 1;
    }
    if count == 0 {
        output::info("No images found");
    }
    Ok(())
}

// ============================================================================
// Add Command
// ============================================================================

async fn add(ops: &RegistryOperations, args: RegistryAddArgs) -> Result<()> {
    let source = ImageReference::parse(&ops.normalize_image(&args.source)?)?;
    let source_tag = source
        .tag()
        .ok_or_else(|| anyhow!("{} has no tag, expected IMAGE:TAG", args.source))?;

    let spinner = output::spinner(&format!(
        "Tagging {} as {}...",
        source.image_tag(),
        args.target_tag
    ));
    let result = ops
        .copy_tag(source.repository(), source_tag, &args.target_tag)
        .await;
    spinner.finish_and_clear();

    let target = result.with_context(|| format!("Failed to tag {}", source.image_tag()))?;
    output::success(&format!("Created {}", target.image_tag()));
    Ok(())
}

// ============================================================================
// Delete Command
// ============================================================================

fn parse_delete_targets(
    ops: &RegistryOperations,
    images: &[String],
) -> Result<Vec<ImageReference>> {
    let mut references = Vec::with_capacity(images.len());
    for image in normalize_image_list(images, ops.namespace())? {
        let reference = ImageReference::parse(&image)?;
        // every target needs a tag before anything is deleted
        reference.require_tag()?;
        references.push(reference);
    }
    Ok(references)
}

async fn delete(ops: &RegistryOperations, args: RegistryDeleteArgs) -> Result<()> {
    let references = parse_delete_targets(ops, &args.images)?;
    if references.is_empty() {
        return Err(anyhow!("No image tags given"));
    }

    output::header("Tags to delete");
    for reference in &references {
        output::bullet(&reference.image_tag());
    }
    if !confirm(&format!("Delete {} tag(s)?", references.len()), args.yes)? {
        return Ok(());
    }

    let policy = if args.continue_on_error {
        DeletePolicy::ContinueOnError
    } else {
        DeletePolicy::FailFast
    };

    let report = ops.delete_tags(&references, policy).await?;
    for reference in &report.deleted {
        output::success(&format!("Deleted {}", reference.image_tag()));
    }
    for (reference, err) in &report.failed {
        output::error(&format!("{}: {}", reference.image_tag(), err));
    }

    if !report.is_success() {
        return Err(anyhow!(
            "{} of {} tag(s) could not be deleted",
            report.failed.len(),
            references.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_created() {
        assert_eq!(
            format_created("2019-10-15T12:00:00.162457645Z"),
            "2019-10-15 12:00:00 UTC"
        );
        assert_eq!(
            format_created("2019-10-15T14:00:00+02:00"),
            "2019-10-15 12:00:00 UTC"
        );
        assert_eq!(format_created("yesterday"), "yesterday");
    }

    #[test]
    fn test_row_from_entry_without_details() {
        let entry = ImageEntry {
            repository: "ns/app".to_string(),
            tag: Some("dev".to_string()),
            created: None,
            digest: None,
            history: None,
        };
        let row = ImageRow::from(&entry);
        assert_eq!(row.tag, "dev");
        assert_eq!(row.created, "-");
        assert_eq!(row.digest, "-");
    }
}
