//! High-level registry operations: listing, retag, delete, inspect, promote

use crate::client::RegistryClient;
use crate::error::{RegistryError, Result};
use crate::reference::ImageReference;
use aysa_core::types::{RegistryConfig, ReleaseConfig};
use futures::stream::{self, Stream, TryStreamExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, warn};

/// Tag filter value meaning "every tag"
pub const WILDCARD: &str = "*";

/// Which tags a listing expands to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    All,
    Only(Vec<String>),
}

impl TagFilter {
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::Only(tags) => tags.iter().any(|t| t == tag),
        }
    }
}

/// True when `repository` lies below `namespace` (an empty namespace holds everything)
fn is_under_namespace(repository: &str, namespace: &str) -> bool {
    let namespace = namespace.trim_matches('/');
    namespace.is_empty()
        || repository
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Prefix an image with the default namespace unless it already lives there
///
/// Any registry host in `raw` is dropped; the configured registry is always
/// the one addressed. The tag, if given, is kept.
pub fn normalize_image(raw: &str, namespace: &str) -> Result<String> {
    let reference = ImageReference::parse(raw)?;
    let namespace = namespace.trim().trim_matches('/');

    let repository = if is_under_namespace(reference.repository(), namespace) {
        reference.repository().to_string()
    } else {
        format!("{}/{}", namespace, reference.repository())
    };

    let normalized = match reference.tag() {
        Some(tag) => format!("{}:{}", repository, tag),
        None => repository,
    };

    // Re-validate: a malformed namespace must not slip through
    ImageReference::parse(&normalized)?;
    Ok(normalized)
}

/// Normalize comma-separated image names; blanks are skipped
pub fn normalize_image_list<I, S>(values: I, namespace: &str) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut images = Vec::new();
    for value in values {
        for item in value.as_ref().split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            images.push(normalize_image(item, namespace)?);
        }
    }
    Ok(images)
}

/// Parse a `-t` filter: `*` or empty means every tag
pub fn normalize_tag_filter(value: Option<&str>) -> TagFilter {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() || value == WILDCARD {
        return TagFilter::All;
    }

    let tags: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tags.is_empty() || tags.iter().any(|t| t == WILDCARD) {
        TagFilter::All
    } else {
        TagFilter::Only(tags)
    }
}

/// How bulk deletion reacts to a failed tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Stop and return the first error
    #[default]
    FailFast,
    /// Record the failure and keep deleting
    ContinueOnError,
}

/// Outcome of [`RegistryOperations::delete_tags`]
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: Vec<ImageReference>,
    pub failed: Vec<(ImageReference, RegistryError)>,
}

impl DeleteReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Promotion step of the release flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStage {
    /// `dev` → `rc` by default
    Qa,
    /// `rc` → `latest` by default
    Prod,
}

impl ReleaseStage {
    /// (source, target) tags for this stage
    pub fn tags<'a>(&self, release: &'a ReleaseConfig) -> (&'a str, &'a str) {
        match self {
            ReleaseStage::Qa => (&release.qa_source, &release.qa_target),
            ReleaseStage::Prod => (&release.prod_source, &release.prod_target),
        }
    }
}

impl fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseStage::Qa => f.write_str("qa"),
            ReleaseStage::Prod => f.write_str("prod"),
        }
    }
}

/// Verbose view of a tagged image
#[derive(Debug, Clone, Serialize)]
pub struct ImageDetails {
    pub repository: String,
    pub tag: String,
    pub created: Option<String>,
    pub digest: Option<String>,
    pub history: Map<String, Value>,
}

/// Registry operations scoped to a default namespace
pub struct RegistryOperations {
    client: RegistryClient,
    namespace: String,
    release: ReleaseConfig,
}

struct ListState<'a> {
    ops: &'a RegistryOperations,
    repo_filter: Vec<String>,
    tag_filter: Option<TagFilter>,
    repos: Option<VecDeque<String>>,
    pending: VecDeque<ImageReference>,
}

impl<'a> ListState<'a> {
    async fn next(mut self) -> Result<Option<(ImageReference, Self)>> {
        loop {
            if let Some(reference) = self.pending.pop_front() {
                return Ok(Some((reference, self)));
            }

            if self.repos.is_none() {
                let catalog = self.ops.client.catalog().into_entries().await?;
                let retained: VecDeque<String> = catalog
                    .into_iter()
                    .filter(|repo| is_under_namespace(repo, &self.ops.namespace))
                    .filter(|repo| self.repo_filter.is_empty() || self.repo_filter.contains(repo))
                    .collect();
                debug!("{} repositories retained from the catalog", retained.len());
                self.repos = Some(retained);
            }

            let Some(repo) = self.repos.as_mut().and_then(VecDeque::pop_front) else {
                return Ok(None);
            };

            match &self.tag_filter {
                None => self.pending.push_back(ImageReference::parse(&repo)?),
                Some(filter) => {
                    let tags = self.ops.client.tags(&repo)?.into_entries().await?;
                    for tag in tags.iter().filter(|t| filter.matches(t)) {
                        self.pending.push_back(ImageReference::with_tag(&repo, tag)?);
                    }
                }
            }
        }
    }
}

impl RegistryOperations {
    /// Operations against the configured registry
    pub fn new(settings: &RegistryConfig, release: ReleaseConfig) -> Result<Self> {
        Ok(Self::from_client(
            RegistryClient::new(settings)?,
            settings.namespace.clone(),
            release,
        ))
    }

    pub fn from_client(
        client: RegistryClient,
        namespace: impl Into<String>,
        release: ReleaseConfig,
    ) -> Self {
        Self {
            client,
            namespace: namespace.into().trim().trim_matches('/').to_string(),
            release,
        }
    }

    pub fn client(&self) -> &RegistryClient {
        &self.client
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn release(&self) -> &ReleaseConfig {
        &self.release
    }

    /// Normalize against this registry's namespace
    pub fn normalize_image(&self, raw: &str) -> Result<String> {
        normalize_image(raw, &self.namespace)
    }

    /// Lazily list images
    ///
    /// Catalog entries outside the namespace, or not in a non-empty
    /// `repo_filter`, are skipped. With a tag filter every retained repository
    /// has its tags listed and one tagged reference is yielded per matching
    /// tag; without one the bare repository is yielded and no tag listing is
    /// requested. Requests are issued one at a time as the stream is polled.
    pub fn list_images(
        &self,
        repo_filter: &[String],
        tag_filter: Option<TagFilter>,
    ) -> impl Stream<Item = Result<ImageReference>> + '_ {
        let state = ListState {
            ops: self,
            repo_filter: repo_filter.to_vec(),
            tag_filter,
            repos: None,
            pending: VecDeque::new(),
        };

        stream::try_unfold(state, ListState::next)
    }

    /// Collect [`Self::list_images`] into a vector
    pub async fn collect_images(
        &self,
        repo_filter: &[String],
        tag_filter: Option<TagFilter>,
    ) -> Result<Vec<ImageReference>> {
        self.list_images(repo_filter, tag_filter).try_collect().await
    }

    /// Fat manifest and digest of a tagged image
    pub async fn inspect(&self, repository: &str, tag: &str) -> Result<ImageDetails> {
        let manifest = self.client.fat_manifest(repository, tag).await?;
        let digest = self.client.digest(repository, tag).await?;

        Ok(ImageDetails {
            repository: repository.to_string(),
            tag: tag.to_string(),
            created: manifest.created().map(str::to_string),
            digest,
            history: manifest.history().clone(),
        })
    }

    /// Point `target_tag` at the manifest of `source_tag`
    ///
    /// One slim GET on the source and one PUT of the identical body on the
    /// target; no layers are uploaded and nothing is deleted.
    pub async fn copy_tag(
        &self,
        repository: &str,
        source_tag: &str,
        target_tag: &str,
    ) -> Result<ImageReference> {
        let target = ImageReference::with_tag(repository, target_tag)?;
        let manifest = self.client.slim_manifest(repository, source_tag).await?;
        self.client
            .put_manifest(repository, target_tag, &manifest)
            .await?;

        info!(
            "Tagged {}:{} as {}",
            repository,
            source_tag,
            target.image_tag()
        );
        Ok(target)
    }

    /// Delete one tag; blobs stay until the registry garbage-collects them
    pub async fn delete_tag(&self, repository: &str, tag: &str) -> Result<()> {
        self.client.delete_manifest(repository, tag).await?;
        info!("Deleted {}:{}", repository, tag);
        Ok(())
    }

    /// Delete several tagged references
    pub async fn delete_tags(
        &self,
        references: &[ImageReference],
        policy: DeletePolicy,
    ) -> Result<DeleteReport> {
        let mut report = DeleteReport::default();

        for reference in references {
            let result = match reference.require_tag() {
                Ok(tag) => self.delete_tag(reference.repository(), tag).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => report.deleted.push(reference.clone()),
                Err(e) if policy == DeletePolicy::ContinueOnError => {
                    warn!("Failed to delete {}: {}", reference.image_tag(), e);
                    report.failed.push((reference.clone(), e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(report)
    }

    /// Copy the stage's source tag to its target tag for each image
    ///
    /// Every selected image must carry the source tag; a missing one fails
    /// with the registry's error. An empty selection promotes every
    /// repository in the namespace that carries the source tag.
    pub async fn promote(
        &self,
        images: &[String],
        stage: ReleaseStage,
    ) -> Result<Vec<ImageReference>> {
        let (source, target) = stage.tags(&self.release);

        let repositories = if images.is_empty() {
            let candidates = self
                .collect_images(&[], Some(TagFilter::Only(vec![source.to_string()])))
                .await?;
            if candidates.is_empty() {
                warn!("No images tagged '{}' to promote to {}", source, stage);
            }
            candidates
                .iter()
                .map(|r| r.repository().to_string())
                .collect()
        } else {
            images
                .iter()
                .map(|i| ImageReference::parse(i).map(|r| r.repository().to_string()))
                .collect::<Result<Vec<_>>>()?
        };

        let mut promoted = Vec::with_capacity(repositories.len());
        for repository in &repositories {
            promoted.push(self.copy_tag(repository, source, target).await?);
        }
        Ok(promoted)
    }

    /// `dev` → `rc`
    pub async fn promote_to_qa(&self, images: &[String]) -> Result<Vec<ImageReference>> {
        self.promote(images, ReleaseStage::Qa).await
    }

    /// `rc` → `latest`
    pub async fn promote_to_prod(&self, images: &[String]) -> Result<Vec<ImageReference>> {
        self.promote(images, ReleaseStage::Prod).await
    }
}
