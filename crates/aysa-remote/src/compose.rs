//! docker-compose orchestration over a remote session

use crate::error::{RemoteError, Result};
use crate::session::RemoteSession;
use aysa_registry::validate_token;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

static SERVICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z][\w]+$").expect("service regex is valid"));

// `docker-compose images` row: container, registry image, tag
static IMAGE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[a-z][\w-]*[_-]\d{1,3}\s{2,}[a-z0-9][\w.-]*(?::\d{1,5})?/[a-z0-9][\w./-]*\s{2,}[\w][\w.-]*(?:\s|$)",
    )
    .expect("image row regex is valid")
});

/// What happens when removing old containers or images fails during `deploy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPolicy {
    /// Abort the deploy with the failure
    #[default]
    Strict,
    /// Log a warning and keep deploying
    BestEffort,
}

/// Summary of a deploy run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub services: Vec<String>,
    pub images: Vec<String>,
    /// Cleanup failures tolerated under `CleanupPolicy::BestEffort`
    pub warnings: Vec<String>,
}

/// Service name from a compose container name (`project_service_1`)
fn container_service(container: &str) -> String {
    let sep = if container.contains('_') { '_' } else { '-' };
    let parts: Vec<&str> = container.split(sep).collect();
    if parts.len() < 3 {
        return container.to_string();
    }
    parts[1..parts.len() - 1].join(&sep.to_string())
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// Reject service names that are not plain identifiers before they reach a shell
pub fn validate_services(services: &[String]) -> Result<()> {
    for service in services {
        if !validate_token(service, None) || !SERVICE_RE.is_match(service) {
            return Err(RemoteError::invalid_service(service));
        }
    }
    Ok(())
}

/// Manages the compose project of one stage host
pub struct ComposeDeployer<S> {
    session: S,
}

impl<S: RemoteSession> ComposeDeployer<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Services of the project, restricted to `filter` when it is non-empty
    pub async fn services(&self, filter: &[String]) -> Result<Vec<String>> {
        validate_services(filter)?;
        let output = self
            .session
            .run_checked("docker-compose ps --services")
            .await?;

        let mut services = Vec::new();
        for line in output.lines().map(str::trim) {
            if !SERVICE_RE.is_match(line) {
                continue;
            }
            if !filter.is_empty() && !filter.iter().any(|f| f == line) {
                continue;
            }
            push_unique(&mut services, line.to_string());
        }
        Ok(services)
    }

    /// `image:tag` of the registry images used by `services` (all when empty)
    pub async fn images(&self, services: &[String]) -> Result<Vec<String>> {
        let output = self.session.run_checked("docker-compose images").await?;

        let mut images = Vec::new();
        for line in output.lines() {
            if !IMAGE_ROW_RE.is_match(line) {
                continue;
            }
            let mut columns = line.split_whitespace();
            let (Some(container), Some(image), Some(tag)) =
                (columns.next(), columns.next(), columns.next())
            else {
                continue;
            };
            if !services.is_empty() && !services.contains(&container_service(container)) {
                continue;
            }
            push_unique(&mut images, format!("{}:{}", image, tag));
        }
        Ok(images)
    }

    async fn cleanup(
        &self,
        command: &str,
        policy: CleanupPolicy,
        report: &mut DeployReport,
    ) -> Result<()> {
        match (self.session.run_checked(command).await, policy) {
            (Ok(_), _) => Ok(()),
            (Err(e), CleanupPolicy::Strict) => Err(e),
            (Err(e), CleanupPolicy::BestEffort) => {
                warn!("Cleanup step failed on {}: {}", self.session.target(), e);
                report.warnings.push(e.to_string());
                Ok(())
            }
        }
    }

    /// Redeploy: stop, remove the services and their images, prune volumes, bring up
    pub async fn deploy(&self, filter: &[String], policy: CleanupPolicy) -> Result<DeployReport> {
        validate_services(filter)?;
        let mut report = DeployReport::default();

        self.session.run_checked("docker-compose stop").await?;

        report.services = self.services(filter).await?;
        report.images = self.images(&report.services).await?;

        if !report.services.is_empty() {
            let command = format!("docker-compose rm -fsv {}", report.services.join(" "));
            self.cleanup(&command, policy, &mut report).await?;
        }

        if !report.images.is_empty() {
            let command = format!("docker rmi -f {}", report.images.join(" "));
            self.cleanup(&command, policy, &mut report).await?;
        }

        self.session.run_checked("docker volume prune -f").await?;
        self.session
            .run_checked("docker-compose up -d --remove-orphans")
            .await?;

        info!(
            "Deployed {} service(s) on {}",
            report.services.len(),
            self.session.target()
        );
        Ok(report)
    }

    /// Stop and remove containers, networks and volumes
    pub async fn down(&self) -> Result<()> {
        self.session
            .run_checked("docker-compose down -v --remove-orphans")
            .await?;
        Ok(())
    }

    /// Run `verb` on the selected services
    ///
    /// A non-empty filter matching no service of the project fails with
    /// `UnknownService` and runs nothing; only an empty filter acts on the
    /// whole project.
    async fn service_command(&self, verb: &str, filter: &[String]) -> Result<Vec<String>> {
        let services = self.services(filter).await?;
        if !filter.is_empty() && services.is_empty() {
            return Err(RemoteError::unknown_service(filter.join(" ")));
        }
        let command = if services.is_empty() {
            format!("docker-compose {}", verb)
        } else {
            format!("docker-compose {} {}", verb, services.join(" "))
        };
        self.session.run_checked(&command).await?;
        Ok(services)
    }

    pub async fn start(&self, filter: &[String]) -> Result<Vec<String>> {
        self.service_command("start", filter).await
    }

    pub async fn stop(&self, filter: &[String]) -> Result<Vec<String>> {
        self.service_command("stop", filter).await
    }

    pub async fn restart(&self, filter: &[String]) -> Result<Vec<String>> {
        self.service_command("restart", filter).await
    }

    /// Remove everything the project created, images included
    pub async fn prune(&self) -> Result<()> {
        self.session
            .run_checked("docker-compose down -v --rmi all --remove-orphans")
            .await?;
        self.session.run_checked("docker volume prune -f").await?;
        Ok(())
    }

    /// Raw `docker-compose ps` table
    pub async fn ps(&self) -> Result<String> {
        Ok(self.session.run_checked("docker-compose ps").await?.stdout)
    }

    /// All services of the project
    pub async fn ls(&self) -> Result<Vec<String>> {
        self.services(&[]).await
    }
}
