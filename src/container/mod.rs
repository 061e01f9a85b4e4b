use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

mod status;

pub use status::{Classification, ContainerState, HealthStatus, classify};

/// Number of characters of the full id shown as the short container id.
const SHORT_ID_LEN: usize = 12;

/// Label set by docker compose carrying the project name.
pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";
/// Label set by docker compose carrying the service name.
pub const COMPOSE_SERVICE_LABEL: &str = "com.docker.compose.service";

/// Full container identifier as reported by the runtime.
///
/// # Examples
///
/// ```
/// # use docker_healthcheck_exporter::container::ContainerID;
/// let id = ContainerID::from("4f1e9c0a3b2d8e7f6a5b4c3d2e1f0a9b8c7d6e5f");
/// assert_eq!(id.short(), "4f1e9c0a3b2d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerID(Arc<str>);

impl ContainerID {
    /// Returns the first 12 characters of the id, or the whole id if it is shorter.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl Default for ContainerID {
    fn default() -> Self {
        Self::from("")
    }
}

impl From<&str> for ContainerID {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for ContainerID {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for ContainerID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ContainerID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classified health of a single container, one entry of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    name: String,
    status: HealthStatus,
    container_id: String,
    image: String,
    compose_project: String,
    compose_service: String,
}

impl ContainerStatus {
    /// Builds the status entry for a container.
    ///
    /// Compose grouping is read from the well known compose labels and left
    /// empty if they are absent.
    pub fn new(
        name: impl Into<String>,
        status: HealthStatus,
        container_id: &ContainerID,
        image: impl Into<String>,
        labels: &HashMap<String, String>,
    ) -> Self {
        let label = |key: &str| labels.get(key).cloned().unwrap_or_default();
        Self {
            name: name.into(),
            status,
            container_id: container_id.short().to_owned(),
            image: image.into(),
            compose_project: label(COMPOSE_PROJECT_LABEL),
            compose_service: label(COMPOSE_SERVICE_LABEL),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn health(&self) -> HealthStatus {
        self.status
    }

    /// Numeric taxonomy value, always consistent with [`Self::status_text`].
    pub fn status(&self) -> i8 {
        self.status.value()
    }

    pub fn status_text(&self) -> &'static str {
        self.status.as_str()
    }

    /// Short (12 character) container id.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn compose_project(&self) -> &str {
        &self.compose_project
    }

    pub fn compose_service(&self) -> &str {
        &self.compose_service
    }
}

/// All visible containers of one refresh cycle, keyed by container name.
pub type Snapshot = HashMap<String, ContainerStatus>;
