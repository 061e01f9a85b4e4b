//! Access to the container runtime.
//!
//! The collector only depends on the [`Connector`] and [`ContainerRuntime`]
//! traits. [`DockerConnector`] implements them on top of the Docker Engine API.
use std::collections::HashMap;

use crate::container::{ContainerID, ContainerState};

mod docker;
mod error;
#[cfg(test)]
pub(crate) mod fake;

pub use docker::{DockerConnector, DockerHost, DockerRuntime, TlsCertificates};
pub use error::{Error, Result};

/// Detailed information about one container, reduced to what the exporter needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectedContainer {
    pub id: ContainerID,
    /// Raw runtime name, usually prefixed with `/`.
    pub name: Option<String>,
    pub image: String,
    pub labels: HashMap<String, String>,
    pub state: ContainerState,
}

/// Handle to a connected container runtime.
pub trait ContainerRuntime: Send + Sync {
    /// Lists the ids of all containers, including stopped ones.
    fn list_container_ids(&self) -> impl Future<Output = Result<Vec<ContainerID>>> + Send;

    /// Inspects a single container.
    ///
    /// Returns `Ok(None)` if the container no longer exists, e.g. because it
    /// was removed after it was listed.
    fn inspect_container(
        &self,
        id: &ContainerID,
    ) -> impl Future<Output = Result<Option<InspectedContainer>>> + Send;
}

/// Establishes connections to a container runtime.
pub trait Connector: Send + Sync + 'static {
    type Runtime: ContainerRuntime + 'static;

    fn connect(&self) -> Result<Self::Runtime>;
}
