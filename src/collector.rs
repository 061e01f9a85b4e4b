//! Builds health snapshots from the container runtime.
use tokio::sync::Semaphore;

use crate::container::{Classification, ContainerStatus, Snapshot, classify};
use crate::policy::InclusionPolicy;
use crate::runtime::{self, Connector, ContainerRuntime, InspectedContainer};

/// Default upper bound of concurrent inspection requests.
pub const DEFAULT_MAX_CONCURRENCY: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("collector not started")]
    NotStarted,
    #[error(transparent)]
    Runtime(#[from] runtime::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Queries the runtime and turns its containers into a [`Snapshot`].
///
/// Inspection failures are all-or-nothing: a container that disappeared
/// between listing and inspection is skipped, every other inspection error
/// fails the whole collection.
pub struct Collector<C: Connector> {
    connector: C,
    runtime: Option<C::Runtime>,
    policy: InclusionPolicy,
    max_concurrency: usize,
}

impl<C: Connector> Collector<C> {
    /// Creates a collector. `max_concurrency` is clamped to at least 1.
    pub fn new(connector: C, policy: InclusionPolicy, max_concurrency: usize) -> Self {
        Self {
            connector,
            runtime: None,
            policy,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn is_started(&self) -> bool {
        self.runtime.is_some()
    }

    /// Connects to the runtime, replacing any previous connection.
    pub fn start(&mut self) -> Result<()> {
        self.runtime = Some(self.connector.connect()?);
        Ok(())
    }

    /// Releases the runtime connection. Does nothing if not started.
    pub fn stop(&mut self) {
        if self.runtime.take().is_some() {
            log::debug!("Released container runtime connection");
        }
    }

    /// Collects the current health of all admitted containers.
    ///
    /// # Errors
    ///
    /// - [`Error::NotStarted`] if [`Collector::start`] was not called.
    /// - [`Error::Runtime`] if listing or inspecting containers fails.
    pub async fn collect(&self) -> Result<Snapshot> {
        let runtime = self.runtime.as_ref().ok_or(Error::NotStarted)?;

        let ids = runtime.list_container_ids().await?;
        log::trace!("Listed {} containers", ids.len());

        let semaphore = Semaphore::new(self.max_concurrency);
        let inspections = ids.iter().map(|id| {
            let semaphore = &semaphore;
            async move {
                // the semaphore is never closed
                let _permit = semaphore.acquire().await.ok();
                runtime.inspect_container(id).await
            }
        });
        let inspected = futures::future::try_join_all(inspections).await?;

        let mut snapshot = Snapshot::with_capacity(inspected.len());
        for container in inspected.into_iter().flatten() {
            if let Some(status) = self.evaluate(container) {
                snapshot.insert(status.name().to_owned(), status);
            }
        }

        Ok(snapshot)
    }

    /// Applies naming, inclusion policy and classification to one container.
    fn evaluate(&self, container: InspectedContainer) -> Option<ContainerStatus> {
        let raw_name = container.name.as_deref().unwrap_or_default();
        let name = raw_name.strip_prefix('/').unwrap_or(raw_name);
        if name.is_empty() {
            log::debug!("Skipping container `{}` without name", container.id);
            return None;
        }
        if !self.policy.admits(name, &container.labels) {
            log::trace!("Skipping container `{}`: excluded by policy", name);
            return None;
        }

        match classify(&container.state) {
            Classification::Omit => {
                log::trace!("Skipping container `{}`: exited successfully", name);
                None
            }
            Classification::Status(status) => {
                log::trace!("Container `{}` is {}", name, status);
                Some(ContainerStatus::new(
                    name,
                    status,
                    &container.id,
                    container.image,
                    &container.labels,
                ))
            }
        }
    }
}
