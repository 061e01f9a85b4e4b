//! In-memory runtime used by the collector and scheduler tests.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::container::{ContainerID, ContainerState};

use super::{Connector, ContainerRuntime, Error, InspectedContainer, Result};

#[derive(Debug, Default)]
struct Inner {
    containers: Mutex<Vec<InspectedContainer>>,
    vanished: Mutex<HashSet<ContainerID>>,
    broken: Mutex<HashSet<ContainerID>>,
    fail_list: AtomicBool,
    inspect_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    connects: AtomicUsize,
    lists: AtomicUsize,
}

/// Shared fake acting as both connector and runtime handle.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeRuntime {
    inner: Arc<Inner>,
}

impl FakeRuntime {
    pub fn new(containers: Vec<InspectedContainer>) -> Self {
        let fake = Self::default();
        fake.set_containers(containers);
        fake
    }

    pub fn set_containers(&self, containers: Vec<InspectedContainer>) {
        *self.inner.containers.lock().unwrap() = containers;
    }

    /// Listed, but answers 404 on inspection.
    pub fn vanish(&self, id: &str) {
        self.inner
            .vanished
            .lock()
            .unwrap()
            .insert(ContainerID::from(id));
    }

    /// Listed, but inspection fails with a server error.
    pub fn break_inspect(&self, id: &str) {
        self.inner
            .broken
            .lock()
            .unwrap()
            .insert(ContainerID::from(id));
    }

    pub fn fail_list(&self, fail: bool) {
        self.inner.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_inspect_delay(&self, delay: Duration) {
        *self.inner.inspect_delay.lock().unwrap() = delay;
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.inner.lists.load(Ordering::SeqCst)
    }
}

fn server_error(message: &str) -> bollard::errors::Error {
    bollard::errors::Error::DockerResponseServerError {
        status_code: 500,
        message: message.to_owned(),
    }
}

impl Connector for FakeRuntime {
    type Runtime = FakeRuntime;

    fn connect(&self) -> Result<FakeRuntime> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.clone())
    }
}

impl ContainerRuntime for FakeRuntime {
    async fn list_container_ids(&self) -> Result<Vec<ContainerID>> {
        self.inner.lists.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_list.load(Ordering::SeqCst) {
            return Err(Error::List(server_error("daemon unavailable")));
        }
        Ok(self
            .inner
            .containers
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.id.clone())
            .collect())
    }

    async fn inspect_container(&self, id: &ContainerID) -> Result<Option<InspectedContainer>> {
        let current = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.inner.inspect_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.inner.broken.lock().unwrap().contains(id) {
            return Err(Error::Inspect {
                id: id.to_string(),
                source: server_error("inspect failed"),
            });
        }
        if self.inner.vanished.lock().unwrap().contains(id) {
            return Ok(None);
        }
        Ok(self
            .inner
            .containers
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == id)
            .cloned())
    }
}

/// Builds an inspected container with the given name and raw state.
pub(crate) fn container(
    id: &str,
    name: &str,
    state: ContainerState,
    labels: &[(&str, &str)],
) -> InspectedContainer {
    InspectedContainer {
        id: ContainerID::from(id),
        name: Some(format!("/{name}")),
        image: "img".to_owned(),
        labels: labels
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>(),
        state,
    }
}

pub(crate) fn running(health: Option<&str>) -> ContainerState {
    ContainerState {
        lifecycle: "running".to_owned(),
        running: true,
        health: health.map(str::to_owned),
        ..Default::default()
    }
}

pub(crate) fn exited(exit_code: i64) -> ContainerState {
    ContainerState {
        lifecycle: "exited".to_owned(),
        exit_code: Some(exit_code),
        ..Default::default()
    }
}
