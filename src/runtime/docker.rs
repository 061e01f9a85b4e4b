//! Docker Engine API backend using bollard.
use std::fmt;
use std::path::PathBuf;

use bollard::Docker;
use bollard::models::{ContainerInspectResponse, ContainerStateStatusEnum, HealthStatusEnum};
use bollard::query_parameters::{InspectContainerOptionsBuilder, ListContainersOptionsBuilder};

use crate::container::{ContainerID, ContainerState};

use super::{Connector, ContainerRuntime, Error, InspectedContainer, Result};

/// Request timeout for Docker API calls, in seconds.
const DOCKER_TIMEOUT_SECS: u64 = 120;

/// Address of the Docker daemon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DockerHost {
    /// Platform default, the Unix socket on Linux.
    #[default]
    Local,
    /// Path of a Unix socket.
    Unix(PathBuf),
    /// `host:port` of a daemon listening on TCP.
    Tcp(String),
}

impl fmt::Display for DockerHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockerHost::Local => f.write_str("local default socket"),
            DockerHost::Unix(path) => write!(f, "unix://{}", path.display()),
            DockerHost::Tcp(addr) => write!(f, "tcp://{addr}"),
        }
    }
}

/// Client certificates for TLS, named like the Docker CLI expects them in
/// `DOCKER_CERT_PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsCertificates {
    dir: PathBuf,
}

impl TlsCertificates {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn key(&self) -> PathBuf {
        self.dir.join("key.pem")
    }

    pub fn cert(&self) -> PathBuf {
        self.dir.join("cert.pem")
    }

    pub fn ca(&self) -> PathBuf {
        self.dir.join("ca.pem")
    }
}

/// Connects to the Docker daemon.
///
/// TCP hosts use TLS when certificates are configured and plain HTTP
/// otherwise. Certificates are ignored for socket connections.
#[derive(Debug, Clone, Default)]
pub struct DockerConnector {
    host: DockerHost,
    tls: Option<TlsCertificates>,
}

impl DockerConnector {
    pub fn new(host: DockerHost, tls: Option<TlsCertificates>) -> Self {
        Self { host, tls }
    }
}

impl Connector for DockerConnector {
    type Runtime = DockerRuntime;

    fn connect(&self) -> Result<DockerRuntime> {
        let docker = match (&self.host, &self.tls) {
            (DockerHost::Local, _) => Docker::connect_with_local_defaults(),
            (DockerHost::Unix(path), _) => Docker::connect_with_unix(
                &path.to_string_lossy(),
                DOCKER_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
            (DockerHost::Tcp(addr), Some(tls)) => Docker::connect_with_ssl(
                addr,
                &tls.key(),
                &tls.cert(),
                &tls.ca(),
                DOCKER_TIMEOUT_SECS,
                bollard::API_DEFAULT_VERSION,
            ),
            (DockerHost::Tcp(addr), None) => {
                Docker::connect_with_http(addr, DOCKER_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
        }
        .map_err(Error::Connect)?;
        log::debug!(
            "Connected to Docker at {}{}",
            self.host,
            if self.tls.is_some() { " using TLS" } else { "" }
        );

        Ok(DockerRuntime { docker })
    }
}

/// Connected Docker client.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl ContainerRuntime for DockerRuntime {
    async fn list_container_ids(&self) -> Result<Vec<ContainerID>> {
        let options = ListContainersOptionsBuilder::new().all(true).build();
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(Error::List)?;

        Ok(containers
            .into_iter()
            .filter_map(|summary| summary.id)
            .map(ContainerID::from)
            .collect())
    }

    async fn inspect_container(&self, id: &ContainerID) -> Result<Option<InspectedContainer>> {
        let options = InspectContainerOptionsBuilder::new().build();
        match self
            .docker
            .inspect_container(id.as_ref(), Some(options))
            .await
        {
            Ok(info) => Ok(Some(from_inspect_response(id, info))),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                log::debug!("Container `{}` disappeared before it could be inspected", id);
                Ok(None)
            }
            Err(source) => Err(Error::Inspect {
                id: id.to_string(),
                source,
            }),
        }
    }
}

/// Reduces a Docker inspect response to an [`InspectedContainer`].
///
/// Missing sections fall back to defaults: no state means not running, no
/// labels means an empty label set and a `none`/empty health status means no
/// healthcheck is configured.
fn from_inspect_response(
    listed_id: &ContainerID,
    info: ContainerInspectResponse,
) -> InspectedContainer {
    let id = info
        .id
        .map(ContainerID::from)
        .unwrap_or_else(|| listed_id.clone());
    let (image, labels) = match info.config {
        Some(config) => (
            config.image.unwrap_or_default(),
            config.labels.unwrap_or_default(),
        ),
        None => Default::default(),
    };
    let state = info
        .state
        .map(|state| ContainerState {
            lifecycle: state
                .status
                .map(lifecycle_str)
                .unwrap_or_default()
                .to_owned(),
            running: state.running.unwrap_or(false),
            restarting: state.restarting.unwrap_or(false),
            exit_code: state.exit_code,
            health: state
                .health
                .and_then(|health| health.status)
                .and_then(health_str)
                .map(str::to_owned),
        })
        .unwrap_or_default();

    InspectedContainer {
        id,
        name: info.name,
        image,
        labels,
        state,
    }
}

fn lifecycle_str(status: ContainerStateStatusEnum) -> &'static str {
    match status {
        ContainerStateStatusEnum::EMPTY => "",
        ContainerStateStatusEnum::CREATED => "created",
        ContainerStateStatusEnum::RUNNING => "running",
        ContainerStateStatusEnum::PAUSED => "paused",
        ContainerStateStatusEnum::RESTARTING => "restarting",
        ContainerStateStatusEnum::REMOVING => "removing",
        ContainerStateStatusEnum::EXITED => "exited",
        ContainerStateStatusEnum::DEAD => "dead",
    }
}

fn health_str(status: HealthStatusEnum) -> Option<&'static str> {
    match status {
        HealthStatusEnum::HEALTHY => Some("healthy"),
        HealthStatusEnum::UNHEALTHY => Some("unhealthy"),
        HealthStatusEnum::STARTING => Some("starting"),
        HealthStatusEnum::EMPTY | HealthStatusEnum::NONE => None,
    }
}
