//! Exporter settings loaded from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `LISTEN` | `0.0.0.0:9102` |
//! | `INSTANCE_NAME` | `FQDN`, then the host name |
//! | `REFRESH_INTERVAL_SECONDS` | `5` |
//! | `SERVICES_IGNORE_LIST` | `vmagent,health-exporter` |
//! | `INCLUDE_LABEL` | unset |
//! | `MAX_CONCURRENCY` | `20` |
//! | `METRICS_FILE` | unset |
//! | `DOCKER_HOST` | local socket, `tcp://localhost:2376` with TLS |
//! | `DOCKER_TLS_VERIFY` | unset, any value enables TLS |
//! | `DOCKER_CERT_PATH` | `$HOME/.docker` |
//!
//! Values are trimmed and empty values count as unset.
use std::path::PathBuf;
use std::time::Duration;

use crate::collector::DEFAULT_MAX_CONCURRENCY;
use crate::policy::{IgnoreList, InclusionPolicy, LabelFilter};
use crate::runtime::{DockerConnector, DockerHost, TlsCertificates};
use crate::scheduler::MIN_REFRESH_INTERVAL;

mod error;
mod parse;

pub use error::{Error, Result};

const DEFAULT_LISTEN: &str = "0.0.0.0:9102";
const DEFAULT_REFRESH_INTERVAL_SECS: f64 = 5.0;
const DEFAULT_IGNORE_LIST: &[&str] = &["vmagent", "health-exporter"];

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub listen_host: String,
    pub listen_port: u16,
    /// Value of the `instance` label on every exported sample.
    pub instance_name: String,
    pub refresh_interval: Duration,
    pub ignore_list: IgnoreList,
    pub include_label: Option<String>,
    pub max_concurrency: usize,
    /// Optional textfile the rendered metrics are written to.
    pub metrics_file: Option<PathBuf>,
    pub docker_host: DockerHost,
    /// Whether TCP connections to Docker use TLS with client certificates.
    pub docker_tls_verify: bool,
    /// Directory holding `key.pem`, `cert.pem` and `ca.pem`, set with TLS.
    pub docker_cert_path: Option<PathBuf>,
}

impl Settings {
    /// Loads the settings from the process environment.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidListen`] if `LISTEN` is not `host:port`.
    /// - [`Error::InvalidNumber`] if a numeric variable does not parse.
    /// - [`Error::InvalidDockerHost`] if `DOCKER_HOST` has an unsupported scheme.
    /// - [`Error::MissingCertPath`] if TLS is enabled without a certificate
    ///   directory.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the settings using `lookup` to resolve variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let listen = var("LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.to_owned());
        let (listen_host, listen_port) = parse::parse_listen(&listen)?;

        let instance_name = var("INSTANCE_NAME")
            .or_else(|| var("FQDN"))
            .unwrap_or_else(|| parse::read_hostname("/"));

        let refresh_interval = match var("REFRESH_INTERVAL_SECONDS") {
            Some(value) => parse_interval(&value)?,
            None => Duration::from_secs_f64(DEFAULT_REFRESH_INTERVAL_SECS),
        };

        let ignore_list = IgnoreList::new(parse::parse_set_csv(
            var("SERVICES_IGNORE_LIST").as_deref(),
            DEFAULT_IGNORE_LIST,
        ));

        let max_concurrency = match var("MAX_CONCURRENCY") {
            Some(value) => {
                let n = parse::parse_number::<i64>("MAX_CONCURRENCY", &value)?;
                usize::try_from(n.max(1)).unwrap_or(usize::MAX)
            }
            None => DEFAULT_MAX_CONCURRENCY,
        };

        let docker_host_var = var("DOCKER_HOST");
        let docker_tls_verify = var("DOCKER_TLS_VERIFY").is_some()
            || docker_host_var
                .as_deref()
                .is_some_and(|host| host.starts_with("https://"));
        let docker_host = parse::parse_docker_host(docker_host_var.as_deref(), docker_tls_verify)?;
        let docker_cert_path = if docker_tls_verify {
            let dir = var("DOCKER_CERT_PATH")
                .map(PathBuf::from)
                .or_else(|| var("HOME").map(|home| PathBuf::from(home).join(".docker")))
                .ok_or(Error::MissingCertPath)?;
            Some(dir)
        } else {
            None
        };

        Ok(Self {
            listen_host,
            listen_port,
            instance_name,
            refresh_interval,
            ignore_list,
            include_label: var("INCLUDE_LABEL"),
            max_concurrency,
            metrics_file: var("METRICS_FILE").map(PathBuf::from),
            docker_host,
            docker_tls_verify,
            docker_cert_path,
        })
    }

    /// Inclusion policy built from the ignore list and the include label.
    pub fn policy(&self) -> InclusionPolicy {
        InclusionPolicy::new(
            self.ignore_list.clone(),
            LabelFilter::parse(self.include_label.as_deref()),
        )
    }

    /// Docker connector for the configured host and TLS settings.
    pub fn docker_connector(&self) -> DockerConnector {
        let tls = self
            .docker_cert_path
            .as_ref()
            .filter(|_| self.docker_tls_verify)
            .map(TlsCertificates::new);
        DockerConnector::new(self.docker_host.clone(), tls)
    }
}

/// Parses fractional seconds, raising values below the minimum interval.
fn parse_interval(value: &str) -> Result<Duration> {
    let invalid = || Error::InvalidNumber {
        name: "REFRESH_INTERVAL_SECONDS",
        value: value.to_owned(),
    };
    let secs = parse::parse_number::<f64>("REFRESH_INTERVAL_SECONDS", value)?;
    if !secs.is_finite() {
        return Err(invalid());
    }

    Duration::try_from_secs_f64(secs.max(MIN_REFRESH_INTERVAL.as_secs_f64())).map_err(|_| invalid())
}
