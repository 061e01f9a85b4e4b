use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::policy::IGNORE_ALL;
use crate::runtime::DockerHost;

use super::{Error, Result};

/// Address the Docker CLI connects to when TLS is enabled without a host.
const DEFAULT_TLS_HOST: &str = "localhost:2376";

/// Splits `host:port` at the last `:`. Brackets around IPv6 hosts are removed
/// and an empty host listens on all IPv4 interfaces.
pub fn parse_listen(value: &str) -> Result<(String, u16)> {
    let invalid = || Error::InvalidListen {
        value: value.to_owned(),
    };
    let (host, port) = value.rsplit_once(':').ok_or_else(invalid)?;
    let port = port.parse::<u16>().map_err(|_| invalid())?;

    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    let host = if host.is_empty() { "0.0.0.0" } else { host };

    Ok((host.to_owned(), port))
}

/// Parses a comma separated list of names and merges it with `defaults`.
///
/// `None` yields the defaults. The single value [`IGNORE_ALL`] replaces the
/// whole set with the sentinel.
pub fn parse_set_csv(value: Option<&str>, defaults: &[&str]) -> HashSet<String> {
    let mut set: HashSet<String> = defaults.iter().map(|s| (*s).to_owned()).collect();
    let Some(value) = value else {
        return set;
    };
    if value.trim() == IGNORE_ALL {
        return HashSet::from([IGNORE_ALL.to_owned()]);
    }

    set.extend(
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_owned),
    );
    set
}

pub fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidNumber {
        name,
        value: value.to_owned(),
    })
}

/// Parses `DOCKER_HOST`. Without a value the local socket is used, or the
/// Docker CLI's default TLS address if `tls` is requested.
pub fn parse_docker_host(value: Option<&str>, tls: bool) -> Result<DockerHost> {
    let Some(value) = value else {
        return Ok(if tls {
            DockerHost::Tcp(DEFAULT_TLS_HOST.to_owned())
        } else {
            DockerHost::Local
        });
    };
    let invalid = || Error::InvalidDockerHost {
        value: value.to_owned(),
    };
    let (scheme, rest) = value.split_once("://").ok_or_else(invalid)?;

    match scheme {
        "unix" if !rest.is_empty() => Ok(DockerHost::Unix(PathBuf::from(rest))),
        "tcp" | "http" | "https" => match rest.trim_end_matches('/') {
            "" => Err(invalid()),
            addr => Ok(DockerHost::Tcp(addr.to_owned())),
        },
        _ => Err(invalid()),
    }
}

/// Reads the host name from `rootfs`, falling back to `localhost`.
pub fn read_hostname(rootfs: impl AsRef<Path>) -> String {
    let rootfs = rootfs.as_ref();
    ["etc/hostname", "proc/sys/kernel/hostname"]
        .iter()
        .filter_map(|file| std::fs::read_to_string(rootfs.join(file)).ok())
        .map(|name| name.trim().to_owned())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_owned())
}
