//! Periodic export of the rendered metrics to a file, for collectors that
//! scrape a directory of `*.prom` files instead of an HTTP endpoint.
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::ResultOkLogExt;
use crate::metrics;
use crate::scheduler::SnapshotReader;

/// Error that occurs when writing the metrics file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to write metrics file `{path}`: {source}")]
pub struct Error {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Replaces the file at `path` with `contents`.
///
/// The contents are written to a temporary file in the same directory which
/// is then renamed over `path`, so readers never observe a partial file.
///
/// # Errors
///
/// Returns an [`Error`] if the temporary file cannot be created, written or
/// moved into place.
pub fn write_atomic(path: impl AsRef<Path>, contents: &str) -> Result<(), Error> {
    let path = path.as_ref();
    let wrap = |source| Error {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(wrap)?;
    tmp.write_all(contents.as_bytes()).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;
    tmp.as_file()
        .set_permissions(std::fs::Permissions::from_mode(0o644))
        .map_err(wrap)?;
    tmp.persist(path).map_err(|err| wrap(err.error))?;
    Ok(())
}

/// Writes the rendered metrics to a file on every interval.
#[derive(Debug)]
pub struct TextfileWriter {
    path: PathBuf,
    instance: Arc<str>,
    reader: SnapshotReader,
    interval: Duration,
}

impl TextfileWriter {
    pub fn new(
        path: impl Into<PathBuf>,
        instance: impl Into<Arc<str>>,
        reader: SnapshotReader,
        interval: Duration,
    ) -> Self {
        Self {
            path: path.into(),
            instance: instance.into(),
            reader,
            interval,
        }
    }

    /// Renders the current reading and writes it to the file.
    pub fn write_once(&self) -> Result<(), Error> {
        let body = metrics::render(&self.instance, &self.reader.read());
        write_atomic(&self.path, &body)
    }

    /// Writes the file until `stop` turns `true` or its sender is dropped.
    ///
    /// Failed writes are logged and retried on the next interval.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        log::info!("Writing metrics to `{}`", self.path.display());
        loop {
            if *stop.borrow_and_update() {
                break;
            }
            self.write_once().ok_log();

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        log::debug!("Stopped writing metrics to `{}`", self.path.display());
    }
}
