/// Errors that may occur while talking to the container runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to container runtime: {0}")]
    Connect(#[source] bollard::errors::Error),
    #[error("failed to list containers: {0}")]
    List(#[source] bollard::errors::Error),
    #[error("failed to inspect container `{id}`: {source}")]
    Inspect {
        id: String,
        #[source]
        source: bollard::errors::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
