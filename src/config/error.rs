/// Errors that may occur while loading the settings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid listen address `{value}`: expected `host:port` like `0.0.0.0:9102`")]
    InvalidListen { value: String },
    #[error("invalid value for `{name}`: `{value}`")]
    InvalidNumber { name: &'static str, value: String },
    #[error(
        "unsupported DOCKER_HOST `{value}`: expected `unix://`, `tcp://`, `http://` or `https://`"
    )]
    InvalidDockerHost { value: String },
    #[error("DOCKER_TLS_VERIFY is set but neither DOCKER_CERT_PATH nor HOME is available")]
    MissingCertPath,
}

pub type Result<T> = std::result::Result<T, Error>;
