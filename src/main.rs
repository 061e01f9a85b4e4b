/// Entry point for the Docker Healthcheck Exporter.
///
/// Reads its settings from the environment, starts refreshing container
/// health in the background and serves `/metrics` and `/health` until it
/// receives Ctrl-C or `SIGTERM`.
///
/// # Errors
///
/// Returns an error if initialization fails (e.g., invalid environment
/// variables or an address that cannot be bound).
///
/// # Examples
///
/// ```bash
/// RUST_LOG=info LISTEN=0.0.0.0:9102 INCLUDE_LABEL=monitor=true cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    docker_healthcheck_exporter::run().await
}
