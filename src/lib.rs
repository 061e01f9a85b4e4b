/// Docker Healthcheck Exporter: publishes the health of the containers on a
/// Docker host as Prometheus metrics.
///
/// A background loop periodically lists and inspects all containers with
/// bounded parallelism, classifies each one into a numeric health status and
/// publishes the resulting snapshot. The snapshot is served over HTTP and can
/// optionally be written to a textfile.
pub mod api;
pub mod collector;
pub mod config;
pub mod container;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod runtime;
pub mod scheduler;
pub mod textfile;

use tokio::sync::watch;

/// Runs the exporter until Ctrl-C or `SIGTERM` is received.
///
/// # Errors
///
/// Possible errors include:
/// - Invalid environment variables (e.g., a malformed `LISTEN`).
/// - Failure to set up the Docker client.
/// - Failure to bind or serve the HTTP listener.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::Settings::from_env()?;
    log::debug!("Settings: {:?}", settings);

    let connector = settings.docker_connector();
    let collector =
        collector::Collector::new(connector, settings.policy(), settings.max_concurrency);
    let mut scheduler = scheduler::RefreshScheduler::new(collector, settings.refresh_interval);
    scheduler.start().await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let textfile = settings.metrics_file.as_ref().map(|path| {
        let writer = textfile::TextfileWriter::new(
            path,
            settings.instance_name.as_str(),
            scheduler.reader(),
            scheduler.interval(),
        );
        tokio::spawn(writer.run(stop_rx))
    });

    let api = api::APIServer::new(scheduler.reader(), settings.instance_name.as_str());
    let served = api
        .listen(
            (settings.listen_host.as_str(), settings.listen_port),
            shutdown_signal(),
        )
        .await;
    log::info!("Shutting down");

    // fails only if the writer is already gone
    let _ = stop_tx.send(true);
    if let Some(task) = textfile {
        if let Err(err) = task.await {
            log::error!("textfile writer terminated abnormally: {}", err);
        }
    }
    scheduler.stop().await;

    served?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                log::error!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
