use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::ToSocketAddrs;

use crate::metrics;
use crate::scheduler::SnapshotReader;

#[derive(Debug, Clone)]
struct Exporter {
    reader: SnapshotReader,
    instance: Arc<str>,
}

async fn export_metrics(exporter: State<Exporter>) -> Response {
    let body = metrics::render(&exporter.instance, &exporter.reader.read());
    (
        axum::http::StatusCode::OK,
        [(header::CONTENT_TYPE, metrics::CONTENT_TYPE)],
        body,
    )
        .into_response()
}

async fn health() -> &'static str {
    "ok\n"
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub fn new(reader: SnapshotReader, instance: impl Into<Arc<str>>) -> Self {
        let router = axum::Router::new()
            .route("/metrics", get(export_metrics))
            .route("/health", get(health))
            .with_state(Exporter {
                reader,
                instance: instance.into(),
            });
        Self { router }
    }

    /// Serves the API until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn listen(
        self,
        addr: impl ToSocketAddrs,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await
    }
}
