//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the greeting route
//! - Mount the scrape endpoint and request instrumentation when metrics are on
//! - Wire up middleware (request ID, tracing spans, request timeout)
//! - Serve on a listener until shutdown, draining in-flight requests

use std::time::Duration;

use axum::handler::Handler;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::http::handlers::{not_found, root};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::metrics;

/// HTTP server for the greeting service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server. Passing a metrics handle mounts the scrape endpoint
    /// at `config.metrics.path` and instruments every route.
    pub fn new(config: ServiceConfig, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            router: Self::build_router(&config, metrics),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, metrics_handle: Option<PrometheusHandle>) -> Router {
        let mut router = Router::new().route("/", get(root));

        if let Some(handle) = metrics_handle {
            router = router
                .merge(metrics::router(&config.metrics.path, handle))
                .route_layer(middleware::from_fn(metrics::track_metrics))
                .fallback(not_found.layer(middleware::from_fn(metrics::track_unmatched)));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                ))),
        )
    }

    /// The router, for serving or for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener, until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
