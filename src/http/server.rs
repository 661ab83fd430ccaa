//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the proxy and health handlers
//! - Wire up middleware (request ID, access log) on proxy routes only
//! - Bind server to listener and serve until shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, SetRequestIdLayer};

use crate::config::ProxyConfig;
use crate::health::health_handler;
use crate::http::handler::{proxy_handler, AppState};
use crate::observability::AccessLogLayer;
use crate::storage::ObjectStore;

/// HTTP server for the S3 proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving `config.storage.bucket` from `store`.
    pub fn new(config: ProxyConfig, store: Arc<dyn ObjectStore>) -> Self {
        let fetch_timeout = match config.storage.fetch_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let state = AppState {
            store,
            bucket: Arc::from(config.storage.bucket.as_str()),
            fetch_timeout,
            reject_dot_segments: config.security.reject_dot_segments,
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router.
    ///
    /// `/health` is merged in after the layers so it bypasses the access log.
    fn build_router(state: AppState) -> Router {
        let proxy = Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(AccessLogLayer)
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        Router::new()
            .route("/health", any(health_handler))
            .merge(proxy)
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires or its sender is dropped.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;

        let storage = &self.config.storage;
        tracing::info!(
            address = %addr,
            bucket = %storage.bucket,
            region = %storage.region,
            loglevel = %self.config.observability.log_level,
            endpoint = storage.endpoint.as_deref(),
            use_path_style = storage.force_path_style,
            "Starting S3 proxy server"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
