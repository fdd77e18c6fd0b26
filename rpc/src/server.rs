//! Axum-based RPC server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use kyc_callback::CallbackAdapter;

use crate::error::RpcError;
use crate::handlers::{self, AppState};

/// Request body cap used when none is configured. Uploads travel as base64
/// inside JSON, a third larger than the files themselves.
pub const DEFAULT_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Build the application router. Request bodies above `body_limit` bytes are
/// refused with 413.
pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(handlers::hello))
        .route("/hooks/find", post(handlers::find_kyc))
        .route("/hooks/create", post(handlers::create_kyc))
        .route("/hooks/update", post(handlers::update_kyc))
        .route("/hooks/status", post(handlers::query_status))
        .route("/hooks/sso", post(handlers::sso_payload))
        .route("/hooks/token", post(handlers::refresh_token))
        .route("/blobs/:id", get(handlers::download_blob))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
    body_limit: usize,
    state: AppState,
}

impl RpcServer {
    pub fn new(port: u16, callbacks: Arc<CallbackAdapter>) -> Self {
        Self {
            port,
            body_limit: DEFAULT_BODY_LIMIT,
            state: AppState::new(callbacks),
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn router(&self) -> Router {
        router(self.state.clone(), self.body_limit)
    }

    /// Bind the listening socket. Port 0 picks a free port.
    pub async fn bind(&self) -> Result<TcpListener, RpcError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {addr}: {e}")))
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!("RPC server listening on {}", addr);
        }
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!("RPC server stopped");
        Ok(())
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}
