//! HTTP server for the KYC gateway.
//!
//! Provides endpoints for:
//! - the verification protocol's hooks (find, create, update, status, SSO)
//! - token refresh on notification delivery
//! - downloads of uploaded documents
//! - a liveness check

pub mod error;
pub mod handlers;
pub mod ingest;
pub mod server;

pub use error::RpcError;
pub use handlers::AppState;
pub use server::{router, RpcServer, DEFAULT_BODY_LIMIT};
