//! KYC gateway service.
//!
//! The node is the coordinator that:
//! - Opens the configured storage backend (LMDB or in-memory)
//! - Builds the lifecycle manager and the callback adapter on top of it
//! - Serves the hook contract over HTTP until a shutdown signal arrives

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod shutdown;

pub use config::{Backend, ServiceConfig};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::KycNode;
pub use shutdown::ShutdownController;
