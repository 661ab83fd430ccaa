//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, access log)
//!     → handler.rs (method check, key resolution, GetObject)
//!         → key.rs (path → object key)
//!         → error.rs (backend error → status + generic message)
//!     → body.rs (stream object bytes, release backend stream)
//!     → Send to client
//! ```

pub mod body;
pub mod error;
pub mod handler;
pub mod key;
pub mod server;

pub use error::{ErrorKind, ProxyError};
pub use key::ObjectKey;
pub use server::HttpServer;
