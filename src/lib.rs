//! S3 Proxy Library
//!
//! A read-only HTTP front door for a single S3 bucket: `GET /<key>` streams
//! the object back, backend errors become generic responses.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http::server ──▶ observability::access_log ──▶ http::handler
//!                         │                                            │
//!                         └─ /health (health)                          ├─ http::key
//!                                                                      ├─ storage (S3 GetObject)
//!     Client Response                                                  ├─ http::error
//!     ◀───────────── http::body (streamed, released on drop) ◀─────────┘
//! ```

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod storage;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use storage::{ObjectStore, S3ObjectStore};
