//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Proxy routes:
//!     → access_log.rs (one event per request: method, path, status, latency)
//!     → metrics.rs (counters, histograms)
//!
//! Process:
//!     → logging.rs (subscriber setup, text or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing fields, never preformatted strings
//! - Request ID flows from the request header into the access log
//! - Backend error detail goes to logs only, never into responses

pub mod access_log;
pub mod logging;
pub mod metrics;

pub use access_log::AccessLogLayer;
