//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Resolve config → Init logging → Validate → Build S3 client → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → axum stops accepting → in-flight drain → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and happens before binding
//! - Listener binds last (traffic only when the client is ready)

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
