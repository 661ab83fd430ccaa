//! Object storage subsystem.
//!
//! # Data Flow
//! ```text
//! proxy_handler
//!     → ObjectStore::get_object(bucket, key)
//!         → s3.rs (aws-sdk-s3 GetObject)
//!     ← FetchedObject { body stream, metadata }  |  StorageError
//! ```
//!
//! # Design Decisions
//! - The store is a trait object so the HTTP layer never names the SDK
//!   and tests can inject stubs
//! - Errors are reduced to a tagged variant at this boundary: either the
//!   backend returned a coded error, or it did not
//! - The body is handed over unread; dropping it releases the connection

pub mod s3;

use std::fmt;
use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use thiserror::Error;

pub use s3::S3ObjectStore;

/// Unread object bytes. Dropping the stream releases the backend resource.
pub type ObjectStream = BoxStream<'static, io::Result<Bytes>>;

/// A successfully opened object.
pub struct FetchedObject {
    /// Body, opened but not yet read.
    pub body: ObjectStream,
    /// `Cache-Control` metadata stored with the object.
    pub cache_control: Option<String>,
    /// `Content-Type` metadata stored with the object.
    pub content_type: Option<String>,
    /// Length reported by the backend. Not re-validated against the stream.
    pub content_length: Option<i64>,
}

impl fmt::Debug for FetchedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedObject")
            .field("cache_control", &self.cache_control)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Failure to open an object.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend answered with a symbolic error code (e.g. `NoSuchKey`).
    #[error("{code}: {}", .message.as_deref().unwrap_or("no message"))]
    Service {
        code: String,
        message: Option<String>,
    },

    /// Anything without a code: transport failures, timeouts, SDK internals.
    #[error(transparent)]
    Opaque(Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: Some(message.into()),
        }
    }

    pub fn opaque<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Opaque(err.into())
    }

    /// The backend error code, if there is one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            Self::Opaque(_) => None,
        }
    }
}

/// Read access to a bucket-addressed object store.
///
/// Implementations must be safe for concurrent use by many requests.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<FetchedObject, StorageError>;
}
