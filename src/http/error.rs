//! Client-facing error taxonomy and backend error classification.
//!
//! Every error response is a single generic sentence in plain text. Backend
//! codes and messages only ever reach the diagnostic log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::storage::StorageError;

pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";
pub const FORBIDDEN_MESSAGE: &str = "Access to the requested resource is forbidden";
pub const SOURCE_MISSING_MESSAGE: &str = "The requested source does not exist";
pub const INTERNAL_MESSAGE: &str = "An error occurred while processing your request";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// Coarse class of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    BucketMissing,
    Internal,
}

impl ErrorKind {
    /// Map a backend error onto the fixed set of classes.
    ///
    /// Unknown codes and errors without a code are both `Internal`.
    pub fn classify(err: &StorageError) -> Self {
        match err.code() {
            Some("NoSuchKey") => Self::NotFound,
            Some("AccessDenied" | "Forbidden") => Self::Forbidden,
            Some("InvalidBucketName" | "NoSuchBucket") => Self::BucketMissing,
            Some(_) | None => Self::Internal,
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            Self::NotFound | Self::BucketMissing => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NotFound => NOT_FOUND_MESSAGE,
            Self::Forbidden => FORBIDDEN_MESSAGE,
            Self::BucketMissing => SOURCE_MISSING_MESSAGE,
            Self::Internal => INTERNAL_MESSAGE,
        }
    }
}

/// Every way a proxied request can fail before the body starts streaming.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("method {0} not allowed")]
    MethodNotAllowed(axum::http::Method),

    #[error("request path resolves to an empty or rejected object key")]
    EmptyKey,

    #[error("object not found")]
    ObjectNotFound(#[source] StorageError),

    #[error("access forbidden")]
    AccessForbidden(#[source] StorageError),

    #[error("bucket unavailable")]
    BucketUnavailable(#[source] StorageError),

    #[error("backend failure")]
    BackendInternal(#[source] StorageError),
}

impl From<StorageError> for ProxyError {
    fn from(err: StorageError) -> Self {
        match ErrorKind::classify(&err) {
            ErrorKind::NotFound => Self::ObjectNotFound(err),
            ErrorKind::Forbidden => Self::AccessForbidden(err),
            ErrorKind::BucketMissing => Self::BucketUnavailable(err),
            ErrorKind::Internal => Self::BackendInternal(err),
        }
    }
}

impl ProxyError {
    /// The storage error behind this failure, if the backend was called.
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::MethodNotAllowed(_) | Self::EmptyKey => None,
            Self::ObjectNotFound(e)
            | Self::AccessForbidden(e)
            | Self::BucketUnavailable(e)
            | Self::BackendInternal(e) => Some(e),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            Some(kind) => kind.status(),
            None => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn message(&self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.message(),
            None => METHOD_NOT_ALLOWED_MESSAGE,
        }
    }

    fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::MethodNotAllowed(_) => None,
            Self::EmptyKey | Self::ObjectNotFound(_) => Some(ErrorKind::NotFound),
            Self::AccessForbidden(_) => Some(ErrorKind::Forbidden),
            Self::BucketUnavailable(_) => Some(ErrorKind::BucketMissing),
            Self::BackendInternal(_) => Some(ErrorKind::Internal),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}
