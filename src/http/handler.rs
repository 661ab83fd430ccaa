//! Request handler: request path → object key → GetObject → streamed response.
//!
//! # Responsibilities
//! - Reject anything but GET before touching the backend
//! - Resolve the object key, reject empty keys with a generic 404
//! - Fetch the object from the configured bucket
//! - Copy Cache-Control, Content-Type and Content-Length verbatim
//! - Stream the body without buffering
//! - Map backend failures to generic responses, details to the log only

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    response::{IntoResponse, Response},
};

use crate::http::body::ObjectBody;
use crate::http::error::ProxyError;
use crate::http::key::ObjectKey;
use crate::observability::metrics;
use crate::storage::{FetchedObject, ObjectStore, StorageError};

/// Shared, read-only state for every proxied request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub bucket: Arc<str>,
    /// Deadline for the GetObject call; `None` waits as long as the SDK does.
    pub fetch_timeout: Option<Duration>,
    pub reject_dot_segments: bool,
}

/// Entry point for every path except `/health`.
pub async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    match serve_object(&state, request.method(), request.uri().path()).await {
        Ok(response) => response,
        Err(err) => {
            log_failure(&err);
            err.into_response()
        }
    }
}

async fn serve_object(state: &AppState, method: &Method, path: &str) -> Result<Response, ProxyError> {
    if method != Method::GET {
        return Err(ProxyError::MethodNotAllowed(method.clone()));
    }

    let key = ObjectKey::from_path(path).ok_or(ProxyError::EmptyKey)?;
    if state.reject_dot_segments && key.has_dot_segments() {
        return Err(ProxyError::EmptyKey);
    }

    let object = fetch(state, &key).await?;
    Ok(object_response(object, &key))
}

async fn fetch(state: &AppState, key: &ObjectKey) -> Result<FetchedObject, StorageError> {
    let request = state.store.get_object(&state.bucket, key.as_str());

    match state.fetch_timeout {
        Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
            StorageError::opaque(format!("GetObject timed out after {}s", limit.as_secs()))
        })?,
        None => request.await,
    }
}

fn object_response(object: FetchedObject, key: &ObjectKey) -> Response {
    let FetchedObject {
        body,
        cache_control,
        content_type,
        content_length,
    } = object;

    // A negative length from the backend is treated as unknown.
    let expected_len = content_length.and_then(|len| u64::try_from(len).ok());
    let body = ObjectBody::new(body, key.as_str()).with_expected_len(expected_len);

    let mut response = Response::new(Body::from_stream(body));
    let headers = response.headers_mut();

    let mut copy = |name: HeaderName, value: Option<String>| {
        let Some(value) = value else { return };
        match HeaderValue::from_str(&value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => {
                tracing::warn!(key = %key, header = %name, "Dropping invalid metadata header value");
            }
        }
    };

    copy(header::CACHE_CONTROL, cache_control);
    copy(header::CONTENT_TYPE, content_type);
    copy(header::CONTENT_LENGTH, expected_len.map(|len| len.to_string()));

    response
}

fn log_failure(err: &ProxyError) {
    match err.storage_error() {
        Some(StorageError::Service { code, message }) => {
            metrics::record_backend_error(code);
            tracing::error!(
                code = %code,
                detail = message.as_deref().unwrap_or_default(),
                "S3 error"
            );
        }
        Some(opaque @ StorageError::Opaque(_)) => {
            metrics::record_backend_error("opaque");
            tracing::error!(error = %opaque, "Error");
        }
        None => tracing::debug!(error = %err, "Request rejected"),
    }
}
