//! Liveness endpoint.
//!
//! Answers `200` with an empty body for any method, without consulting the
//! storage backend and without going through the access log.

use axum::http::StatusCode;

pub async fn health_handler() -> StatusCode {
    StatusCode::OK
}
