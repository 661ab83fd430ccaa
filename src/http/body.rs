//! Response body that streams an object straight from the backend.
//!
//! Chunks are forwarded as they arrive, so memory use does not depend on
//! object size. The backend stream is owned by [`ObjectBody`] and released
//! when the body is dropped: after the last chunk, after a read error, or
//! when hyper abandons the response because the client went away.
//!
//! Status and headers are already on the wire by the time any of this runs,
//! so failures here are diagnostics only.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

use crate::observability::metrics;
use crate::storage::ObjectStream;

/// Stream wrapper that owns the backend stream for one response.
pub struct ObjectBody {
    inner: Option<ObjectStream>,
    key: String,
    bytes_sent: u64,
    expected_len: Option<u64>,
    finished: bool,
}

impl ObjectBody {
    pub fn new(inner: ObjectStream, key: impl Into<String>) -> Self {
        Self {
            inner: Some(inner),
            key: key.into(),
            bytes_sent: 0,
            expected_len: None,
            finished: false,
        }
    }

    /// Length announced in `Content-Length`.
    ///
    /// hyper stops polling once that many bytes went out, so reaching it
    /// counts as completion even if the backend never signalled the end.
    pub fn with_expected_len(mut self, len: Option<u64>) -> Self {
        self.expected_len = len;
        self
    }

    fn completed(&self) -> bool {
        self.finished || self.expected_len.is_some_and(|len| self.bytes_sent >= len)
    }

    /// Drop the backend stream exactly once.
    fn release(&mut self) {
        if self.inner.take().is_some() {
            metrics::record_bytes_streamed(self.bytes_sent);
            tracing::debug!(
                key = %self.key,
                bytes_sent = self.bytes_sent,
                completed = self.completed(),
                "Object stream released"
            );
        }
    }
}

impl Stream for ObjectBody {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let Some(inner) = self.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                self.bytes_sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                tracing::error!(
                    key = %self.key,
                    bytes_sent = self.bytes_sent,
                    error = %e,
                    "Error writing response"
                );
                self.finished = true;
                self.release();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                self.finished = true;
                self.release();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ObjectBody {
    fn drop(&mut self) {
        if self.inner.is_some() && !self.completed() {
            tracing::warn!(
                key = %self.key,
                bytes_sent = self.bytes_sent,
                "Client disconnected before the object was fully sent"
            );
        }
        self.release();
    }
}
