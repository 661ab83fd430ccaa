//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use tokio::net::TcpListener;

use s3_proxy::storage::{FetchedObject, ObjectStore, ObjectStream, StorageError};
use s3_proxy::{HttpServer, ProxyConfig, Shutdown};

pub const BUCKET: &str = "test-bucket";

/// What the stub answers for a key.
#[derive(Clone)]
pub enum Stub {
    Object {
        body: Bytes,
        content_type: Option<String>,
        cache_control: Option<String>,
        content_length: Option<i64>,
    },
    /// A body that never ends, one chunk every few milliseconds.
    Endless,
    /// `chunks` small chunks, each sent after `delay`.
    Trickle { chunks: usize, delay: Duration },
    ServiceError(&'static str),
    Unreachable,
}

impl Stub {
    pub fn object(body: &[u8], content_type: &str, cache_control: &str) -> Self {
        Stub::Object {
            body: Bytes::copy_from_slice(body),
            content_type: Some(content_type.to_string()),
            cache_control: Some(cache_control.to_string()),
            content_length: Some(body.len() as i64),
        }
    }
}

/// Stub backend counting fetches and body stream open/close events.
pub struct StubStore {
    entries: HashMap<String, Stub>,
    fallback: Stub,
    calls: AtomicUsize,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    requested: Mutex<Vec<(String, String)>>,
}

impl StubStore {
    /// Unknown keys answer `NoSuchKey`.
    pub fn new() -> Self {
        Self::with_fallback(Stub::ServiceError("NoSuchKey"))
    }

    pub fn with_fallback(fallback: Stub) -> Self {
        Self {
            entries: HashMap::new(),
            fallback,
            calls: AtomicUsize::new(0),
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(mut self, key: &str, stub: Stub) -> Self {
        self.entries.insert(key.to_string(), stub);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// `(bucket, key)` pairs in call order.
    pub fn requested(&self) -> Vec<(String, String)> {
        self.requested.lock().unwrap().clone()
    }

    /// Wait until every opened stream has been closed.
    pub async fn wait_released(&self) {
        for _ in 0..200 {
            if self.opened() == self.closed() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "backend streams leaked: opened {} closed {}",
            self.opened(),
            self.closed()
        );
    }

    fn open(&self, chunks: ObjectStream) -> ObjectStream {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let guard = CloseGuard(self.closed.clone());
        chunks
            .map(move |chunk| {
                let _ = &guard;
                chunk
            })
            .boxed()
    }
}

struct CloseGuard(Arc<AtomicUsize>);

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for StubStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<FetchedObject, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));

        match self.entries.get(key).unwrap_or(&self.fallback).clone() {
            Stub::Object {
                body,
                content_type,
                cache_control,
                content_length,
            } => {
                // Several chunks so the response is really streamed.
                let chunks: Vec<io::Result<Bytes>> = body
                    .chunks(4096)
                    .map(|c| Ok(Bytes::copy_from_slice(c)))
                    .collect();
                Ok(FetchedObject {
                    body: self.open(stream::iter(chunks).boxed()),
                    cache_control,
                    content_type,
                    content_length,
                })
            }
            Stub::Endless => {
                let chunks = stream::unfold((), |()| async {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    Some((Ok(Bytes::from(vec![b'x'; 16 * 1024])), ()))
                });
                Ok(FetchedObject {
                    body: self.open(chunks.boxed()),
                    cache_control: None,
                    content_type: Some("application/octet-stream".into()),
                    content_length: None,
                })
            }
            Stub::Trickle { chunks, delay } => {
                let body = stream::iter(0..chunks).then(move |_| async move {
                    tokio::time::sleep(delay).await;
                    Ok(Bytes::from_static(b"chunk"))
                });
                Ok(FetchedObject {
                    body: self.open(body.boxed()),
                    cache_control: None,
                    content_type: Some("text/plain".into()),
                    content_length: Some((chunks * 5) as i64),
                })
            }
            Stub::ServiceError(code) => Err(StorageError::service(
                code,
                format!("internal detail for {code}: RequestId 4442587FB7D0A2F9"),
            )),
            Stub::Unreachable => Err(StorageError::opaque(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "dispatch failure: connection refused",
            ))),
        }
    }
}

/// Start a proxy for `store` on an ephemeral port.
///
/// Keep the returned [`Shutdown`] alive for as long as the server is needed.
pub async fn start_proxy(store: Arc<StubStore>) -> (SocketAddr, Shutdown) {
    start_proxy_with(store, ProxyConfig::default()).await
}

pub async fn start_proxy_with(store: Arc<StubStore>, mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    config.storage.bucket = BUCKET.to_string();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
