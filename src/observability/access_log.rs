//! Per-request access logging.
//!
//! [`AccessLogLayer`] wraps the proxy routes (never `/health`) and emits one
//! `debug` event per request: method, path, remote address, status, elapsed
//! milliseconds, user agent and request id. The status is read from the
//! response head. The event itself is emitted by [`AccessLogBody`] once the
//! body has been fully sent, has failed, or was dropped because the client
//! went away, so the duration covers the whole transfer.

use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::http::{header, Request, Response};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use http_body::{Body as HttpBody, Frame, SizeHint};
use pin_project_lite::pin_project;
use tower::{Layer, Service};

use crate::observability::metrics;

/// Header used to correlate log lines for one request.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that adds [`AccessLog`] around a service.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLogLayer;

impl<S> Layer<S> for AccessLogLayer {
    type Service = AccessLog<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessLog { inner }
    }
}

/// Access-logging decorator around an HTTP service.
#[derive(Debug, Clone)]
pub struct AccessLog<S> {
    inner: S,
}

/// What the access log needs from the request, captured before it is consumed.
#[derive(Debug)]
struct RequestInfo {
    method: String,
    path: String,
    remote_addr: Option<SocketAddr>,
    user_agent: String,
    request_id: String,
}

impl RequestInfo {
    fn capture<B>(req: &Request<B>) -> Self {
        let header_str = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        Self {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            remote_addr: req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            user_agent: header_str(header::USER_AGENT.as_str()),
            request_id: header_str(X_REQUEST_ID),
        }
    }
}

/// Everything needed to emit the access log event, minus the final duration.
#[derive(Debug)]
struct Completion {
    info: RequestInfo,
    status: u16,
    start: Instant,
}

impl Completion {
    fn emit(self, outcome: &'static str) {
        let info = self.info;
        let duration_ms = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let remote_addr = info
            .remote_addr
            .map(|addr| addr.to_string())
            .unwrap_or_default();

        tracing::debug!(
            method = %info.method,
            path = %info.path,
            remote_addr = %remote_addr,
            status = self.status,
            duration_ms,
            user_agent = %info.user_agent,
            request_id = %info.request_id,
            outcome,
            "HTTP request"
        );
        metrics::record_request(&info.method, self.status, self.start);
    }
}

pin_project! {
    /// Response body that logs the request when it finishes.
    pub struct AccessLogBody<B> {
        #[pin]
        inner: B,
        completion: Option<Completion>,
        sent: u64,
        // From `Content-Length`; hyper may drop the body once it is reached.
        expected: Option<u64>,
    }

    impl<B> PinnedDrop for AccessLogBody<B> {
        fn drop(this: Pin<&mut Self>) {
            let this = this.project();
            if let Some(completion) = this.completion.take() {
                let done = this.expected.is_some_and(|len| *this.sent >= len);
                completion.emit(if done { "complete" } else { "aborted" });
            }
        }
    }
}

impl<B> HttpBody for AccessLogBody<B>
where
    B: HttpBody<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        let poll = this.inner.poll_frame(cx);

        let outcome = match &poll {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    *this.sent += data.len() as u64;
                }
                None
            }
            Poll::Ready(None) => Some("complete"),
            Poll::Ready(Some(Err(_))) => Some("failed"),
            _ => None,
        };
        if let Some(outcome) = outcome {
            if let Some(completion) = this.completion.take() {
                completion.emit(outcome);
            }
        }

        poll
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AccessLog<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    ResBody: HttpBody + Send + 'static,
{
    type Response = Response<AccessLogBody<ResBody>>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let start = Instant::now();
        let info = RequestInfo::capture(&req);
        let future = self.inner.call(req);

        Box::pin(async move {
            let response = future.await?;
            let completion = Completion {
                info,
                status: response.status().as_u16(),
                start,
            };

            let expected = response
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());

            Ok(response.map(|inner| AccessLogBody {
                expected: expected.or(inner.size_hint().exact()),
                inner,
                completion: Some(completion),
                sent: 0,
            }))
        })
    }
}
