//! Request identification and inbound-request helpers.
//!
//! # Responsibilities
//! - Assign a unique request ID (UUID v4) as early as possible for tracing
//! - Preserve a caller-supplied x-request-id
//! - Extract the authority this service was addressed as (Referer matching)
//!
//! # Design Decisions
//! - The ID lives both in the header map (propagation) and in request
//!   extensions (typed access)

use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::header::{HeaderName, HeaderValue, HOST};
use axum::http::Request;
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Typed request ID stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Layer that stamps every request with an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let id = match req.headers().get(&X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
            Some(existing) => existing.to_string(),
            None => {
                let generated = Uuid::new_v4().to_string();
                if let Ok(value) = HeaderValue::from_str(&generated) {
                    req.headers_mut().insert(X_REQUEST_ID.clone(), value);
                }
                generated
            }
        };
        req.extensions_mut().insert(RequestId(id));
        self.inner.call(req)
    }
}

/// The authority (host[:port]) the inbound request addressed this service
/// as, from the Host header or the HTTP/2 :authority pseudo-header.
pub fn own_authority<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.uri().authority().map(|a| a.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::ServiceExt;

    async fn echo_id(req: Request<Body>) -> Result<Option<String>, Infallible> {
        Ok(req.extensions().get::<RequestId>().map(|id| id.0.clone()))
    }

    #[tokio::test]
    async fn generates_id_when_absent() {
        let service = RequestIdLayer.layer(tower::service_fn(echo_id));
        let req = Request::builder().body(Body::empty()).unwrap();
        let id = service.oneshot(req).await.unwrap().unwrap();
        assert_eq!(id.len(), 36);
    }

    #[tokio::test]
    async fn preserves_existing_id() {
        let service = RequestIdLayer.layer(tower::service_fn(echo_id));
        let req = Request::builder()
            .header("x-request-id", "caller-chosen")
            .body(Body::empty())
            .unwrap();
        let id = service.oneshot(req).await.unwrap().unwrap();
        assert_eq!(id, "caller-chosen");
    }

    #[test]
    fn authority_prefers_host_header() {
        let req = Request::builder()
            .uri("http://ignored.example.com/x")
            .header("host", "localhost:5000")
            .body(())
            .unwrap();
        assert_eq!(own_authority(&req).as_deref(), Some("localhost:5000"));
    }
}
