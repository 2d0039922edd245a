//! # Driven Ports (Outbound SPI)
//!
//! Interfaces this subsystem requires from the host environment.
//!
//! ## Dependency Inversion
//!
//! The handshake engine, channel and lifecycle manager depend on these
//! traits only; concrete transports and fingerprint sources live in
//! `adapters/`, test doubles live here.

use crate::domain::{DeviceFingerprint, SessionError, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// HTTP method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound request. `target` is a path (resolved against the transport's
/// base URL) or an absolute URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Path or URL.
    pub target: String,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Body text.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Request with no headers or body.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// GET request.
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    /// POST request.
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    /// Builder: set a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Builder: set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builder: JSON body plus content type.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, SessionError> {
        let body = serde_json::to_string(value)?;
        Ok(self
            .with_header("Content-Type", "application/json")
            .with_body(body))
    }

    /// Replace a header (case-insensitive name match).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Look up a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Inbound response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Headers.
    pub headers: Vec<(String, String)>,
    /// Body text.
    pub body: String,
}

impl HttpResponse {
    /// Response with a status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// 200 with a text body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// 200 with a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, SessionError> {
        let mut resp = Self::ok(serde_json::to_string(value)?);
        resp.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        Ok(resp)
    }

    /// 2xx check.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T, SessionError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Fail on non-2xx.
    pub fn error_for_status(self) -> Result<Self, TransportError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TransportError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }

    /// Look up a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Request/response primitive.
///
/// Implementations must not retry internally; retry policy belongs to the
/// lifecycle manager.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one round trip.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Device fingerprint source.
///
/// Must never fail: each unavailable signal degrades to its sentinel.
pub trait FingerprintProvider: Send + Sync {
    /// Collect the current fingerprint.
    fn collect(&self) -> DeviceFingerprint;
}

/// Wall-clock source (unix milliseconds).
pub trait TimeSource: Send + Sync {
    /// Current time.
    fn now_millis(&self) -> u64;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Handler signature for [`MockTransport`].
pub type MockHandler =
    Arc<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

/// Scriptable transport that records every request.
#[derive(Clone)]
pub struct MockTransport {
    handler: MockHandler,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Answer every request with `handler`.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Always answer with `response`.
    pub fn always(response: HttpResponse) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }

    /// Always fail with `error`.
    pub fn failing(error: TransportError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    /// Sleep before each answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every request seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Requests whose target contains `path`.
    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.target.contains(path))
            .cloned()
            .collect()
    }

    /// Number of requests seen.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.request_count())
            .field("delay", &self.delay)
            .finish()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(&request)
    }
}

/// Time source returning a settable instant.
#[derive(Clone, Debug, Default)]
pub struct MockTimeSource {
    now: Arc<Mutex<u64>>,
}

impl MockTimeSource {
    /// Start at `millis`.
    pub fn new(millis: u64) -> Self {
        Self {
            now: Arc::new(Mutex::new(millis)),
        }
    }

    /// Move forward.
    pub fn advance(&self, millis: u64) {
        *self.now.lock() += millis;
    }

    /// Jump to an absolute time.
    pub fn set(&self, millis: u64) {
        *self.now.lock() = millis;
    }
}

impl TimeSource for MockTimeSource {
    fn now_millis(&self) -> u64 {
        *self.now.lock()
    }
}
