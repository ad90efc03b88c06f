//! Transport abstraction: executes a single request, never retries.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use super::request::{PostRequest, Response};

/// Time allowed to establish a connection, including the TLS handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Time allowed for a whole request/response exchange.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Executes one HTTP exchange.
///
/// Implementations return a [`Response`] for every status code and only fail
/// when the exchange itself could not be completed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: PostRequest) -> Result<Response, TransportError>;
}

/// What went wrong while talking to the remote end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// DNS resolution, connection refused, TLS handshake.
    Connect,
    /// Connect or request timeout elapsed.
    Timeout,
    /// The response body could not be read.
    Body,
    Other,
}

/// Failure to complete an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TransportErrorKind::Connect => write!(f, "connection failed: {}", self.message),
            TransportErrorKind::Timeout => write!(f, "request timed out: {}", self.message),
            TransportErrorKind::Body => write!(f, "failed to read response body: {}", self.message),
            TransportErrorKind::Other => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        // Timeouts are checked first: reqwest flags a connect timeout as both.
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else if error.is_body() || error.is_decode() {
            TransportErrorKind::Body
        } else {
            TransportErrorKind::Other
        };

        Self::new(kind, error.to_string())
    }
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default user agent and timeouts.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent("retry-post")
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::with_client(client))
    }

    /// Wraps an already configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: PostRequest) -> Result<Response, TransportError> {
        debug!("POST {} ({} bytes)", request.url(), request.body().len());

        let method = request.method();
        let (url, body) = request.into_parts();

        let response = self.client.request(method, url).body(body).send().await?;

        let status = response.status();
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let body = response.bytes().await?;

        debug!("Received {} with {} body bytes", status, body.len());

        let mut response = Response::new(status.as_u16()).with_body(body.to_vec());
        response.headers = headers;
        Ok(response)
    }
}
