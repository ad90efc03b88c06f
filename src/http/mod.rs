//! HTTP POST client with retry logic and error handling.

mod backoff;
mod client;
mod request;
mod retry;
mod transport;

pub use backoff::{Backoff, base_delay};
pub use client::{DEFAULT_MAX_ATTEMPTS, RetryConfig, RetryingClient};
pub use request::{PostRequest, Response};
pub use retry::{Failure, Outcome, PostError, classify};
pub use transport::{
    CONNECT_TIMEOUT, REQUEST_TIMEOUT, ReqwestTransport, Transport, TransportError,
    TransportErrorKind,
};
