//! Outcome classification and the errors surfaced by a retrying POST.

use std::fmt;

use super::request::Response;
use super::transport::TransportError;

/// Result of a single attempt, as seen by the retry loop.
#[derive(Debug)]
pub enum Outcome {
    /// 2xx: return the response to the caller.
    Success(Response),
    /// 4xx: the request itself is at fault, retrying would reproduce it.
    ClientError(Response),
    /// Anything else: worth another attempt.
    RetryableFailure(Failure),
}

/// Cause of a retryable attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The server answered with a status that is neither success nor client error.
    Status(Response),
    /// The exchange could not be completed.
    Transport(TransportError),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Status(response) => write!(f, "HTTP {}", response.status_text),
            Failure::Transport(e) => write!(f, "{}", e),
        }
    }
}

/// Classifies the result of one transport call.
///
/// Success covers `200..299` and client error covers `400..499`, both
/// half-open: a 299 or 499 is treated as retryable.
pub fn classify(result: Result<Response, TransportError>) -> Outcome {
    match result {
        Ok(response) if (200..299).contains(&response.status) => Outcome::Success(response),
        Ok(response) if (400..499).contains(&response.status) => Outcome::ClientError(response),
        Ok(response) => Outcome::RetryableFailure(Failure::Status(response)),
        Err(e) => Outcome::RetryableFailure(Failure::Transport(e)),
    }
}

/// Errors returned by [`RetryingClient::post`](super::RetryingClient::post).
#[derive(Debug)]
pub enum PostError {
    /// The server rejected the request with a 4xx status. Not retried.
    ClientError { status: u16, response: Response },
    /// Every attempt failed with a retryable failure.
    AttemptsExhausted {
        max_attempts: u32,
        last_failure: Failure,
        /// Most recent response received, if any attempt got one.
        last_response: Option<Response>,
    },
    /// The request could not be built from the given URL and payload.
    InvalidRequest(String),
    /// `max_attempts` was zero.
    InvalidMaxAttempts,
}

impl PostError {
    /// The response that accompanies this error, if there is one.
    pub fn response(&self) -> Option<&Response> {
        match self {
            PostError::ClientError { response, .. } => Some(response),
            PostError::AttemptsExhausted { last_response, .. } => last_response.as_ref(),
            PostError::InvalidRequest(_) | PostError::InvalidMaxAttempts => None,
        }
    }
}

impl fmt::Display for PostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostError::ClientError { status, .. } => {
                write!(f, "client error {}, not retrying", status)
            }
            PostError::AttemptsExhausted {
                max_attempts,
                last_failure,
                ..
            } => {
                write!(
                    f,
                    "max attempts {} reached, last attempt failed with: {}",
                    max_attempts, last_failure
                )
            }
            PostError::InvalidRequest(msg) => write!(f, "invalid request: {}", msg),
            PostError::InvalidMaxAttempts => write!(f, "max attempts must be at least 1"),
        }
    }
}

impl std::error::Error for PostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PostError::AttemptsExhausted {
                last_failure: Failure::Transport(e),
                ..
            } => Some(e),
            _ => None,
        }
    }
}
