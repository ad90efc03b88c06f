//! Test doubles shared by unit tests.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::http::{Backoff, PostRequest, Response, Transport, TransportError, TransportErrorKind};

/// Transport that replays a fixed script of outcomes.
///
/// The script is cycled by attempt number, so a one-entry script repeats
/// forever. Responses echo the request body back.
pub struct ScriptedTransport {
    steps: Vec<Result<u16, TransportErrorKind>>,
    attempts: AtomicUsize,
}

impl ScriptedTransport {
    /// Replays the given status codes.
    pub fn new(statuses: &[u16]) -> Self {
        Self::from_steps(statuses.iter().copied().map(Ok).collect())
    }

    /// Replays status codes and transport failures.
    pub fn from_steps(steps: Vec<Result<u16, TransportErrorKind>>) -> Self {
        assert!(!steps.is_empty(), "script must not be empty");
        Self {
            steps,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Number of requests executed so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: PostRequest) -> Result<Response, TransportError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        match self.steps[attempt % self.steps.len()] {
            Ok(status) => {
                let (_, body) = request.into_parts();
                Ok(Response::new(status).with_body(body))
            }
            Err(kind) => Err(TransportError::new(
                kind,
                format!("scripted failure on attempt {}", attempt + 1),
            )),
        }
    }
}

/// A backoff without jitter that counts how many delays were computed.
pub fn counting_backoff() -> (Backoff, Arc<AtomicUsize>) {
    let delays = Arc::new(AtomicUsize::new(0));
    let delays_clone = Arc::clone(&delays);

    let backoff = Backoff::with_jitter(move |_| {
        delays_clone.fetch_add(1, Ordering::SeqCst);
        0
    });

    (backoff, delays)
}
