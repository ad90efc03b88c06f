//! POST client with retry, backoff and outcome classification.

use log::{info, warn};

use super::backoff::Backoff;
use super::request::{PostRequest, Response};
use super::retry::{Failure, Outcome, PostError, classify};
use super::transport::{Transport, TransportError};

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Settings bound to a [`RetryingClient`] at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Attempt limit for callers without their own, e.g. the command line.
    pub max_attempts: u32,
    /// Log response status, errors and backoff timing.
    pub verbose: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            verbose: false,
        }
    }
}

/// Sends POST requests through a [`Transport`], retrying transient failures.
pub struct RetryingClient<T: Transport> {
    transport: T,
    config: RetryConfig,
    backoff: Backoff,
}

impl<T: Transport> RetryingClient<T> {
    pub fn new(transport: T, config: RetryConfig) -> Self {
        Self {
            transport,
            config,
            backoff: Backoff::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Posts `payload` to `url`, making up to `max_attempts` attempts.
    ///
    /// The limit is per call; `RetryConfig::max_attempts` is only a default
    /// for callers that have no better value.
    ///
    /// Returns the first 2xx response. A 4xx response ends the sequence with
    /// [`PostError::ClientError`]. Any other status or a transport error is
    /// retried after a backoff; once attempts run out the last failure and
    /// the last response seen are returned in [`PostError::AttemptsExhausted`].
    #[tracing::instrument(skip(self, payload))]
    pub async fn post(
        &self,
        url: &str,
        payload: &[u8],
        max_attempts: u32,
    ) -> Result<Response, PostError> {
        let mut last_failure = None;
        let mut last_response = None;

        for attempt in 1..=max_attempts {
            let request = PostRequest::new(url, payload)?;

            if attempt > 1 {
                self.wait(attempt).await;
            }

            let result = self.transport.execute(request).await;
            self.log_result(attempt, max_attempts, &result);

            match classify(result) {
                Outcome::Success(response) => return Ok(response),
                Outcome::ClientError(response) => {
                    return Err(PostError::ClientError {
                        status: response.status,
                        response,
                    });
                }
                Outcome::RetryableFailure(failure) => {
                    if let Failure::Status(response) = &failure {
                        last_response = Some(response.clone());
                    }
                    last_failure = Some(failure);
                }
            }
        }

        // No attempt was made at all.
        let Some(last_failure) = last_failure else {
            return Err(PostError::InvalidMaxAttempts);
        };

        Err(PostError::AttemptsExhausted {
            max_attempts,
            last_failure,
            last_response,
        })
    }

    async fn wait(&self, attempt: u32) {
        let delay = self.backoff.delay(attempt);
        if self.config.verbose {
            info!("attempt={} back-off={:?}", attempt, delay);
        }
        tokio::time::sleep(delay).await;
    }

    fn log_result(
        &self,
        attempt: u32,
        max_attempts: u32,
        result: &Result<Response, TransportError>,
    ) {
        if !self.config.verbose {
            return;
        }

        match result {
            Ok(response) => info!(
                "attempt {}/{}: server responded with status: {}",
                attempt, max_attempts, response.status_text
            ),
            Err(e) => warn!(
                "attempt {}/{}: error posting request: {}",
                attempt, max_attempts, e
            ),
        }
    }
}
