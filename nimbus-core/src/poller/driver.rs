//! Poller driver loop

use std::time::Duration;

use log::{debug, info, warn};

use super::error::{PollError, PollerError};
use super::{PollerType, PollingStatus};
use crate::config::{DEFAULT_FAILURE_BACKOFF, PollerConfig};
use crate::context::{CancelReason, PollContext};

/// Repeatedly invokes a [`PollerType`] until it reports a terminal status
///
/// ```ignore
/// let poller = Poller::new(op, Duration::from_secs(10), 3);
/// poller.poll_until_done(&ctx).await?;
/// ```
pub struct Poller<P> {
    poller_type: P,
    poll_interval: Duration,
    dropped_connections_allowed: u32,
    failure_backoff: Duration,
}

impl<P: PollerType> Poller<P> {
    /// Create a poller with a fallback interval and an allowance of consecutive
    /// transport failures
    pub fn new(poller_type: P, poll_interval: Duration, dropped_connections_allowed: u32) -> Self {
        Self {
            poller_type,
            poll_interval,
            dropped_connections_allowed,
            failure_backoff: DEFAULT_FAILURE_BACKOFF,
        }
    }

    pub fn with_config(poller_type: P, config: &PollerConfig) -> Self {
        Self::new(
            poller_type,
            config.poll_interval,
            config.dropped_connections_allowed,
        )
        .with_failure_backoff(config.failure_backoff)
    }

    /// Wait applied after a transport failure before polling again
    pub fn with_failure_backoff(mut self, backoff: Duration) -> Self {
        self.failure_backoff = backoff;
        self
    }

    pub fn poller_type(&self) -> &P {
        &self.poller_type
    }

    /// Poll until the operation succeeds, fails, or `ctx` ends
    ///
    /// - `Succeeded` returns `Ok(())`.
    /// - `InProgress` waits for the suggested interval (or the poller's own).
    /// - `Failed` returns [`PollerError::OperationFailed`].
    /// - Transport failures are retried; once more than the allowance occur in
    ///   a row, [`PollerError::RetriesExhausted`] wraps the last one.
    /// - Malformed responses return [`PollerError::MalformedResponse`] at once.
    /// - Cancellation is observed before each poll, during the query and during
    ///   the wait, and returns [`PollerError::Cancelled`].
    pub async fn poll_until_done(&self, ctx: &PollContext) -> Result<(), PollerError> {
        let operation = self.poller_type.operation();
        let resource = self.poller_type.resource();
        let mut consecutive_failures: u32 = 0;
        let mut attempt: u32 = 0;

        loop {
            if let Some(reason) = ctx.check() {
                return Err(cancelled(&operation, &resource, reason));
            }

            attempt += 1;
            debug!("Polling {} for {} (attempt {})", operation, resource, attempt);

            let outcome = tokio::select! {
                biased;
                reason = ctx.done() => return Err(cancelled(&operation, &resource, reason)),
                outcome = self.poller_type.poll(ctx) => outcome,
            };

            let wait = match outcome {
                Ok(result) => {
                    consecutive_failures = 0;
                    debug!(
                        "Polled {} for {}: {:?}",
                        operation, resource, result.status
                    );
                    match result.status {
                        PollingStatus::Succeeded => {
                            info!(
                                "{} for {} completed after {} polls",
                                operation, resource, attempt
                            );
                            return Ok(());
                        }
                        PollingStatus::Failed => {
                            return Err(PollerError::OperationFailed {
                                operation,
                                resource,
                                http_response: result.http_response,
                            });
                        }
                        PollingStatus::InProgress => {
                            result.poll_interval.unwrap_or(self.poll_interval)
                        }
                    }
                }
                Err(err @ PollError::Query { .. }) => {
                    consecutive_failures += 1;
                    if consecutive_failures > self.dropped_connections_allowed {
                        return Err(PollerError::RetriesExhausted {
                            operation,
                            resource,
                            attempts: consecutive_failures,
                            source: err,
                        });
                    }
                    warn!(
                        "Polling {} for {} failed ({}/{} retries): {}",
                        operation,
                        resource,
                        consecutive_failures,
                        self.dropped_connections_allowed,
                        err
                    );
                    self.failure_backoff
                }
                Err(err @ PollError::MalformedResponse { .. }) => {
                    return Err(PollerError::MalformedResponse {
                        operation,
                        resource,
                        source: err,
                    });
                }
                Err(PollError::Cancelled(reason)) => {
                    return Err(cancelled(&operation, &resource, reason));
                }
            };

            tokio::select! {
                biased;
                reason = ctx.done() => return Err(cancelled(&operation, &resource, reason)),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}

fn cancelled(operation: &str, resource: &str, reason: CancelReason) -> PollerError {
    debug!("Stopped polling {} for {}: {}", operation, resource, reason);
    PollerError::Cancelled {
        operation: operation.to_string(),
        resource: resource.to_string(),
        reason,
    }
}
