//! Poller - Waiting on long-running operations
//!
//! Some management APIs start an asynchronous operation but return neither an
//! operation-status URL nor a `provisioningState`. The only way to know the
//! operation finished is to re-read the target resource until one of its fields
//! reaches the expected value.
//!
//! A [`PollerType`] performs one such read and classifies it. A [`Poller`]
//! repeats it on an interval until the status is terminal, tolerating a bounded
//! number of transport failures and honoring the caller's [`PollContext`].

mod driver;
mod error;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::context::PollContext;
use crate::response::RawResponse;

pub use driver::Poller;
pub use error::{PollError, PollerError, PollerErrorKind};

/// Status of an operation as observed by a single poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingStatus {
    InProgress,
    Succeeded,
    Failed,
}

impl PollingStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PollingStatus::InProgress)
    }
}

/// Outcome of a single poll
#[derive(Debug, Clone, PartialEq)]
pub struct PollResult {
    pub status: PollingStatus,
    /// Suggested wait before the next poll; the driver's interval applies when `None`
    pub poll_interval: Option<Duration>,
    /// Raw response the status was derived from
    pub http_response: Option<RawResponse>,
}

impl PollResult {
    pub fn new(status: PollingStatus) -> Self {
        Self {
            status,
            poll_interval: None,
            http_response: None,
        }
    }

    pub fn in_progress() -> Self {
        Self::new(PollingStatus::InProgress)
    }

    pub fn succeeded() -> Self {
        Self::new(PollingStatus::Succeeded)
    }

    pub fn failed() -> Self {
        Self::new(PollingStatus::Failed)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_http_response(mut self, response: RawResponse) -> Self {
        self.http_response = Some(response);
        self
    }
}

/// A single status check bound to one resource and one completion predicate
///
/// Implementations must only observe: issuing the same poll twice without an
/// external change yields the same status.
#[async_trait]
pub trait PollerType: Send + Sync {
    /// What is being waited on (e.g. "disable Monitoring"), used in errors and logs
    fn operation(&self) -> String;

    /// Identifier of the polled resource
    fn resource(&self) -> String;

    /// Query the resource once and classify its current state
    ///
    /// Transport failures are [`PollError::Query`]; a response lacking the
    /// inspected field is [`PollError::MalformedResponse`]. The query must not
    /// be issued once `ctx` is done, and is abandoned if `ctx` ends while it is
    /// in flight ([`PollError::Cancelled`]); [`PollContext::run`] does both.
    async fn poll(&self, ctx: &PollContext) -> Result<PollResult, PollError>;
}

#[async_trait]
impl<T: PollerType + ?Sized> PollerType for Box<T> {
    fn operation(&self) -> String {
        (**self).operation()
    }

    fn resource(&self) -> String {
        (**self).resource()
    }

    async fn poll(&self, ctx: &PollContext) -> Result<PollResult, PollError> {
        (**self).poll(ctx).await
    }
}

#[async_trait]
impl<T: PollerType + ?Sized> PollerType for Arc<T> {
    fn operation(&self) -> String {
        (**self).operation()
    }

    fn resource(&self) -> String {
        (**self).resource()
    }

    async fn poll(&self, ctx: &PollContext) -> Result<PollResult, PollError> {
        (**self).poll(ctx).await
    }
}
