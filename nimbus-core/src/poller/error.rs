//! Poll and poller error types

use thiserror::Error;

use crate::context::CancelReason;
use crate::response::{ApiError, RawResponse};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by a single poll
#[derive(Debug, Error)]
pub enum PollError {
    /// The status query itself failed; the driver retries these
    #[error("{context}: {source}")]
    Query {
        context: String,
        #[source]
        source: BoxError,
    },

    /// The query succeeded but the response lacks a required field; never retried
    #[error("{context}: `{field}` was missing from the response")]
    MalformedResponse { context: String, field: String },

    /// The caller's context ended before the query completed
    #[error("{0}")]
    Cancelled(CancelReason),
}

impl PollError {
    pub fn query(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Query {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn malformed(context: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            field: field.into(),
        }
    }

    /// Classify a failed status query
    ///
    /// A body that cannot be decoded is as malformed as one missing a field,
    /// so only status and transport failures are retried.
    pub fn from_api(context: impl Into<String>, err: ApiError) -> Self {
        match err {
            ApiError::Decode(_) => Self::malformed(context, "body"),
            err => Self::query(context, err),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, PollError::Query { .. })
    }
}

/// Coarse classification of a [`PollerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerErrorKind {
    MalformedResponse,
    RetriesExhausted,
    Cancelled,
    OperationFailed,
}

/// Error returned by [`crate::poller::Poller::poll_until_done`]
#[derive(Debug, Error)]
pub enum PollerError {
    #[error("polling {operation} for {resource}: {source}")]
    MalformedResponse {
        operation: String,
        resource: String,
        #[source]
        source: PollError,
    },

    /// Too many consecutive transport failures; wraps the last one
    #[error(
        "polling {operation} for {resource}: giving up after {attempts} consecutive failed attempts: {source}"
    )]
    RetriesExhausted {
        operation: String,
        resource: String,
        attempts: u32,
        #[source]
        source: PollError,
    },

    #[error("polling {operation} for {resource}: {reason}")]
    Cancelled {
        operation: String,
        resource: String,
        reason: CancelReason,
    },

    /// The resource reported a terminal failure
    #[error("polling {operation} for {resource}: operation failed{}", describe_response(.http_response))]
    OperationFailed {
        operation: String,
        resource: String,
        http_response: Option<RawResponse>,
    },
}

fn describe_response(response: &Option<RawResponse>) -> String {
    match response {
        Some(response) => format!(" ({})", response.summary()),
        None => String::new(),
    }
}

impl PollerError {
    pub fn kind(&self) -> PollerErrorKind {
        match self {
            PollerError::MalformedResponse { .. } => PollerErrorKind::MalformedResponse,
            PollerError::RetriesExhausted { .. } => PollerErrorKind::RetriesExhausted,
            PollerError::Cancelled { .. } => PollerErrorKind::Cancelled,
            PollerError::OperationFailed { .. } => PollerErrorKind::OperationFailed,
        }
    }

    pub fn operation(&self) -> &str {
        match self {
            PollerError::MalformedResponse { operation, .. }
            | PollerError::RetriesExhausted { operation, .. }
            | PollerError::Cancelled { operation, .. }
            | PollerError::OperationFailed { operation, .. } => operation,
        }
    }

    pub fn resource(&self) -> &str {
        match self {
            PollerError::MalformedResponse { resource, .. }
            | PollerError::RetriesExhausted { resource, .. }
            | PollerError::Cancelled { resource, .. }
            | PollerError::OperationFailed { resource, .. } => resource,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PollerError::Cancelled { .. })
    }

    /// Why the context ended, for cancellation errors
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        match self {
            PollerError::Cancelled { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
