//! Provider - Error type for resource lifecycle operations
//!
//! Lifecycle functions (create, update, delete and the side requests they
//! issue) report failures as a [`ProviderError`]: a message naming what was
//! being done, the resource it was done to, and the underlying cause.

use crate::poller::PollerError;

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<String>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}] {}", id, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(ref cause) = self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The poller failure behind this error, if polling is what failed
    pub fn poller_error(&self) -> Option<&PollerError> {
        self.cause
            .as_deref()
            .and_then(|cause| cause.downcast_ref::<PollerError>())
    }

    /// True when the operation stopped because the caller's context ended
    pub fn is_cancelled(&self) -> bool {
        self.poller_error().is_some_and(PollerError::is_cancelled)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
