//! Nimbus Core
//!
//! Long-running operation polling for resource providers whose management API
//! exposes no operation-status resource. The mutating request is fired first;
//! afterwards the only observable signal is the evolving state of the target
//! resource itself, which a [`poller::PollerType`] classifies and a
//! [`poller::Poller`] drives to completion.
//!
//! ## Module Structure
//!
//! - `poller` - Poll operation contract and the generic driver loop
//! - `context` - Cancellation and deadline propagation
//! - `config` - Poller defaults and per-operation timeouts
//! - `response` - Raw transport envelope and decoded API responses
//! - `provider` - Provider-level error wrapping

pub mod config;
pub mod context;
pub mod poller;
pub mod provider;
pub mod response;

// Re-export main types
pub use config::{ConfigError, Lifecycle, NimbusConfig, OperationTimeouts, PollerConfig};
pub use context::{CancelReason, PollContext};
pub use poller::{
    PollError, PollResult, Poller, PollerError, PollerErrorKind, PollerType, PollingStatus,
};
pub use provider::{ProviderError, ProviderResult};
pub use response::{ApiError, ApiResponse, RawResponse};
