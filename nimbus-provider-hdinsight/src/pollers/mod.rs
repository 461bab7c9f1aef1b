//! Custom pollers for HDInsight operations that have no LRO status header
//!
//! The extensions API accepts enable/disable requests asynchronously but
//! reports neither an `Azure-AsyncOperation` header nor a `provisioningState`.
//! Completion can only be observed on the extension status itself.

mod cluster_state;
mod monitoring;

pub use cluster_state::ClusterStatePoller;
pub use monitoring::{MonitoringExtension, MonitoringPoller, MonitoringTarget};
