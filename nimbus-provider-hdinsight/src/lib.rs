//! Nimbus HDInsight Provider
//!
//! Custom pollers for HDInsight operations that report completion only
//! through the resource itself, plus the monitoring lifecycle built on them.

pub mod client;
pub mod cluster_id;
pub mod models;
pub mod monitoring;
pub mod pollers;

#[cfg(test)]
mod testing;

pub use client::{ApiResult, ClustersClient, ExtensionsClient};
pub use cluster_id::{ClusterId, ParseClusterIdError};
pub use monitoring::{
    MASKED_PRIMARY_KEY, MonitorSettings, SettingsError, disable_azure_monitor, disable_monitoring,
    enable_azure_monitor, enable_monitoring, flatten_azure_monitor, flatten_monitoring,
    read_azure_monitor, read_monitoring, reconcile_azure_monitor, reconcile_monitoring,
};
pub use pollers::{ClusterStatePoller, MonitoringExtension, MonitoringPoller, MonitoringTarget};
