//! Request and response payloads of the HDInsight management API
//!
//! Only the fields the provider reads or writes are modelled. Every response
//! field is optional because the service omits fields freely.

use serde::{Deserialize, Serialize};

/// `GET .../extensions/clustermonitoring`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMonitoringResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_monitoring_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

/// `PUT .../extensions/clustermonitoring`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMonitoringRequest {
    pub workspace_id: String,
    pub primary_key: String,
}

/// `GET .../extensions/azureMonitor`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureMonitorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_monitoring_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

/// `PUT .../extensions/azureMonitor`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureMonitorRequest {
    pub workspace_id: String,
    pub primary_key: String,
}

/// `GET .../clusters/{name}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ClusterProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProperties {
    /// e.g. `Accepted`, `HdInsightConfiguration`, `Running`, `Error`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_state: Option<String>,
}
