//! Transport clients the provider depends on
//!
//! The HTTP transport (auth, transport-level retries, request signing) lives
//! outside this crate. Callers inject an implementation of these traits; the
//! pollers and lifecycle functions only see the decoded model and the raw
//! envelope.
//!
//! Cancelling a request means dropping its future, which the poller does as
//! soon as the caller's context ends.

use async_trait::async_trait;
use nimbus_core::response::{ApiError, ApiResponse};

use crate::cluster_id::ClusterId;
use crate::models::{
    AzureMonitorRequest, AzureMonitorResponse, Cluster, ClusterMonitoringRequest,
    ClusterMonitoringResponse,
};

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// HDInsight cluster extensions API
#[async_trait]
pub trait ExtensionsClient: Send + Sync {
    async fn get_monitoring_status(&self, id: &ClusterId) -> ApiResult<ClusterMonitoringResponse>;

    /// Fire-and-forget: the service returns before monitoring is enabled
    async fn enable_monitoring(
        &self,
        id: &ClusterId,
        request: &ClusterMonitoringRequest,
    ) -> ApiResult<()>;

    /// Fire-and-forget: the service returns before monitoring is disabled
    async fn disable_monitoring(&self, id: &ClusterId) -> ApiResult<()>;

    async fn get_azure_monitor_status(&self, id: &ClusterId) -> ApiResult<AzureMonitorResponse>;

    async fn enable_azure_monitor(
        &self,
        id: &ClusterId,
        request: &AzureMonitorRequest,
    ) -> ApiResult<()>;

    async fn disable_azure_monitor(&self, id: &ClusterId) -> ApiResult<()>;
}

/// HDInsight clusters API (read only; cluster CRUD is not part of this crate)
#[async_trait]
pub trait ClustersClient: Send + Sync {
    async fn get(&self, id: &ClusterId) -> ApiResult<Cluster>;
}
