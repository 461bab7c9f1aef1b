//! Poller for the cluster's own `clusterState`
//!
//! Used after operations whose future completes before the cluster has
//! finished applying them, e.g. adding edge nodes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nimbus_core::context::PollContext;
use nimbus_core::poller::{PollError, PollResult, PollerType, PollingStatus};

use crate::client::ClustersClient;
use crate::cluster_id::ClusterId;

/// States a cluster passes through while (re)configuring
pub const CONFIGURING_STATES: &[&str] = &[
    "AzureVMConfiguration",
    "Accepted",
    "HdInsightConfiguration",
];

/// Minimum wait between cluster state polls (15 seconds)
pub const CLUSTER_STATE_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Polls `properties.clusterState` until it is one of the target states
///
/// Pending states keep polling. Any state that is neither pending nor a target
/// (e.g. `Error`) is a terminal failure.
pub struct ClusterStatePoller {
    client: Arc<dyn ClustersClient>,
    cluster_id: ClusterId,
    pending: Vec<String>,
    target: Vec<String>,
}

impl ClusterStatePoller {
    pub fn new<S: Into<String>>(
        client: Arc<dyn ClustersClient>,
        cluster_id: ClusterId,
        pending: impl IntoIterator<Item = S>,
        target: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            client,
            cluster_id,
            pending: pending.into_iter().map(Into::into).collect(),
            target: target.into_iter().map(Into::into).collect(),
        }
    }

    /// Wait for the cluster to settle back into `Running`
    pub fn running(client: Arc<dyn ClustersClient>, cluster_id: ClusterId) -> Self {
        Self::new(
            client,
            cluster_id,
            CONFIGURING_STATES.iter().copied(),
            ["Running"],
        )
    }

    fn matches(states: &[String], state: &str) -> bool {
        states.iter().any(|s| s.eq_ignore_ascii_case(state))
    }
}

#[async_trait]
impl PollerType for ClusterStatePoller {
    fn operation(&self) -> String {
        format!("cluster to become {}", self.target.join(" or "))
    }

    fn resource(&self) -> String {
        self.cluster_id.to_string()
    }

    async fn poll(&self, ctx: &PollContext) -> Result<PollResult, PollError> {
        let context = format!("retrieving HDInsight Cluster {}", self.cluster_id);

        let response = ctx
            .run(self.client.get(&self.cluster_id))
            .await
            .map_err(PollError::Cancelled)?
            .map_err(|e| PollError::from_api(&context, e))?;

        let state = response
            .model
            .as_ref()
            .ok_or_else(|| PollError::malformed(&context, "model"))?
            .properties
            .as_ref()
            .ok_or_else(|| PollError::malformed(&context, "model.properties"))?
            .cluster_state
            .as_deref()
            .ok_or_else(|| PollError::malformed(&context, "model.properties.clusterState"))?;

        let status = if Self::matches(&self.target, state) {
            PollingStatus::Succeeded
        } else if Self::matches(&self.pending, state) {
            PollingStatus::InProgress
        } else {
            log::warn!(
                "HDInsight Cluster {} entered unexpected state {:?}",
                self.cluster_id,
                state
            );
            PollingStatus::Failed
        };

        Ok(PollResult::new(status)
            .with_poll_interval(CLUSTER_STATE_POLL_INTERVAL)
            .with_http_response(response.http))
    }
}
