//! Poller for the monitoring and Azure Monitor extension flags

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nimbus_core::config::DEFAULT_POLL_INTERVAL;
use nimbus_core::context::PollContext;
use nimbus_core::poller::{PollError, PollResult, PollerType, PollingStatus};
use nimbus_core::response::ApiResponse;

use crate::client::ExtensionsClient;
use crate::cluster_id::ClusterId;

/// Which cluster extension is being toggled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringExtension {
    /// Log Analytics cluster monitoring (`extensions/clustermonitoring`)
    Monitoring,
    /// Azure Monitor integration (`extensions/azureMonitor`)
    AzureMonitor,
}

impl MonitoringExtension {
    /// Name as used in messages, e.g. "the Monitoring"
    pub fn label(self) -> &'static str {
        match self {
            MonitoringExtension::Monitoring => "the Monitoring",
            MonitoringExtension::AzureMonitor => "Azure Monitor",
        }
    }

    fn status_label(self) -> &'static str {
        match self {
            MonitoringExtension::Monitoring => "Monitoring Status",
            MonitoringExtension::AzureMonitor => "Azure Monitor Status",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            MonitoringExtension::Monitoring => "Monitoring",
            MonitoringExtension::AzureMonitor => "Azure Monitor",
        }
    }
}

/// State the extension flag must reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringTarget {
    Enabled,
    Disabled,
}

impl MonitoringTarget {
    pub fn is_reached(self, enabled: bool) -> bool {
        match self {
            MonitoringTarget::Enabled => enabled,
            MonitoringTarget::Disabled => !enabled,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            MonitoringTarget::Enabled => "enable",
            MonitoringTarget::Disabled => "disable",
        }
    }
}

impl fmt::Display for MonitoringTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitoringTarget::Enabled => write!(f, "enabled"),
            MonitoringTarget::Disabled => write!(f, "disabled"),
        }
    }
}

/// Polls an extension's `clusterMonitoringEnabled` flag until it matches the target
pub struct MonitoringPoller {
    client: Arc<dyn ExtensionsClient>,
    cluster_id: ClusterId,
    extension: MonitoringExtension,
    target: MonitoringTarget,
}

impl MonitoringPoller {
    pub fn new(
        client: Arc<dyn ExtensionsClient>,
        cluster_id: ClusterId,
        extension: MonitoringExtension,
        target: MonitoringTarget,
    ) -> Self {
        Self {
            client,
            cluster_id,
            extension,
            target,
        }
    }

    pub fn enable_monitoring(client: Arc<dyn ExtensionsClient>, cluster_id: ClusterId) -> Self {
        Self::new(
            client,
            cluster_id,
            MonitoringExtension::Monitoring,
            MonitoringTarget::Enabled,
        )
    }

    pub fn disable_monitoring(client: Arc<dyn ExtensionsClient>, cluster_id: ClusterId) -> Self {
        Self::new(
            client,
            cluster_id,
            MonitoringExtension::Monitoring,
            MonitoringTarget::Disabled,
        )
    }

    pub fn enable_azure_monitor(client: Arc<dyn ExtensionsClient>, cluster_id: ClusterId) -> Self {
        Self::new(
            client,
            cluster_id,
            MonitoringExtension::AzureMonitor,
            MonitoringTarget::Enabled,
        )
    }

    pub fn disable_azure_monitor(client: Arc<dyn ExtensionsClient>, cluster_id: ClusterId) -> Self {
        Self::new(
            client,
            cluster_id,
            MonitoringExtension::AzureMonitor,
            MonitoringTarget::Disabled,
        )
    }

    pub fn cluster_id(&self) -> &ClusterId {
        &self.cluster_id
    }

    pub fn target(&self) -> MonitoringTarget {
        self.target
    }

    pub fn poll_interval(&self) -> Duration {
        DEFAULT_POLL_INTERVAL
    }
}

/// Pull the flag out of a status response, rejecting absent fields
fn monitoring_flag<T>(
    context: &str,
    response: &ApiResponse<T>,
    flag: impl FnOnce(&T) -> Option<bool>,
) -> Result<bool, PollError> {
    let model = response
        .model
        .as_ref()
        .ok_or_else(|| PollError::malformed(context, "model"))?;
    flag(model).ok_or_else(|| PollError::malformed(context, "model.clusterMonitoringEnabled"))
}

#[async_trait]
impl PollerType for MonitoringPoller {
    fn operation(&self) -> String {
        format!("{} {}", self.target.verb(), self.extension.short_name())
    }

    fn resource(&self) -> String {
        self.cluster_id.to_string()
    }

    async fn poll(&self, ctx: &PollContext) -> Result<PollResult, PollError> {
        let context = format!(
            "retrieving {} for {}",
            self.extension.status_label(),
            self.cluster_id
        );

        let (enabled, http) = match self.extension {
            MonitoringExtension::Monitoring => {
                let response = ctx
                    .run(self.client.get_monitoring_status(&self.cluster_id))
                    .await
                    .map_err(PollError::Cancelled)?
                    .map_err(|e| PollError::from_api(&context, e))?;
                let enabled =
                    monitoring_flag(&context, &response, |m| m.cluster_monitoring_enabled)?;
                (enabled, response.http)
            }
            MonitoringExtension::AzureMonitor => {
                let response = ctx
                    .run(self.client.get_azure_monitor_status(&self.cluster_id))
                    .await
                    .map_err(PollError::Cancelled)?
                    .map_err(|e| PollError::from_api(&context, e))?;
                let enabled =
                    monitoring_flag(&context, &response, |m| m.cluster_monitoring_enabled)?;
                (enabled, response.http)
            }
        };

        let status = if self.target.is_reached(enabled) {
            PollingStatus::Succeeded
        } else {
            PollingStatus::InProgress
        };

        Ok(PollResult::new(status)
            .with_poll_interval(self.poll_interval())
            .with_http_response(http))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExtensionsClient, Reply, cluster_id, init_logger};
    use nimbus_core::context::CancelReason;
    use nimbus_core::poller::{Poller, PollerErrorKind};
    use tokio::time::Instant;

    fn poller_for(
        client: &Arc<MockExtensionsClient>,
        extension: MonitoringExtension,
        target: MonitoringTarget,
    ) -> MonitoringPoller {
        MonitoringPoller::new(client.clone(), cluster_id(), extension, target)
    }

    #[tokio::test]
    async fn flag_maps_to_status_for_both_polarities() {
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[Reply::Flag(true)]));
        let ctx = PollContext::new();

        let enable = poller_for(&client, MonitoringExtension::Monitoring, MonitoringTarget::Enabled);
        let disable = poller_for(&client, MonitoringExtension::Monitoring, MonitoringTarget::Disabled);

        assert_eq!(enable.poll(&ctx).await.unwrap().status, PollingStatus::Succeeded);
        assert_eq!(disable.poll(&ctx).await.unwrap().status, PollingStatus::InProgress);
    }

    #[tokio::test]
    async fn result_carries_interval_and_response() {
        let client = Arc::new(MockExtensionsClient::with_azure_monitor(&[Reply::Flag(false)]));
        let poller = poller_for(
            &client,
            MonitoringExtension::AzureMonitor,
            MonitoringTarget::Disabled,
        );

        let result = poller.poll(&PollContext::new()).await.unwrap();

        assert_eq!(result.status, PollingStatus::Succeeded);
        assert_eq!(result.poll_interval, Some(Duration::from_secs(10)));
        assert_eq!(
            result.http_response.and_then(|r| r.request_id).as_deref(),
            Some("req-1")
        );
        assert_eq!(client.calls(), vec!["get_azure_monitor_status"]);
    }

    #[tokio::test]
    async fn poll_is_idempotent() {
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[Reply::Flag(true)]));
        let poller = MonitoringPoller::disable_monitoring(client.clone(), cluster_id());
        let ctx = PollContext::new();

        for _ in 0..3 {
            assert_eq!(poller.poll(&ctx).await.unwrap().status, PollingStatus::InProgress);
        }
        assert_eq!(client.count("get_monitoring_status"), 3);
        assert_eq!(client.count("disable_monitoring"), 0);
    }

    #[tokio::test]
    async fn missing_model_is_malformed() {
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[Reply::NoModel]));
        let poller = MonitoringPoller::disable_monitoring(client, cluster_id());

        let err = poller.poll(&PollContext::new()).await.unwrap_err();

        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            format!(
                "retrieving Monitoring Status for {}: `model` was missing from the response",
                cluster_id()
            )
        );
    }

    #[tokio::test]
    async fn missing_flag_is_malformed() {
        let client = Arc::new(MockExtensionsClient::with_azure_monitor(&[Reply::NoFlag]));
        let poller = MonitoringPoller::enable_azure_monitor(client, cluster_id());

        let err = poller.poll(&PollContext::new()).await.unwrap_err();

        match err {
            PollError::MalformedResponse { field, .. } => {
                assert_eq!(field, "model.clusterMonitoringEnabled")
            }
            other => panic!("Expected MalformedResponse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_failure_is_query_error() {
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[Reply::Error(503)]));
        let poller = MonitoringPoller::enable_monitoring(client, cluster_id());

        let err = poller.poll(&PollContext::new()).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(err.to_string().starts_with("retrieving Monitoring Status for"));
    }

    #[tokio::test]
    async fn cancelled_context_issues_no_query() {
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[Reply::Flag(true)]));
        let poller = MonitoringPoller::disable_monitoring(client.clone(), cluster_id());
        let ctx = PollContext::new();
        ctx.cancel();

        let err = poller.poll(&ctx).await.unwrap_err();

        assert!(matches!(err, PollError::Cancelled(CancelReason::Cancelled)));
        assert!(client.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn hung_query_abandoned_at_deadline() {
        let client = Arc::new(MockExtensionsClient::with_azure_monitor(&[Reply::Hang]));
        let poller = MonitoringPoller::enable_azure_monitor(client.clone(), cluster_id());
        let ctx = PollContext::new().with_timeout(Duration::from_secs(30));
        let start = Instant::now();

        let err = poller.poll(&ctx).await.unwrap_err();

        assert!(matches!(
            err,
            PollError::Cancelled(CancelReason::DeadlineExceeded)
        ));
        assert_eq!(start.elapsed(), Duration::from_secs(30));
        assert_eq!(client.count("get_azure_monitor_status"), 1);
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed() {
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[Reply::Undecodable]));
        let poller = MonitoringPoller::enable_monitoring(client, cluster_id());

        let err = poller.poll(&PollContext::new()).await.unwrap_err();

        assert!(!err.is_retryable());
        assert!(matches!(
            &err,
            PollError::MalformedResponse { field, .. } if field == "body"
        ));
    }

    #[test]
    fn operation_and_resource_names() {
        let client = Arc::new(MockExtensionsClient::default());
        let poller = MonitoringPoller::disable_azure_monitor(client.clone(), cluster_id());
        assert_eq!(poller.operation(), "disable Azure Monitor");
        assert_eq!(poller.resource(), cluster_id().to_string());

        let poller = MonitoringPoller::enable_monitoring(client, cluster_id());
        assert_eq!(poller.operation(), "enable Monitoring");
        assert_eq!(poller.target(), MonitoringTarget::Enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_waits_ten_seconds_until_disabled() {
        init_logger();
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[
            Reply::Flag(true),
            Reply::Flag(true),
            Reply::Flag(false),
        ]));
        let poller = Poller::new(
            MonitoringPoller::disable_monitoring(client.clone(), cluster_id()),
            Duration::from_secs(10),
            3,
        );
        let start = Instant::now();

        poller.poll_until_done(&PollContext::new()).await.unwrap();

        assert_eq!(client.count("get_monitoring_status"), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn driver_handles_inverted_polarity_identically() {
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[
            Reply::Flag(false),
            Reply::Flag(false),
            Reply::Flag(true),
        ]));
        let poller = Poller::new(
            MonitoringPoller::enable_monitoring(client.clone(), cluster_id()),
            Duration::from_secs(10),
            3,
        );
        let start = Instant::now();

        poller.poll_until_done(&PollContext::new()).await.unwrap();

        assert_eq!(client.count("get_monitoring_status"), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn driver_fails_fast_on_missing_flag() {
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[Reply::NoFlag]));
        let poller = Poller::new(
            MonitoringPoller::disable_monitoring(client.clone(), cluster_id()),
            Duration::from_secs(10),
            3,
        );

        let err = poller.poll_until_done(&PollContext::new()).await.unwrap_err();

        assert_eq!(err.kind(), PollerErrorKind::MalformedResponse);
        assert_eq!(client.count("get_monitoring_status"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_fails_fast_on_undecodable_body() {
        let client = Arc::new(MockExtensionsClient::with_monitoring(&[Reply::Undecodable]));
        let poller = Poller::new(
            MonitoringPoller::disable_monitoring(client.clone(), cluster_id()),
            Duration::from_secs(10),
            3,
        );

        let err = poller.poll_until_done(&PollContext::new()).await.unwrap_err();

        assert_eq!(err.kind(), PollerErrorKind::MalformedResponse);
        assert_eq!(client.count("get_monitoring_status"), 1);
    }
}
