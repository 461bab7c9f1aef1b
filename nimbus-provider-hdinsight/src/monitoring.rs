//! Monitoring lifecycle for HDInsight clusters
//!
//! Enabling or disabling an extension is a long-running operation without a
//! status header: the request is fired, then the extension status is polled
//! until its flag flips. These functions pair the two steps and wrap failures
//! with the cluster they concern.

use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use nimbus_core::config::PollerConfig;
use nimbus_core::context::PollContext;
use nimbus_core::poller::Poller;
use nimbus_core::provider::{ProviderError, ProviderResult};
use thiserror::Error;
use uuid::Uuid;

use crate::client::ExtensionsClient;
use crate::cluster_id::ClusterId;
use crate::models::{
    AzureMonitorRequest, AzureMonitorResponse, ClusterMonitoringRequest,
    ClusterMonitoringResponse,
};
use crate::pollers::{MonitoringExtension, MonitoringPoller, MonitoringTarget};

/// The service never returns the primary key; reads report this placeholder
pub const MASKED_PRIMARY_KEY: &str = "*****";

/// Invalid monitor settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("log_analytics_workspace_id must be a UUID, got {0:?}")]
    InvalidWorkspaceId(String),

    #[error("primary_key must not be empty")]
    EmptyPrimaryKey,
}

// =============================================================================
// Settings
// =============================================================================

/// Log Analytics workspace a cluster reports to
///
/// Used for both the monitoring and the Azure Monitor extension.
#[derive(Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    log_analytics_workspace_id: String,
    primary_key: String,
}

impl MonitorSettings {
    pub fn new(
        log_analytics_workspace_id: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        let log_analytics_workspace_id = log_analytics_workspace_id.into();
        let primary_key = primary_key.into();

        if Uuid::parse_str(&log_analytics_workspace_id).is_err() {
            return Err(SettingsError::InvalidWorkspaceId(log_analytics_workspace_id));
        }
        if primary_key.trim().is_empty() {
            return Err(SettingsError::EmptyPrimaryKey);
        }

        Ok(Self {
            log_analytics_workspace_id,
            primary_key,
        })
    }

    /// Settings as read back from the service, with the key masked
    fn masked(log_analytics_workspace_id: String) -> Self {
        Self {
            log_analytics_workspace_id,
            primary_key: MASKED_PRIMARY_KEY.to_string(),
        }
    }

    pub fn log_analytics_workspace_id(&self) -> &str {
        &self.log_analytics_workspace_id
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn is_masked(&self) -> bool {
        self.primary_key == MASKED_PRIMARY_KEY
    }

    fn monitoring_request(&self) -> ClusterMonitoringRequest {
        ClusterMonitoringRequest {
            workspace_id: self.log_analytics_workspace_id.clone(),
            primary_key: self.primary_key.clone(),
        }
    }

    fn azure_monitor_request(&self) -> AzureMonitorRequest {
        AzureMonitorRequest {
            workspace_id: self.log_analytics_workspace_id.clone(),
            primary_key: self.primary_key.clone(),
        }
    }
}

impl fmt::Debug for MonitorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitorSettings")
            .field(
                "log_analytics_workspace_id",
                &self.log_analytics_workspace_id,
            )
            .field("primary_key", &MASKED_PRIMARY_KEY)
            .finish()
    }
}

// =============================================================================
// Flatten
// =============================================================================

fn flatten(enabled: Option<bool>, workspace_id: Option<&String>) -> Option<MonitorSettings> {
    if enabled == Some(true) {
        Some(MonitorSettings::masked(
            workspace_id.cloned().unwrap_or_default(),
        ))
    } else {
        None
    }
}

/// Current monitoring settings, `None` unless monitoring is enabled
pub fn flatten_monitoring(input: Option<&ClusterMonitoringResponse>) -> Option<MonitorSettings> {
    input.and_then(|r| flatten(r.cluster_monitoring_enabled, r.workspace_id.as_ref()))
}

/// Current Azure Monitor settings, `None` unless Azure Monitor is enabled
pub fn flatten_azure_monitor(input: Option<&AzureMonitorResponse>) -> Option<MonitorSettings> {
    input.and_then(|r| flatten(r.cluster_monitoring_enabled, r.workspace_id.as_ref()))
}

/// Read the monitoring extension of a cluster
pub async fn read_monitoring(
    client: &dyn ExtensionsClient,
    cluster_id: &ClusterId,
) -> ProviderResult<Option<MonitorSettings>> {
    let response = client.get_monitoring_status(cluster_id).await.map_err(|e| {
        ProviderError::new("retrieving the Monitoring")
            .for_resource(cluster_id.to_string())
            .with_cause(e)
    })?;
    Ok(flatten_monitoring(response.model.as_ref()))
}

/// Read the Azure Monitor extension of a cluster
pub async fn read_azure_monitor(
    client: &dyn ExtensionsClient,
    cluster_id: &ClusterId,
) -> ProviderResult<Option<MonitorSettings>> {
    let response = client
        .get_azure_monitor_status(cluster_id)
        .await
        .map_err(|e| {
            ProviderError::new("retrieving Azure Monitor")
                .for_resource(cluster_id.to_string())
                .with_cause(e)
        })?;
    Ok(flatten_azure_monitor(response.model.as_ref()))
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Enable cluster monitoring and wait until the service reports it enabled
pub async fn enable_monitoring(
    client: Arc<dyn ExtensionsClient>,
    cluster_id: &ClusterId,
    settings: &MonitorSettings,
    config: &PollerConfig,
    ctx: &PollContext,
) -> ProviderResult<()> {
    apply(
        client,
        cluster_id,
        MonitoringExtension::Monitoring,
        Some(settings),
        config,
        ctx,
    )
    .await
}

/// Disable cluster monitoring and wait until the service reports it disabled
pub async fn disable_monitoring(
    client: Arc<dyn ExtensionsClient>,
    cluster_id: &ClusterId,
    config: &PollerConfig,
    ctx: &PollContext,
) -> ProviderResult<()> {
    apply(
        client,
        cluster_id,
        MonitoringExtension::Monitoring,
        None,
        config,
        ctx,
    )
    .await
}

/// Enable Azure Monitor and wait until the service reports it enabled
pub async fn enable_azure_monitor(
    client: Arc<dyn ExtensionsClient>,
    cluster_id: &ClusterId,
    settings: &MonitorSettings,
    config: &PollerConfig,
    ctx: &PollContext,
) -> ProviderResult<()> {
    apply(
        client,
        cluster_id,
        MonitoringExtension::AzureMonitor,
        Some(settings),
        config,
        ctx,
    )
    .await
}

/// Disable Azure Monitor and wait until the service reports it disabled
pub async fn disable_azure_monitor(
    client: Arc<dyn ExtensionsClient>,
    cluster_id: &ClusterId,
    config: &PollerConfig,
    ctx: &PollContext,
) -> ProviderResult<()> {
    apply(
        client,
        cluster_id,
        MonitoringExtension::AzureMonitor,
        None,
        config,
        ctx,
    )
    .await
}

/// Bring cluster monitoring in line with the desired settings
///
/// `Some` enables (or re-enables with new settings), `None` disables.
pub async fn reconcile_monitoring(
    client: Arc<dyn ExtensionsClient>,
    cluster_id: &ClusterId,
    desired: Option<&MonitorSettings>,
    config: &PollerConfig,
    ctx: &PollContext,
) -> ProviderResult<()> {
    apply(
        client,
        cluster_id,
        MonitoringExtension::Monitoring,
        desired,
        config,
        ctx,
    )
    .await
}

/// Bring Azure Monitor in line with the desired settings
pub async fn reconcile_azure_monitor(
    client: Arc<dyn ExtensionsClient>,
    cluster_id: &ClusterId,
    desired: Option<&MonitorSettings>,
    config: &PollerConfig,
    ctx: &PollContext,
) -> ProviderResult<()> {
    apply(
        client,
        cluster_id,
        MonitoringExtension::AzureMonitor,
        desired,
        config,
        ctx,
    )
    .await
}

async fn apply(
    client: Arc<dyn ExtensionsClient>,
    cluster_id: &ClusterId,
    extension: MonitoringExtension,
    desired: Option<&MonitorSettings>,
    config: &PollerConfig,
    ctx: &PollContext,
) -> ProviderResult<()> {
    let target = match desired {
        Some(_) => MonitoringTarget::Enabled,
        None => MonitoringTarget::Disabled,
    };
    let action = match target {
        MonitoringTarget::Enabled => "enabling",
        MonitoringTarget::Disabled => "disabling",
    };

    debug!("{} {} for {}", action, extension.label(), cluster_id);

    let triggered = match (extension, desired) {
        (MonitoringExtension::Monitoring, Some(settings)) => {
            client
                .enable_monitoring(cluster_id, &settings.monitoring_request())
                .await
        }
        (MonitoringExtension::Monitoring, None) => client.disable_monitoring(cluster_id).await,
        (MonitoringExtension::AzureMonitor, Some(settings)) => {
            client
                .enable_azure_monitor(cluster_id, &settings.azure_monitor_request())
                .await
        }
        (MonitoringExtension::AzureMonitor, None) => {
            client.disable_azure_monitor(cluster_id).await
        }
    };
    triggered.map_err(|e| {
        ProviderError::new(format!("{} {}", action, extension.label()))
            .for_resource(cluster_id.to_string())
            .with_cause(e)
    })?;

    let poller = Poller::with_config(
        MonitoringPoller::new(client, cluster_id.clone(), extension, target),
        config,
    );
    poller.poll_until_done(ctx).await.map_err(|e| {
        ProviderError::new(format!(
            "polling to check if {} has been {}",
            extension.label(),
            target
        ))
        .for_resource(cluster_id.to_string())
        .with_cause(e)
    })?;

    info!("{} is now {} for {}", extension.label(), target, cluster_id);
    Ok(())
}
