//! Scripted transport clients shared by the unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use nimbus_core::response::{ApiError, ApiResponse, RawResponse};

use crate::client::{ApiResult, ClustersClient, ExtensionsClient};
use crate::cluster_id::ClusterId;
use crate::models::{
    AzureMonitorRequest, AzureMonitorResponse, Cluster, ClusterMonitoringRequest,
    ClusterMonitoringResponse, ClusterProperties,
};

pub(crate) fn cluster_id() -> ClusterId {
    ClusterId::new("00000000-0000-0000-0000-000000000000", "analytics", "spark1")
}

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One scripted reply to a status query
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Flag(bool),
    NoModel,
    NoFlag,
    Error(u16),
    /// A body that does not decode into the model
    Undecodable,
    /// The query never completes
    Hang,
    State(&'static str),
}

/// Pops replies in order; the last one repeats forever
#[derive(Default)]
struct Script(Mutex<VecDeque<Reply>>);

impl Script {
    fn new(replies: &[Reply]) -> Self {
        Self(Mutex::new(replies.iter().cloned().collect()))
    }

    fn next(&self) -> Reply {
        let mut replies = self.0.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().expect("no scripted reply")
        }
    }
}

fn http() -> RawResponse {
    RawResponse::new(200).with_request_id("req-1")
}

fn undecodable() -> ApiError {
    ApiError::Decode("expected value at line 1 column 1".to_string())
}

async fn reply_with<T>(reply: Reply, model: impl FnOnce(Option<bool>) -> T) -> ApiResult<T> {
    match reply {
        Reply::Flag(enabled) => Ok(ApiResponse::new(Some(model(Some(enabled))), http())),
        Reply::NoFlag => Ok(ApiResponse::new(Some(model(None)), http())),
        Reply::NoModel => Ok(ApiResponse::new(None, http())),
        Reply::Error(status) => Err(ApiError::status(status, "scripted failure")),
        Reply::Undecodable => Err(undecodable()),
        Reply::Hang => std::future::pending().await,
        Reply::State(_) => panic!("cluster state reply used for an extension query"),
    }
}

#[derive(Default)]
pub(crate) struct MockExtensionsClient {
    monitoring: Script,
    azure_monitor: Script,
    fail_triggers: bool,
    /// Every call made, in order, e.g. `get_monitoring_status` or `enable_azure_monitor`
    pub calls: Mutex<Vec<String>>,
    pub monitoring_requests: Mutex<Vec<ClusterMonitoringRequest>>,
    pub azure_monitor_requests: Mutex<Vec<AzureMonitorRequest>>,
}

impl MockExtensionsClient {
    pub fn with_monitoring(replies: &[Reply]) -> Self {
        Self {
            monitoring: Script::new(replies),
            ..Default::default()
        }
    }

    pub fn with_azure_monitor(replies: &[Reply]) -> Self {
        Self {
            azure_monitor: Script::new(replies),
            ..Default::default()
        }
    }

    pub fn failing_triggers(mut self) -> Self {
        self.fail_triggers = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn trigger(&self, call: &str) -> ApiResult<()> {
        self.record(call);
        if self.fail_triggers {
            Err(ApiError::status(409, "conflict"))
        } else {
            Ok(ApiResponse::new(None, RawResponse::new(202)))
        }
    }
}

#[async_trait]
impl ExtensionsClient for MockExtensionsClient {
    async fn get_monitoring_status(&self, _id: &ClusterId) -> ApiResult<ClusterMonitoringResponse> {
        self.record("get_monitoring_status");
        reply_with(self.monitoring.next(), |enabled| ClusterMonitoringResponse {
            cluster_monitoring_enabled: enabled,
            workspace_id: Some("11111111-1111-1111-1111-111111111111".to_string()),
        })
        .await
    }

    async fn enable_monitoring(
        &self,
        _id: &ClusterId,
        request: &ClusterMonitoringRequest,
    ) -> ApiResult<()> {
        self.monitoring_requests.lock().unwrap().push(request.clone());
        self.trigger("enable_monitoring")
    }

    async fn disable_monitoring(&self, _id: &ClusterId) -> ApiResult<()> {
        self.trigger("disable_monitoring")
    }

    async fn get_azure_monitor_status(&self, _id: &ClusterId) -> ApiResult<AzureMonitorResponse> {
        self.record("get_azure_monitor_status");
        reply_with(self.azure_monitor.next(), |enabled| AzureMonitorResponse {
            cluster_monitoring_enabled: enabled,
            workspace_id: Some("22222222-2222-2222-2222-222222222222".to_string()),
        })
        .await
    }

    async fn enable_azure_monitor(
        &self,
        _id: &ClusterId,
        request: &AzureMonitorRequest,
    ) -> ApiResult<()> {
        self.azure_monitor_requests
            .lock()
            .unwrap()
            .push(request.clone());
        self.trigger("enable_azure_monitor")
    }

    async fn disable_azure_monitor(&self, _id: &ClusterId) -> ApiResult<()> {
        self.trigger("disable_azure_monitor")
    }
}

pub(crate) struct MockClustersClient {
    states: Script,
    pub gets: Mutex<usize>,
}

impl MockClustersClient {
    pub fn new(replies: &[Reply]) -> Self {
        Self {
            states: Script::new(replies),
            gets: Mutex::new(0),
        }
    }

    pub fn gets(&self) -> usize {
        *self.gets.lock().unwrap()
    }
}

#[async_trait]
impl ClustersClient for MockClustersClient {
    async fn get(&self, _id: &ClusterId) -> ApiResult<Cluster> {
        *self.gets.lock().unwrap() += 1;
        match self.states.next() {
            Reply::State(state) => Ok(ApiResponse::new(
                Some(Cluster {
                    properties: Some(ClusterProperties {
                        cluster_state: Some(state.to_string()),
                    }),
                }),
                http(),
            )),
            Reply::NoFlag => Ok(ApiResponse::new(
                Some(Cluster {
                    properties: Some(ClusterProperties::default()),
                }),
                http(),
            )),
            Reply::NoModel => Ok(ApiResponse::new(None, http())),
            Reply::Error(status) => Err(ApiError::status(status, "scripted failure")),
            Reply::Undecodable => Err(undecodable()),
            Reply::Hang => std::future::pending().await,
            Reply::Flag(_) => panic!("flag reply used for a cluster query"),
        }
    }
}
