//! HDInsight cluster resource identifier

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static CLUSTER_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^/subscriptions/([^/]+)/resourceGroups/([^/]+)/providers/Microsoft\.HDInsight/clusters/([^/]+)/?$",
    )
    .expect("cluster id pattern is valid")
});

/// Error parsing a cluster resource id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parsing {input:?} as an HDInsight Cluster ID: expected /subscriptions/{{subscriptionId}}/resourceGroups/{{resourceGroupName}}/providers/Microsoft.HDInsight/clusters/{{clusterName}}")]
pub struct ParseClusterIdError {
    pub input: String,
}

/// Identifies an HDInsight cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterId {
    pub subscription_id: String,
    pub resource_group: String,
    pub cluster_name: String,
}

impl ClusterId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        cluster_name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            cluster_name: cluster_name.into(),
        }
    }

    /// Parse an ARM resource id; segment names match case-insensitively
    pub fn parse(input: &str) -> Result<Self, ParseClusterIdError> {
        let captures = CLUSTER_ID_PATTERN
            .captures(input)
            .ok_or_else(|| ParseClusterIdError {
                input: input.to_string(),
            })?;

        Ok(Self::new(&captures[1], &captures[2], &captures[3]))
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.HDInsight/clusters/{}",
            self.subscription_id, self.resource_group, self.cluster_name
        )
    }
}

impl FromStr for ClusterId {
    type Err = ParseClusterIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
