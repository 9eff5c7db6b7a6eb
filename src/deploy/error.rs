// ABOUTME: Error types for deployment operations.
// ABOUTME: Covers service lookup, image matching, update confirmation, and rollout timeouts.

use std::time::Duration;

use crate::ecs::ApiError;
use crate::types::TaskDefinitionArn;

/// Errors that can occur while driving a deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// No service in the cluster matched the requested name.
    #[error("service {service} not found in {cluster}")]
    ServiceNotFound { service: String, cluster: String },

    /// The cluster does not exist.
    #[error("cluster not found: {0}")]
    ClusterNotFound(String),

    /// No container in the task definition runs the requested repository.
    #[error("did not find the image {0} in the task definition")]
    ImageNotFound(String),

    /// The API accepted the update but reports a different active definition.
    #[error(
        "update of {service} not confirmed: requested {}, service reports {}",
        .requested.short_name(),
        .actual.short_name()
    )]
    UpdateNotConfirmed {
        service: String,
        requested: TaskDefinitionArn,
        actual: TaskDefinitionArn,
    },

    /// The rollout did not converge before the configured deadline.
    #[error(
        "timed out after {} waiting for tasks running {}",
        format_wait(.waited),
        .target.short_name()
    )]
    Timeout {
        waited: Duration,
        target: TaskDefinitionArn,
    },

    /// Any other orchestration API failure.
    #[error("orchestration API error: {0}")]
    Api(ApiError),
}

fn format_wait(waited: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*waited)
}

impl DeployError {
    /// Map an API error, attaching the cluster to lookup failures.
    pub fn from_api(err: ApiError, cluster: &str) -> Self {
        match err {
            ApiError::ClusterNotFound { cluster } => DeployError::ClusterNotFound(cluster),
            ApiError::ServiceNotFound { service } => DeployError::ServiceNotFound {
                service,
                cluster: cluster.to_string(),
            },
            other => DeployError::Api(other),
        }
    }
}

impl From<ApiError> for DeployError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::ClusterNotFound { cluster } => DeployError::ClusterNotFound(cluster),
            other => DeployError::Api(other),
        }
    }
}
