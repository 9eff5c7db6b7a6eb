// ABOUTME: Orchestration API error types with SNAFU pattern.
// ABOUTME: Classifies ECS failures so the deployment layer can map them.

use snafu::Snafu;

/// Errors surfaced by the orchestration API collaborator.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApiError {
    #[snafu(display("cluster not found: {cluster}"))]
    ClusterNotFound { cluster: String },

    #[snafu(display("service not found: {service}"))]
    ServiceNotFound { service: String },

    #[snafu(display("{operation} failed: {message}"))]
    Request {
        operation: &'static str,
        message: String,
    },

    #[snafu(display("{operation} response is missing {field}"))]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
}
