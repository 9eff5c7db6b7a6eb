// ABOUTME: Orchestration API collaborator for ECS clusters.
// ABOUTME: Capability traits plus the aws-sdk-ecs backed implementation.

mod client;
mod error;
mod traits;

pub use client::EcsClient;
pub use error::ApiError;
pub use traits::{
    DESCRIBE_TASKS_BATCH, OrchestrationApi, RunningTask, ServiceDescription, ServiceOps,
    TaskDefinitionOps, TaskOps,
};
