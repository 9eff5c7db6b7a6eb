// ABOUTME: Composable capability traits for the container orchestration API.
// ABOUTME: Defines ServiceOps, TaskDefinitionOps, TaskOps and the OrchestrationApi umbrella.

use async_trait::async_trait;

use super::error::ApiError;
use crate::types::{RegistrationRequest, ServiceArn, TaskArn, TaskDefinition, TaskDefinitionArn};

/// Maximum number of tasks a single describe call accepts.
pub const DESCRIBE_TASKS_BATCH: usize = 100;

/// Current state of a service as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    pub arn: ServiceArn,
    pub desired_count: u32,
    pub task_definition: TaskDefinitionArn,
}

/// A running task and the definition it executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningTask {
    pub arn: TaskArn,
    pub task_definition: TaskDefinitionArn,
}

/// Service lookup and update.
#[async_trait]
pub trait ServiceOps: Send + Sync {
    /// List every service ARN in the cluster, across all pages.
    async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceArn>, ApiError>;

    /// Describe a single service.
    async fn describe_service(
        &self,
        cluster: &str,
        service: &ServiceArn,
    ) -> Result<ServiceDescription, ApiError>;

    /// Point the service at a task definition, returning the definition the
    /// API reports as active after the call.
    async fn update_service(
        &self,
        cluster: &str,
        service: &ServiceArn,
        task_definition: &TaskDefinitionArn,
        force_new_deployment: bool,
    ) -> Result<TaskDefinitionArn, ApiError>;
}

/// Task definition lookup and registration.
#[async_trait]
pub trait TaskDefinitionOps: Send + Sync {
    /// Fetch a registered task definition.
    async fn describe_task_definition(
        &self,
        arn: &TaskDefinitionArn,
    ) -> Result<TaskDefinition, ApiError>;

    /// Register a new revision, returning its ARN.
    async fn register_task_definition(
        &self,
        request: &RegistrationRequest,
    ) -> Result<TaskDefinitionArn, ApiError>;
}

/// Running task observation.
#[async_trait]
pub trait TaskOps: Send + Sync {
    /// List ARNs of the service's tasks whose desired status is RUNNING.
    async fn list_running_tasks(
        &self,
        cluster: &str,
        service: &ServiceArn,
    ) -> Result<Vec<TaskArn>, ApiError>;

    /// Describe up to [`DESCRIBE_TASKS_BATCH`] tasks.
    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[TaskArn],
    ) -> Result<Vec<RunningTask>, ApiError>;
}

/// Everything a deployment needs from the orchestration API.
pub trait OrchestrationApi: ServiceOps + TaskDefinitionOps + TaskOps {}

impl<T: ServiceOps + TaskDefinitionOps + TaskOps> OrchestrationApi for T {}
