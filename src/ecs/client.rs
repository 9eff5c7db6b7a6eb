// ABOUTME: aws-sdk-ecs backed implementation of the orchestration API traits.
// ABOUTME: Handles region/profile loading, pagination, and SDK error mapping.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_ecs::Client;
use aws_sdk_ecs::config::Region;
use aws_sdk_ecs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ecs::types::DesiredStatus;

use super::error::{
    ApiError, ClusterNotFoundSnafu, MissingFieldSnafu, RequestSnafu, ServiceNotFoundSnafu,
};
use super::traits::{RunningTask, ServiceDescription, ServiceOps, TaskDefinitionOps, TaskOps};
use crate::types::{RegistrationRequest, ServiceArn, TaskArn, TaskDefinition, TaskDefinitionArn};

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_sdk_error<E, R>(
    operation: &'static str,
    cluster: &str,
    service: Option<&str>,
    err: SdkError<E, R>,
) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.as_service_error().and_then(|e| e.code());
    match (code, service) {
        (Some("ClusterNotFoundException"), _) => ClusterNotFoundSnafu { cluster }.build(),
        (Some("ServiceNotFoundException" | "ServiceNotActiveException"), Some(service)) => {
            ServiceNotFoundSnafu { service }.build()
        }
        _ => RequestSnafu {
            operation,
            message: DisplayErrorContext(&err).to_string(),
        }
        .build(),
    }
}

// =============================================================================
// Client
// =============================================================================

/// Orchestration API backed by the ECS service.
#[derive(Debug, Clone)]
pub struct EcsClient {
    client: Client,
}

impl EcsClient {
    /// Build a client from the default credential chain.
    ///
    /// `region` and `profile` override the environment when given.
    pub async fn connect(region: Option<&str>, profile: Option<&str>) -> Self {
        let region_provider =
            RegionProviderChain::first_try(region.map(|r| Region::new(r.to_string())))
                .or_default_provider();
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }

        let config = loader.load().await;
        Self {
            client: Client::new(&config),
        }
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServiceOps for EcsClient {
    async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceArn>, ApiError> {
        tracing::info!("Getting services in the {} cluster", cluster);
        let mut pages = self
            .client
            .list_services()
            .cluster(cluster)
            .into_paginator()
            .items()
            .send();

        let mut arns = Vec::new();
        while let Some(item) = pages.next().await {
            let arn = item.map_err(|e| map_sdk_error("ListServices", cluster, None, e))?;
            tracing::debug!("Service found: {}", arn);
            arns.push(ServiceArn::new(arn));
        }
        Ok(arns)
    }

    async fn describe_service(
        &self,
        cluster: &str,
        service: &ServiceArn,
    ) -> Result<ServiceDescription, ApiError> {
        let output = self
            .client
            .describe_services()
            .cluster(cluster)
            .services(service.as_str())
            .send()
            .await
            .map_err(|e| map_sdk_error("DescribeServices", cluster, Some(service.as_str()), e))?;

        let record = output
            .services
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| {
                ServiceNotFoundSnafu {
                    service: service.as_str(),
                }
                .build()
            })?;

        let task_definition = record.task_definition.ok_or_else(|| {
            MissingFieldSnafu {
                operation: "DescribeServices",
                field: "taskDefinition",
            }
            .build()
        })?;

        Ok(ServiceDescription {
            arn: record
                .service_arn
                .map(ServiceArn::new)
                .unwrap_or_else(|| service.clone()),
            desired_count: u32::try_from(record.desired_count).unwrap_or(0),
            task_definition: TaskDefinitionArn::new(task_definition),
        })
    }

    async fn update_service(
        &self,
        cluster: &str,
        service: &ServiceArn,
        task_definition: &TaskDefinitionArn,
        force_new_deployment: bool,
    ) -> Result<TaskDefinitionArn, ApiError> {
        let output = self
            .client
            .update_service()
            .cluster(cluster)
            .service(service.as_str())
            .task_definition(task_definition.as_str())
            .force_new_deployment(force_new_deployment)
            .send()
            .await
            .map_err(|e| map_sdk_error("UpdateService", cluster, Some(service.as_str()), e))?;

        output
            .service
            .and_then(|s| s.task_definition)
            .map(TaskDefinitionArn::new)
            .ok_or_else(|| {
                MissingFieldSnafu {
                    operation: "UpdateService",
                    field: "service.taskDefinition",
                }
                .build()
            })
    }
}

#[async_trait]
impl TaskDefinitionOps for EcsClient {
    async fn describe_task_definition(
        &self,
        arn: &TaskDefinitionArn,
    ) -> Result<TaskDefinition, ApiError> {
        let output = self
            .client
            .describe_task_definition()
            .task_definition(arn.as_str())
            .send()
            .await
            .map_err(|e| map_sdk_error("DescribeTaskDefinition", "", None, e))?;

        output
            .task_definition
            .map(TaskDefinition::from_ecs)
            .ok_or_else(|| {
                MissingFieldSnafu {
                    operation: "DescribeTaskDefinition",
                    field: "taskDefinition",
                }
                .build()
            })
    }

    async fn register_task_definition(
        &self,
        request: &RegistrationRequest,
    ) -> Result<TaskDefinitionArn, ApiError> {
        let definition = request.as_ecs();
        let output = self
            .client
            .register_task_definition()
            .set_family(definition.family.clone())
            .set_task_role_arn(definition.task_role_arn.clone())
            .set_execution_role_arn(definition.execution_role_arn.clone())
            .set_network_mode(definition.network_mode.clone())
            .set_container_definitions(definition.container_definitions.clone())
            .set_volumes(definition.volumes.clone())
            .set_placement_constraints(definition.placement_constraints.clone())
            .set_cpu(definition.cpu.clone())
            .set_memory(definition.memory.clone())
            .set_pid_mode(definition.pid_mode.clone())
            .set_ipc_mode(definition.ipc_mode.clone())
            .set_proxy_configuration(definition.proxy_configuration.clone())
            .set_inference_accelerators(definition.inference_accelerators.clone())
            .set_ephemeral_storage(definition.ephemeral_storage.clone())
            .set_runtime_platform(definition.runtime_platform.clone())
            .set_enable_fault_injection(definition.enable_fault_injection)
            .send()
            .await
            .map_err(|e| map_sdk_error("RegisterTaskDefinition", "", None, e))?;

        output
            .task_definition
            .and_then(|td| td.task_definition_arn)
            .map(TaskDefinitionArn::new)
            .ok_or_else(|| {
                MissingFieldSnafu {
                    operation: "RegisterTaskDefinition",
                    field: "taskDefinition.taskDefinitionArn",
                }
                .build()
            })
    }
}

#[async_trait]
impl TaskOps for EcsClient {
    async fn list_running_tasks(
        &self,
        cluster: &str,
        service: &ServiceArn,
    ) -> Result<Vec<TaskArn>, ApiError> {
        let mut pages = self
            .client
            .list_tasks()
            .cluster(cluster)
            .service_name(service.service_name())
            .desired_status(DesiredStatus::Running)
            .into_paginator()
            .items()
            .send();

        let mut arns = Vec::new();
        while let Some(item) = pages.next().await {
            let arn =
                item.map_err(|e| map_sdk_error("ListTasks", cluster, Some(service.as_str()), e))?;
            arns.push(TaskArn::new(arn));
        }
        Ok(arns)
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[TaskArn],
    ) -> Result<Vec<RunningTask>, ApiError> {
        let output = self
            .client
            .describe_tasks()
            .cluster(cluster)
            .set_tasks(Some(tasks.iter().map(|t| t.to_string()).collect()))
            .send()
            .await
            .map_err(|e| map_sdk_error("DescribeTasks", cluster, None, e))?;

        for failure in output.failures.unwrap_or_default() {
            tracing::debug!(
                "Task {} not described: {}",
                failure.arn.as_deref().unwrap_or("unknown"),
                failure.reason.as_deref().unwrap_or("no reason given")
            );
        }

        Ok(output
            .tasks
            .unwrap_or_default()
            .into_iter()
            .filter_map(|task| {
                Some(RunningTask {
                    arn: TaskArn::new(task.task_arn?),
                    task_definition: TaskDefinitionArn::new(task.task_definition_arn?),
                })
            })
            .collect())
    }
}
