// ABOUTME: Registers task definitions as new immutable revisions.
// ABOUTME: Strips server-assigned fields before the definition reaches the API.

use crate::ecs::{ApiError, TaskDefinitionOps};
use crate::types::{RegistrationRequest, TaskDefinition, TaskDefinitionArn};

/// Register `definition` as a new revision and return its ARN.
///
/// Every call creates a new revision, even for identical content.
pub async fn register<A: TaskDefinitionOps + ?Sized>(
    api: &A,
    definition: &TaskDefinition,
) -> Result<TaskDefinitionArn, ApiError> {
    let request = RegistrationRequest::from(definition);
    tracing::debug!(
        "Saving the new task definition for {}",
        request.family().unwrap_or("(no family)")
    );

    let arn = api.register_task_definition(&request).await?;
    tracing::info!("Registered task definition {}", arn.short_name());
    Ok(arn)
}
