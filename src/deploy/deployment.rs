// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: Holds the operator's request alongside the state-specific data.

use crate::types::{ImageRef, ServiceArn, TaskDefinition, TaskDefinitionArn};

use super::resolver::{DeployFlags, Plan};
use super::state::{DefinitionResolved, Init, ServiceLocated, UpdateConfirmed};
use super::waiter::WaitPolicy;

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub cluster: String,
    pub service: String,
    pub image: ImageRef,
    pub flags: DeployFlags,
    /// Wait for the rollout when set.
    pub wait: Option<WaitPolicy>,
}

/// A deployment in progress, parameterized by its current state.
///
/// The state type parameter `S` carries what earlier steps produced, so a
/// step can only be called once its inputs exist:
///
/// ```compile_fail
/// use ecs_pipeline_deploy::deploy::{DeployRequest, Deployment, Init};
/// use ecs_pipeline_deploy::ecs::OrchestrationApi;
///
/// async fn skip_resolution<A: OrchestrationApi>(api: &A, request: DeployRequest) {
///     let deployment: Deployment<Init> = Deployment::new(request);
///     // update_service() only exists once the definition is resolved
///     let _ = deployment.update_service(api).await;
/// }
/// ```
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) request: DeployRequest,
    pub(crate) state: S,
}

impl Deployment<Init> {
    pub fn new(request: DeployRequest) -> Self {
        Deployment {
            request,
            state: Init,
        }
    }
}

impl Deployment<ServiceLocated> {
    pub fn service_arn(&self) -> &ServiceArn {
        &self.state.service
    }
}

impl Deployment<DefinitionResolved> {
    pub fn plan(&self) -> &Plan {
        &self.state.plan
    }

    /// The definition the service was running when the deployment started.
    pub fn current_definition(&self) -> &TaskDefinition {
        &self.state.current
    }
}

impl Deployment<UpdateConfirmed> {
    pub fn task_definition(&self) -> &TaskDefinitionArn {
        &self.state.task_definition
    }
}
