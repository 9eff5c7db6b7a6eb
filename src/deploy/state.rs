// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: Each state carries the data gathered so far, so later steps cannot run early.

use crate::ecs::ServiceDescription;
use crate::types::{ContainerImage, ServiceArn, TaskDefinition, TaskDefinitionArn};

use super::resolver::Plan;
use super::waiter::WaitReport;

/// Initial state: nothing looked up yet.
/// Available actions: `locate_service()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Init;

/// Service located: the service ARN is known.
/// Available actions: `resolve_definition()`
#[derive(Debug, Clone)]
pub struct ServiceLocated {
    pub(crate) service: ServiceArn,
}

/// Definition resolved: the resolver decided how to obtain the target definition.
/// Available actions: `update_service()`
#[derive(Debug, Clone)]
pub struct DefinitionResolved {
    pub(crate) service: ServiceDescription,
    pub(crate) current: TaskDefinition,
    pub(crate) containers: Vec<ContainerImage>,
    pub(crate) plan: Plan,
}

/// Update confirmed: the service reports the target definition as active.
/// Available actions: `wait_for_rollout()`, `finish()`
#[derive(Debug, Clone)]
pub struct UpdateConfirmed {
    pub(crate) service: ServiceDescription,
    pub(crate) task_definition: TaskDefinitionArn,
    pub(crate) registered: bool,
    pub(crate) redeploy: bool,
}

/// Done: the deployment finished, optionally after the rollout converged.
/// Available actions: `summary()`
#[derive(Debug, Clone)]
pub struct Done {
    pub(crate) confirmed: UpdateConfirmed,
    pub(crate) wait: Option<WaitReport>,
}
