// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports state markers, the resolver, registrar, transformer, and rollout waiter.

mod deployment;
mod error;
mod registrar;
mod resolver;
mod state;
mod transform;
mod transitions;
mod waiter;

pub use deployment::{DeployRequest, Deployment};
pub use error::DeployError;
pub use registrar::register;
pub use resolver::{Decision, DeployFlags, Plan, resolve};
pub use state::{DefinitionResolved, Done, Init, ServiceLocated, UpdateConfirmed};
pub use transform::apply as apply_image;
pub use transitions::{
    AlreadyDeployed, DeploySummary, Outcome, Resolution, execute, match_service,
};
pub use waiter::{
    Clock, DEFAULT_DELAY, RolloutWaiter, TaskCounts, TokioClock, WaitPolicy, WaitReport,
    running_tasks,
};
