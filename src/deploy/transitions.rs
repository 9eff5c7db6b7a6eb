// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use serde::Serialize;

use crate::ecs::{OrchestrationApi, ServiceOps, TaskDefinitionOps, TaskOps};
use crate::error::{EXIT_ALREADY_DEPLOYED, EXIT_SUCCESS};
use crate::output::Output;
use crate::types::{ServiceArn, TaskDefinitionArn};

use super::error::DeployError;
use super::registrar;
use super::resolver::{self, Plan};
use super::state::{DefinitionResolved, Done, Init, ServiceLocated, UpdateConfirmed};
use super::transform;
use super::waiter::{Clock, RolloutWaiter, WaitPolicy, WaitReport};
use super::{DeployRequest, Deployment};

/// The image is already deployed and neither force nor redeploy was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlreadyDeployed {
    pub image: String,
    pub cluster: String,
    pub task_definition: TaskDefinitionArn,
}

impl std::fmt::Display for AlreadyDeployed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is already deployed to {} as \"{}\"",
            self.image,
            self.cluster,
            self.task_definition.short_name()
        )
    }
}

/// Result of resolving the target task definition.
#[derive(Debug)]
pub enum Resolution {
    /// Continue with the service update.
    Proceed(Deployment<DefinitionResolved>),
    /// Nothing to do.
    AlreadyDeployed(AlreadyDeployed),
}

/// Summary of a finished deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploySummary {
    pub cluster: String,
    pub service: ServiceArn,
    pub task_definition: TaskDefinitionArn,
    /// A new revision was registered.
    pub registered: bool,
    /// Tasks already running the image were replaced.
    pub redeploy: bool,
    pub wait: Option<WaitReport>,
}

/// Find the service named `name` among `arns`.
///
/// An exact match on the final ARN segment wins. Otherwise the first ARN, in
/// sorted order, whose service name starts with `<cluster>-<name>` is used.
pub fn match_service<'a>(arns: &'a [ServiceArn], cluster: &str, name: &str) -> Option<&'a ServiceArn> {
    if let Some(exact) = arns.iter().find(|arn| arn.service_name() == name) {
        return Some(exact);
    }

    let prefix = format!("{}-{}", cluster, name);
    let mut candidates: Vec<&ServiceArn> = arns
        .iter()
        .filter(|arn| arn.service_name().starts_with(&prefix))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

// =============================================================================
// Internal Helpers
// =============================================================================

impl<S> Deployment<S> {
    /// Internal helper to transition to a new state.
    fn transition<T>(self, state: T) -> Deployment<T> {
        Deployment {
            request: self.request,
            state,
        }
    }
}

fn describe_verb(redeploy: bool) -> (&'static str, &'static str) {
    if redeploy {
        ("Redeploying", "Redeployed")
    } else {
        ("Updating", "Updated")
    }
}

// =============================================================================
// Transitions
// =============================================================================

impl Deployment<Init> {
    /// Resolve the service ARN within the cluster.
    pub async fn locate_service<A: ServiceOps + ?Sized>(
        self,
        api: &A,
    ) -> Result<Deployment<ServiceLocated>, DeployError> {
        let cluster = self.request.cluster.as_str();
        let arns = api
            .list_services(cluster)
            .await
            .map_err(|e| DeployError::from_api(e, cluster))?;

        let service = match_service(&arns, cluster, &self.request.service)
            .cloned()
            .ok_or_else(|| DeployError::ServiceNotFound {
                service: self.request.service.clone(),
                cluster: cluster.to_string(),
            })?;

        tracing::debug!("Matched service {}", service);
        Ok(self.transition(ServiceLocated { service }))
    }
}

impl Deployment<ServiceLocated> {
    /// Fetch the service and its active definition and decide what to deploy.
    pub async fn resolve_definition<A: ServiceOps + TaskDefinitionOps + ?Sized>(
        self,
        api: &A,
    ) -> Result<Resolution, DeployError> {
        let cluster = self.request.cluster.as_str();
        tracing::info!(
            "Getting the current task definition for {} in {}",
            self.request.service,
            cluster
        );

        let service = api
            .describe_service(cluster, &self.state.service)
            .await
            .map_err(|e| DeployError::from_api(e, cluster))?;
        let current = api
            .describe_task_definition(&service.task_definition)
            .await
            .map_err(|e| DeployError::from_api(e, cluster))?;

        let containers = current.container_images();
        let decision = resolver::resolve(
            &service.task_definition,
            &containers,
            &self.request.image,
            self.request.flags,
        );
        tracing::debug!("Resolved {:?} for {}", decision, self.request.image);

        let Some(plan) = decision.into_plan() else {
            return Ok(Resolution::AlreadyDeployed(AlreadyDeployed {
                image: self.request.image.to_string(),
                cluster: cluster.to_string(),
                task_definition: service.task_definition,
            }));
        };

        Ok(Resolution::Proceed(self.transition(DefinitionResolved {
            service,
            current,
            containers,
            plan,
        })))
    }
}

impl Deployment<DefinitionResolved> {
    /// Register a definition if the decision calls for one, then point the
    /// service at it and confirm the API echoes it back.
    pub async fn update_service<A: OrchestrationApi + ?Sized>(
        self,
        api: &A,
    ) -> Result<Deployment<UpdateConfirmed>, DeployError> {
        let cluster = self.request.cluster.clone();
        let redeploy = self.state.plan.is_redeploy();

        let (task_definition, registered) = match &self.state.plan {
            Plan::Reuse(current) => (current.clone(), false),
            Plan::RegisterModified => (registrar::register(api, &self.state.current).await?, true),
            Plan::RegisterNew => {
                let modified = transform::apply(
                    &self.state.current,
                    &self.state.containers,
                    &self.request.image,
                )?;
                (registrar::register(api, &modified).await?, true)
            }
        };

        let (verb, past) = describe_verb(redeploy);
        tracing::info!(
            "{} {} in {} to {}",
            verb,
            self.request.service,
            cluster,
            task_definition.short_name()
        );

        let active = api
            .update_service(
                &cluster,
                &self.state.service.arn,
                &task_definition,
                self.request.flags.redeploy,
            )
            .await
            .map_err(|e| DeployError::from_api(e, &cluster))?;

        if active != task_definition {
            return Err(DeployError::UpdateNotConfirmed {
                service: self.request.service.clone(),
                requested: task_definition,
                actual: active,
            });
        }

        tracing::info!(
            "{} {} in {} to {}",
            past,
            self.request.service,
            cluster,
            task_definition.short_name()
        );

        let service = self.state.service.clone();
        Ok(self.transition(UpdateConfirmed {
            service,
            task_definition,
            registered,
            redeploy,
        }))
    }
}

impl Deployment<UpdateConfirmed> {
    /// Wait until the desired number of tasks run the new definition.
    pub async fn wait_for_rollout<A: TaskOps + ?Sized, C: Clock + ?Sized>(
        self,
        api: &A,
        clock: &C,
        policy: &WaitPolicy,
    ) -> Result<Deployment<Done>, DeployError> {
        let desired = self.state.service.desired_count;
        tracing::info!(
            "Waiting for {} tasks to enter running state for \"{}\"",
            desired,
            self.state.task_definition.short_name()
        );

        let waiter = RolloutWaiter::new(
            api,
            clock,
            &self.request.cluster,
            &self.state.service.arn,
        );
        let report = waiter
            .wait(&self.state.task_definition, desired, policy)
            .await?;

        tracing::debug!("Rollout converged after {} polls", report.polls);
        let confirmed = self.state.clone();
        Ok(self.transition(Done {
            confirmed,
            wait: Some(report),
        }))
    }

    /// Finish without waiting for the rollout.
    pub fn finish(self) -> Deployment<Done> {
        let confirmed = self.state.clone();
        self.transition(Done {
            confirmed,
            wait: None,
        })
    }
}

impl Deployment<Done> {
    pub fn summary(&self) -> DeploySummary {
        let confirmed = &self.state.confirmed;
        DeploySummary {
            cluster: self.request.cluster.clone(),
            service: confirmed.service.arn.clone(),
            task_definition: confirmed.task_definition.clone(),
            registered: confirmed.registered,
            redeploy: confirmed.redeploy,
            wait: self.state.wait,
        }
    }
}

// =============================================================================
// Driver
// =============================================================================

/// How a deployment ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Deployed(DeploySummary),
    AlreadyDeployed(AlreadyDeployed),
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Deployed(_) => EXIT_SUCCESS,
            Outcome::AlreadyDeployed(_) => EXIT_ALREADY_DEPLOYED,
        }
    }
}

/// Run a deployment from service lookup to completion, reporting each step.
pub async fn execute<A, C>(
    api: &A,
    clock: &C,
    request: DeployRequest,
    output: &Output,
) -> Result<Outcome, DeployError>
where
    A: OrchestrationApi + ?Sized,
    C: Clock + ?Sized,
{
    let wait = request.wait.clone();

    output.progress(&format!(
        "  → Looking up {} in {}...",
        request.service, request.cluster
    ));
    let located = Deployment::new(request).locate_service(api).await?;

    output.progress("  → Resolving task definition...");
    let resolved = match located.resolve_definition(api).await? {
        Resolution::Proceed(deployment) => deployment,
        Resolution::AlreadyDeployed(conflict) => {
            tracing::info!("{}", conflict);
            return Ok(Outcome::AlreadyDeployed(conflict));
        }
    };

    output.progress("  → Updating service...");
    let confirmed = resolved.update_service(api).await?;
    let redeploy = confirmed.state.redeploy;

    let done = match wait {
        Some(policy) => {
            output.progress(&format!(
                "  → Waiting for tasks to run {}...",
                confirmed.task_definition().short_name()
            ));
            confirmed.wait_for_rollout(api, clock, &policy).await?
        }
        None => confirmed.finish(),
    };

    tracing::info!(
        "{} complete",
        if redeploy { "Redeployment" } else { "Deployment" }
    );
    Ok(Outcome::Deployed(done.summary()))
}
