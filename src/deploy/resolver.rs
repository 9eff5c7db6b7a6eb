// ABOUTME: Decides how a deployment obtains its target task definition.
// ABOUTME: Reuse, register a fresh revision, register a modified one, or report a conflict.

use crate::types::{ContainerImage, ImageRef, TaskDefinitionArn};

/// Operator flags that influence resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployFlags {
    /// Register a new revision even when the image is already deployed.
    pub force: bool,
    /// Redeploy the current definition when the image is already deployed.
    pub redeploy: bool,
}

/// Outcome of resolving the target task definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Deploy the current definition again.
    Reuse(TaskDefinitionArn),
    /// The image is already deployed and nothing was requested.
    Conflict,
    /// Re-register the current definition unchanged to mint a new revision.
    RegisterModified,
    /// Rewrite the matching container and register the result.
    RegisterNew,
}

impl Decision {
    /// The work to carry out, or `None` for a conflict.
    pub fn into_plan(self) -> Option<Plan> {
        match self {
            Decision::Reuse(arn) => Some(Plan::Reuse(arn)),
            Decision::RegisterModified => Some(Plan::RegisterModified),
            Decision::RegisterNew => Some(Plan::RegisterNew),
            Decision::Conflict => None,
        }
    }
}

/// A decision that deploys something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Reuse(TaskDefinitionArn),
    RegisterModified,
    RegisterNew,
}

impl Plan {
    /// True when the deployment replaces tasks that already run the image.
    pub fn is_redeploy(&self) -> bool {
        matches!(self, Plan::Reuse(_) | Plan::RegisterModified)
    }
}

/// Resolve the decision for deploying `target` over the current definition.
///
/// Presence compares the full reference, so the same repository with a
/// different tag is not present and always registers a new definition.
/// `redeploy` takes precedence over `force`.
pub fn resolve(
    current: &TaskDefinitionArn,
    containers: &[ContainerImage],
    target: &ImageRef,
    flags: DeployFlags,
) -> Decision {
    let present = containers.iter().any(|c| &c.image == target);
    match (present, flags.redeploy, flags.force) {
        (false, _, _) => Decision::RegisterNew,
        (true, true, _) => Decision::Reuse(current.clone()),
        (true, false, true) => Decision::RegisterModified,
        (true, false, false) => Decision::Conflict,
    }
}
