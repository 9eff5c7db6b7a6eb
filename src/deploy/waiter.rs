// ABOUTME: Polls running tasks until a rollout converges on the target definition.
// ABOUTME: Sleep and time come from an injected Clock so tests need no real delay.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use crate::ecs::{ApiError, DESCRIBE_TASKS_BATCH, RunningTask, TaskOps};
use crate::types::{ServiceArn, TaskDefinitionArn};

use super::DeployError;

/// Default pause between polls.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

/// How to wait for a rollout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Pause between polls.
    pub delay: Duration,
    /// Also require that no task runs any other definition.
    pub require_all_new: bool,
    /// Give up after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            require_all_new: false,
            timeout: None,
        }
    }
}

/// Source of time for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Running tasks grouped by task definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCounts {
    counts: BTreeMap<TaskDefinitionArn, usize>,
    total: usize,
}

impl TaskCounts {
    pub fn from_tasks(tasks: &[RunningTask]) -> Self {
        tasks
            .iter()
            .map(|task| task.task_definition.clone())
            .collect()
    }

    pub fn count(&self, task_definition: &TaskDefinitionArn) -> usize {
        self.counts.get(task_definition).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// True once `desired` tasks run `target`, and, when `require_all_new`
    /// is set, no task runs anything else.
    pub fn is_converged(
        &self,
        target: &TaskDefinitionArn,
        desired: u32,
        require_all_new: bool,
    ) -> bool {
        let desired = desired as usize;
        self.count(target) == desired && (!require_all_new || self.total == desired)
    }
}

impl FromIterator<TaskDefinitionArn> for TaskCounts {
    fn from_iter<I: IntoIterator<Item = TaskDefinitionArn>>(iter: I) -> Self {
        let mut counts = TaskCounts::default();
        for task_definition in iter {
            *counts.counts.entry(task_definition).or_insert(0) += 1;
            counts.total += 1;
        }
        counts
    }
}

impl fmt::Display for TaskCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by_key(|(arn, _)| (arn.revision(), arn.as_str().to_string()));

        let rendered: Vec<String> = entries
            .iter()
            .map(|(arn, count)| format!("{}: {}", arn.short_name(), count))
            .collect();
        if rendered.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", rendered.join(", "))
        }
    }
}

/// Result of a converged wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WaitReport {
    /// Number of observations taken, including the converged one.
    pub polls: usize,
    /// Time between the first poll and convergence.
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

/// Every running task of the service together with its task definition.
///
/// Descriptions are fetched in batches of [`DESCRIBE_TASKS_BATCH`], issued
/// concurrently.
pub async fn running_tasks<A: TaskOps + ?Sized>(
    api: &A,
    cluster: &str,
    service: &ServiceArn,
) -> Result<Vec<RunningTask>, ApiError> {
    let arns = api.list_running_tasks(cluster, service).await?;
    for arn in &arns {
        tracing::debug!("Task found: {}", arn);
    }

    let batches = arns
        .chunks(DESCRIBE_TASKS_BATCH)
        .map(|batch| api.describe_tasks(cluster, batch));
    let described = futures::future::try_join_all(batches).await?;

    Ok(described.into_iter().flatten().collect())
}

/// Polls a service until its tasks converge on a task definition.
pub struct RolloutWaiter<'a, A: ?Sized, C: ?Sized> {
    api: &'a A,
    clock: &'a C,
    cluster: &'a str,
    service: &'a ServiceArn,
}

impl<'a, A, C> RolloutWaiter<'a, A, C>
where
    A: TaskOps + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(api: &'a A, clock: &'a C, cluster: &'a str, service: &'a ServiceArn) -> Self {
        Self {
            api,
            clock,
            cluster,
            service,
        }
    }

    /// Block until `desired` tasks run `target`.
    ///
    /// Sleeps for the policy delay between polls. Without a timeout the loop
    /// only ends on convergence, an API error, or when the future is dropped.
    pub async fn wait(
        &self,
        target: &TaskDefinitionArn,
        desired: u32,
        policy: &WaitPolicy,
    ) -> Result<WaitReport, DeployError> {
        let start = self.clock.now();
        let mut polls = 0;

        loop {
            let tasks = running_tasks(self.api, self.cluster, self.service)
                .await
                .map_err(|e| DeployError::from_api(e, self.cluster))?;
            polls += 1;

            let counts = TaskCounts::from_tasks(&tasks);
            tracing::debug!("Current running tasks by definition: {}", counts);

            let elapsed = self.clock.now().saturating_duration_since(start);
            if counts.is_converged(target, desired, policy.require_all_new) {
                return Ok(WaitReport { polls, elapsed });
            }

            if let Some(timeout) = policy.timeout
                && elapsed >= timeout
            {
                return Err(DeployError::Timeout {
                    waited: elapsed,
                    target: target.clone(),
                });
            }

            self.clock.sleep(policy.delay).await;
        }
    }
}
