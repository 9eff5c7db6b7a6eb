// ABOUTME: Test support utilities.
// ABOUTME: In-memory ECS fake, a manual clock, and task definition fixtures.

use std::collections::{HashMap, VecDeque};
use std::sync::Once;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use aws_sdk_ecs::primitives::DateTime;
use aws_sdk_ecs::types::{
    Compatibility, ContainerDefinition, LogConfiguration, LogDriver, TaskDefinition as EcsTaskDefinition,
    TaskDefinitionStatus,
};
use parking_lot::Mutex;

use ecs_pipeline_deploy::deploy::Clock;
use ecs_pipeline_deploy::ecs::{
    ApiError, RunningTask, ServiceDescription, ServiceOps, TaskDefinitionOps, TaskOps,
};
use ecs_pipeline_deploy::types::{
    RegistrationRequest, ServiceArn, TaskArn, TaskDefinition, TaskDefinitionArn,
};

pub const CLUSTER: &str = "prod";
const ACCOUNT_PREFIX: &str = "arn:aws:ecs:us-east-1:123456789012";

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("ecs_pipeline_deploy=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// =============================================================================
// Fixtures
// =============================================================================

#[allow(dead_code)]
pub fn service_arn(name: &str) -> ServiceArn {
    ServiceArn::new(format!("{ACCOUNT_PREFIX}:service/{CLUSTER}/{name}"))
}

#[allow(dead_code)]
pub fn definition_arn(family: &str, revision: u32) -> TaskDefinitionArn {
    TaskDefinitionArn::new(format!(
        "{ACCOUNT_PREFIX}:task-definition/{family}:{revision}"
    ))
}

#[allow(dead_code)]
pub fn container(name: &str, image: &str, log_tag: Option<&str>) -> ContainerDefinition {
    let mut builder = ContainerDefinition::builder().name(name).image(image);
    if let Some(tag) = log_tag {
        builder = builder.log_configuration(
            LogConfiguration::builder()
                .log_driver(LogDriver::Syslog)
                .options("tag", tag)
                .build()
                .unwrap(),
        );
    }
    builder.build()
}

/// A registered task definition carrying every server-assigned field.
#[allow(dead_code)]
pub fn registered_definition(
    family: &str,
    revision: u32,
    containers: Vec<ContainerDefinition>,
) -> TaskDefinition {
    TaskDefinition::from_ecs(
        EcsTaskDefinition::builder()
            .task_definition_arn(definition_arn(family, revision).into_inner())
            .family(family)
            .revision(revision as i32)
            .status(TaskDefinitionStatus::Active)
            .compatibilities(Compatibility::Ec2)
            .requires_compatibilities(Compatibility::Ec2)
            .registered_by("arn:aws:iam::123456789012:user/ci")
            .registered_at(DateTime::from_secs(1_700_000_000))
            .delete_requested_at(DateTime::from_secs(1_700_086_400))
            .cpu("256")
            .memory("512")
            .set_container_definitions(Some(containers))
            .build(),
    )
}

// =============================================================================
// Manual Clock
// =============================================================================

/// Clock whose time only moves when `sleep` is called.
#[allow(dead_code)]
pub struct FakeClock {
    start: Instant,
    offset: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock()
    }

    async fn sleep(&self, duration: Duration) {
        *self.offset.lock() += duration;
        self.sleeps.lock().push(duration);
    }
}

// =============================================================================
// In-memory ECS
// =============================================================================

/// A recorded `update_service` call.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub service: ServiceArn,
    pub task_definition: TaskDefinitionArn,
    pub force_new_deployment: bool,
}

/// In-memory orchestration API for a single cluster.
///
/// Running task observations are scripted: each `list_running_tasks` call
/// takes the next one, and the last one repeats.
#[allow(dead_code)]
pub struct FakeEcs {
    services: Vec<ServiceDescription>,
    definitions: HashMap<TaskDefinitionArn, TaskDefinition>,
    observations: Mutex<VecDeque<Vec<TaskDefinitionArn>>>,
    current_tasks: Mutex<HashMap<TaskArn, TaskDefinitionArn>>,
    registrations: Mutex<Vec<RegistrationRequest>>,
    updates: Mutex<Vec<UpdateCall>>,
    describe_batches: Mutex<Vec<usize>>,
    next_revision: Mutex<u32>,
    echo: Option<TaskDefinitionArn>,
    missing_cluster: bool,
}

#[allow(dead_code)]
impl FakeEcs {
    pub fn new() -> Self {
        Self {
            services: Vec::new(),
            definitions: HashMap::new(),
            observations: Mutex::new(VecDeque::new()),
            current_tasks: Mutex::new(HashMap::new()),
            registrations: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            describe_batches: Mutex::new(Vec::new()),
            next_revision: Mutex::new(100),
            echo: None,
            missing_cluster: false,
        }
    }

    /// Add a service running `definition`, which is also made describable.
    pub fn with_service(mut self, name: &str, desired_count: u32, definition: TaskDefinition) -> Self {
        let arn = definition.arn().unwrap();
        self.services.push(ServiceDescription {
            arn: service_arn(name),
            desired_count,
            task_definition: arn.clone(),
        });
        self.definitions.insert(arn, definition);
        self
    }

    /// Script the task definitions seen on successive polls.
    pub fn with_observations(self, observations: Vec<Vec<TaskDefinitionArn>>) -> Self {
        *self.observations.lock() = observations.into();
        self
    }

    /// Make `update_service` report `arn` as active whatever was requested.
    pub fn with_echo(mut self, arn: TaskDefinitionArn) -> Self {
        self.echo = Some(arn);
        self
    }

    /// Every call fails as if the cluster did not exist.
    pub fn without_cluster(mut self) -> Self {
        self.missing_cluster = true;
        self
    }

    pub fn registrations(&self) -> Vec<RegistrationRequest> {
        self.registrations.lock().clone()
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.lock().clone()
    }

    pub fn describe_batches(&self) -> Vec<usize> {
        self.describe_batches.lock().clone()
    }

    fn check_cluster(&self, cluster: &str) -> Result<(), ApiError> {
        if self.missing_cluster || cluster != CLUSTER {
            return Err(ApiError::ClusterNotFound {
                cluster: cluster.to_string(),
            });
        }
        Ok(())
    }

    fn next_observation(&self) -> Vec<TaskDefinitionArn> {
        let mut observations = self.observations.lock();
        if observations.len() > 1 {
            observations.pop_front().unwrap_or_default()
        } else {
            observations.front().cloned().unwrap_or_default()
        }
    }
}

#[async_trait]
impl ServiceOps for FakeEcs {
    async fn list_services(&self, cluster: &str) -> Result<Vec<ServiceArn>, ApiError> {
        self.check_cluster(cluster)?;
        Ok(self.services.iter().map(|s| s.arn.clone()).collect())
    }

    async fn describe_service(
        &self,
        cluster: &str,
        service: &ServiceArn,
    ) -> Result<ServiceDescription, ApiError> {
        self.check_cluster(cluster)?;
        self.services
            .iter()
            .find(|s| &s.arn == service)
            .cloned()
            .ok_or_else(|| ApiError::ServiceNotFound {
                service: service.to_string(),
            })
    }

    async fn update_service(
        &self,
        cluster: &str,
        service: &ServiceArn,
        task_definition: &TaskDefinitionArn,
        force_new_deployment: bool,
    ) -> Result<TaskDefinitionArn, ApiError> {
        self.check_cluster(cluster)?;
        self.updates.lock().push(UpdateCall {
            service: service.clone(),
            task_definition: task_definition.clone(),
            force_new_deployment,
        });
        Ok(self.echo.clone().unwrap_or_else(|| task_definition.clone()))
    }
}

#[async_trait]
impl TaskDefinitionOps for FakeEcs {
    async fn describe_task_definition(
        &self,
        arn: &TaskDefinitionArn,
    ) -> Result<TaskDefinition, ApiError> {
        self.definitions
            .get(arn)
            .cloned()
            .ok_or_else(|| ApiError::Request {
                operation: "DescribeTaskDefinition",
                message: format!("unknown task definition {arn}"),
            })
    }

    async fn register_task_definition(
        &self,
        request: &RegistrationRequest,
    ) -> Result<TaskDefinitionArn, ApiError> {
        let mut revision = self.next_revision.lock();
        *revision += 1;
        self.registrations.lock().push(request.clone());
        Ok(definition_arn(request.family().unwrap_or("unknown"), *revision))
    }
}

#[async_trait]
impl TaskOps for FakeEcs {
    async fn list_running_tasks(
        &self,
        cluster: &str,
        service: &ServiceArn,
    ) -> Result<Vec<TaskArn>, ApiError> {
        self.check_cluster(cluster)?;
        let service_name = service.service_name();

        let mut current = self.current_tasks.lock();
        current.clear();
        let mut arns = Vec::new();
        for (i, task_definition) in self.next_observation().into_iter().enumerate() {
            let arn = TaskArn::new(format!("{ACCOUNT_PREFIX}:task/{CLUSTER}/{service_name}-{i}"));
            current.insert(arn.clone(), task_definition);
            arns.push(arn);
        }
        Ok(arns)
    }

    async fn describe_tasks(
        &self,
        cluster: &str,
        tasks: &[TaskArn],
    ) -> Result<Vec<RunningTask>, ApiError> {
        self.check_cluster(cluster)?;
        self.describe_batches.lock().push(tasks.len());

        let current = self.current_tasks.lock();
        Ok(tasks
            .iter()
            .filter_map(|arn| {
                current.get(arn).map(|task_definition| RunningTask {
                    arn: arn.clone(),
                    task_definition: task_definition.clone(),
                })
            })
            .collect())
    }
}
