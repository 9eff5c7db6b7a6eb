// ABOUTME: Immutable task definition values and registration payloads.
// ABOUTME: Wraps the ECS model so re-registration never drops unknown fields.

use aws_sdk_ecs::types::TaskDefinition as EcsTaskDefinition;

use super::id::TaskDefinitionArn;
use super::image_ref::ImageRef;

/// Log driver option that carries the image tag.
pub const LOG_TAG_OPTION: &str = "tag";

/// A container's parsed image together with its position in the definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerImage {
    pub index: usize,
    pub image: ImageRef,
}

/// A task definition as returned by the orchestration API.
///
/// Values are never edited in place; transformations return a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition {
    inner: EcsTaskDefinition,
}

impl TaskDefinition {
    pub fn from_ecs(inner: EcsTaskDefinition) -> Self {
        Self { inner }
    }

    pub fn as_ecs(&self) -> &EcsTaskDefinition {
        &self.inner
    }

    /// ARN assigned at registration, absent on prototypes.
    pub fn arn(&self) -> Option<TaskDefinitionArn> {
        self.inner
            .task_definition_arn
            .as_deref()
            .map(TaskDefinitionArn::from)
    }

    pub fn family(&self) -> Option<&str> {
        self.inner.family.as_deref()
    }

    pub fn container_count(&self) -> usize {
        self.inner
            .container_definitions
            .as_ref()
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Raw image string of the container at `index`.
    pub fn image_at(&self, index: usize) -> Option<&str> {
        self.inner
            .container_definitions
            .as_ref()?
            .get(index)?
            .image
            .as_deref()
    }

    /// Log configuration `tag` option of the container at `index`.
    pub fn log_tag_at(&self, index: usize) -> Option<&str> {
        self.inner
            .container_definitions
            .as_ref()?
            .get(index)?
            .log_configuration
            .as_ref()?
            .options
            .as_ref()?
            .get(LOG_TAG_OPTION)
            .map(String::as_str)
    }

    /// Parsed container images in definition order.
    ///
    /// Containers without an image, or whose image is not a plain
    /// `registry/name:tag` reference, are skipped.
    pub fn container_images(&self) -> Vec<ContainerImage> {
        let mut images = Vec::new();
        for index in 0..self.container_count() {
            let Some(raw) = self.image_at(index) else {
                tracing::debug!("Container {} has no image, skipping", index);
                continue;
            };
            match ImageRef::parse(raw) {
                Ok(image) => {
                    tracing::debug!("Found {} in the task definition", image);
                    images.push(ContainerImage { index, image });
                }
                Err(e) => tracing::debug!("Skipping container image {}: {}", raw, e),
            }
        }
        images
    }

    /// Return a copy with the container at `index` running `image`, and its
    /// log tag option replaced when `log_tag` is given.
    pub(crate) fn with_container_image(
        &self,
        index: usize,
        image: String,
        log_tag: Option<String>,
    ) -> Self {
        let mut inner = self.inner.clone();
        if let Some(container) = inner
            .container_definitions
            .as_mut()
            .and_then(|containers| containers.get_mut(index))
        {
            container.image = Some(image);
            if let Some(tag) = log_tag
                && let Some(options) = container
                    .log_configuration
                    .as_mut()
                    .and_then(|config| config.options.as_mut())
            {
                options.insert(LOG_TAG_OPTION.to_string(), tag);
            }
        }
        Self { inner }
    }
}

/// A task definition stripped of every server-assigned field.
///
/// This is the only shape the registration call accepts, so a definition
/// cannot be submitted with its old identity attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRequest {
    definition: EcsTaskDefinition,
}

impl RegistrationRequest {
    pub fn family(&self) -> Option<&str> {
        self.definition.family.as_deref()
    }

    pub fn as_ecs(&self) -> &EcsTaskDefinition {
        &self.definition
    }
}

impl From<&TaskDefinition> for RegistrationRequest {
    fn from(definition: &TaskDefinition) -> Self {
        // Server-assigned fields. Everything else must be forwarded by
        // `EcsClient::register_task_definition`: family, task and execution
        // roles, network mode, containers, volumes, placement constraints,
        // cpu, memory, pid and ipc modes, proxy, inference accelerators,
        // ephemeral storage, runtime platform, fault injection.
        let mut definition = definition.inner.clone();
        definition.compatibilities = None;
        definition.requires_attributes = None;
        definition.requires_compatibilities = None;
        definition.revision = 0;
        definition.status = None;
        definition.task_definition_arn = None;
        definition.registered_at = None;
        definition.registered_by = None;
        definition.deregistered_at = None;
        definition.delete_requested_at = None;
        Self { definition }
    }
}
