// ABOUTME: Rewrites a task definition to run a target image.
// ABOUTME: Updates the first container of the same repository and its log tag option.

use crate::types::{ContainerImage, ImageRef, TaskDefinition};

use super::DeployError;

/// Produce a copy of `definition` whose first container from the target's
/// repository (registry and name) runs `target`.
///
/// When that container's log configuration has a `tag` option, the old image
/// tag inside it is replaced with the new tag, keeping the surrounding text.
/// Remaining containers are left untouched.
pub fn apply(
    definition: &TaskDefinition,
    containers: &[ContainerImage],
    target: &ImageRef,
) -> Result<TaskDefinition, DeployError> {
    let current = containers
        .iter()
        .find(|c| c.image.same_repository(target))
        .ok_or_else(|| DeployError::ImageNotFound(target.to_string()))?;

    tracing::info!(
        "Modifying the task definition {} to use {}",
        definition
            .arn()
            .map(|arn| arn.short_name().to_string())
            .unwrap_or_else(|| definition.family().unwrap_or("(unregistered)").to_string()),
        target
    );

    let log_tag = definition
        .log_tag_at(current.index)
        .map(|tag| tag.replace(current.image.tag(), target.tag()));

    Ok(definition.with_container_image(current.index, target.to_string(), log_tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_ecs::types::{
        ContainerDefinition, LogConfiguration, LogDriver, TaskDefinition as EcsTaskDefinition,
    };

    fn container(name: &str, image: &str, log_tag: Option<&str>) -> ContainerDefinition {
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

    fn definition(containers: Vec<ContainerDefinition>) -> TaskDefinition {
        TaskDefinition::from_ecs(
            EcsTaskDefinition::builder()
                .family("app")
                .task_definition_arn("arn:aws:ecs:us-east-1:123456789012:task-definition/app:7")
                .set_container_definitions(Some(containers))
                .build(),
        )
    }

    #[test]
    fn rewrites_image_and_log_tag() {
        let original = definition(vec![container("app", "app:1.0", Some("app-1.0"))]);
        let target = ImageRef::parse("app:2.0").unwrap();

        let updated = apply(&original, &original.container_images(), &target).unwrap();

        assert_eq!(updated.image_at(0), Some("app:2.0"));
        assert_eq!(updated.log_tag_at(0), Some("app-2.0"));
    }

    #[test]
    fn leaves_the_source_value_unchanged() {
        let original = definition(vec![container("app", "app:1.0", Some("app-1.0"))]);
        let target = ImageRef::parse("app:2.0").unwrap();

        let _ = apply(&original, &original.container_images(), &target).unwrap();

        assert_eq!(original.image_at(0), Some("app:1.0"));
        assert_eq!(original.log_tag_at(0), Some("app-1.0"));
    }

    #[test]
    fn only_the_matching_container_changes() {
        let original = definition(vec![
            container("proxy", "envoyproxy/envoy:v1.29", Some("proxy-v1.29")),
            container("app", "registry.io/team/app:1.0", None),
            container("app-copy", "registry.io/team/app:1.0", None),
        ]);
        let target = ImageRef::parse("registry.io/team/app:1.1").unwrap();

        let updated = apply(&original, &original.container_images(), &target).unwrap();

        assert_eq!(updated.image_at(0), Some("envoyproxy/envoy:v1.29"));
        assert_eq!(updated.log_tag_at(0), Some("proxy-v1.29"));
        assert_eq!(updated.image_at(1), Some("registry.io/team/app:1.1"));
        assert_eq!(updated.image_at(2), Some("registry.io/team/app:1.0"));
    }

    #[test]
    fn untagged_container_gets_explicit_tag() {
        let original = definition(vec![container("app", "app", Some("app-latest"))]);
        let target = ImageRef::parse("app:3").unwrap();

        let updated = apply(&original, &original.container_images(), &target).unwrap();

        assert_eq!(updated.image_at(0), Some("app:3"));
        assert_eq!(updated.log_tag_at(0), Some("app-3"));
    }

    #[test]
    fn missing_repository_is_image_not_found() {
        let original = definition(vec![container("app", "app:1.0", None)]);
        let target = ImageRef::parse("registry.io/team/app:1.0").unwrap();

        let err = apply(&original, &original.container_images(), &target).unwrap_err();

        assert!(matches!(err, DeployError::ImageNotFound(ref image) if image == "registry.io/team/app:1.0"));
    }
}
