// ABOUTME: Type-safe identifiers and validated domain values.
// ABOUTME: Uses phantom types to prevent ARN confusion at compile time.

mod id;
mod image_ref;
mod task_definition;

pub use id::{Arn, ServiceArn, TaskArn, TaskDefinitionArn};
pub use image_ref::{DEFAULT_TAG, ImageRef, ParseImageRefError};
pub use task_definition::{ContainerImage, LOG_TAG_OPTION, RegistrationRequest, TaskDefinition};
