// ABOUTME: Phantom-typed ARNs for compile-time type safety.
// ABOUTME: Prevents accidental swapping of service, task definition, and task identifiers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum ServiceMarker {}
pub enum TaskDefinitionMarker {}
pub enum TaskMarker {}

/// A type-safe Amazon Resource Name.
///
/// Using phantom types, this ensures you can't accidentally pass a `TaskArn`
/// where a `TaskDefinitionArn` is expected, catching bugs at compile time.
///
/// ```compile_fail
/// use ecs_pipeline_deploy::types::{ServiceArn, TaskDefinitionArn};
///
/// fn takes_definition(_arn: TaskDefinitionArn) {}
///
/// let service = ServiceArn::new("arn:aws:ecs:us-east-1:1:service/c/web".to_string());
/// takes_definition(service);
/// ```
#[must_use = "ARNs reference resources and should not be ignored"]
pub struct Arn<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Arn<T> {
    pub fn new(value: String) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }

    /// The resource part after the last `/`, e.g. `web-app:42` for a task
    /// definition or `web` for a service.
    pub fn short_name(&self) -> &str {
        self.value.rsplit('/').next().unwrap_or(&self.value)
    }
}

impl Arn<TaskDefinitionMarker> {
    /// Revision number, the integer after the final `:`.
    pub fn revision(&self) -> Option<u32> {
        self.value.rsplit(':').next()?.parse().ok()
    }
}

impl Arn<ServiceMarker> {
    /// Service name, the final path segment of the ARN.
    pub fn service_name(&self) -> &str {
        self.short_name()
    }
}

// Manual trait implementations that don't require T to implement the trait.
// This is necessary because T is only used as a phantom type marker.

impl<T> std::fmt::Debug for Arn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Arn").field(&self.value).finish()
    }
}

impl<T> Clone for Arn<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Arn<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Arn<T> {}

impl<T> PartialOrd for Arn<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Arn<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<T> Hash for Arn<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Arn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<&str> for Arn<T> {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl<T> Serialize for Arn<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Arn<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type ServiceArn = Arn<ServiceMarker>;
pub type TaskDefinitionArn = Arn<TaskDefinitionMarker>;
pub type TaskArn = Arn<TaskMarker>;
