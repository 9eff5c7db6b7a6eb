// ABOUTME: Docker image reference parsing and canonical rendering.
// ABOUTME: Handles formats like alpine, alpine:3.7, registry:port/ns/app:tag.

use std::fmt;
use thiserror::Error;

/// Tag used when the reference does not carry one.
pub const DEFAULT_TAG: &str = "latest";

const MAX_TAG_LEN: usize = 127;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid registry: {0}")]
    InvalidRegistry(String),

    #[error("invalid image name: {0}")]
    InvalidName(String),

    #[error("invalid tag (1-127 word characters, '.', '-' or '_'): {0}")]
    InvalidTag(String),

    #[error("too many path segments in image reference: {0}")]
    TooManySegments(String),
}

/// A parsed image reference.
///
/// Field order matters: the derived ordering sorts by registry, then name,
/// then tag, which is the order containers are listed in logs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageRef {
    registry: Option<String>,
    name: String,
    tag: String,
}

impl ImageRef {
    /// Parse a docker-style image string.
    ///
    /// A leading segment is only treated as a registry when it is followed by
    /// two more path segments, so `ns/app` is a name while
    /// `docker.example.io/ns/app` has a registry. The registry may carry a
    /// `:port`. Names are lowercase alphanumerics plus `.`, `-`, `_` with at
    /// most one internal `/`, and may be written with a leading `/`.
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }

        // The tag is whatever follows a colon in the final path segment; a
        // colon in an earlier segment belongs to the registry port.
        let last_segment_start = input.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (path, tag) = match input[last_segment_start..].find(':') {
            Some(offset) => {
                let split = last_segment_start + offset;
                (&input[..split], Some(&input[split + 1..]))
            }
            None => (input, None),
        };

        let tag = match tag {
            Some(tag) => {
                validate_tag(tag)?;
                tag.to_string()
            }
            None => DEFAULT_TAG.to_string(),
        };

        // A leading slash is allowed before a registry-less name.
        let (path, rooted) = match path.strip_prefix('/') {
            Some(rest) => (rest, true),
            None => (path, false),
        };

        let segments: Vec<&str> = path.split('/').collect();
        let (registry, name_segments) = match segments.as_slice() {
            [registry, namespace, name] if !rooted => {
                validate_registry(registry)?;
                (Some((*registry).to_string()), vec![*namespace, *name])
            }
            [namespace, name] => (None, vec![*namespace, *name]),
            [name] => (None, vec![*name]),
            _ => return Err(ParseImageRefError::TooManySegments(input.to_string())),
        };

        for segment in &name_segments {
            if !is_name_segment(segment) {
                return Err(ParseImageRefError::InvalidName(name_segments.join("/")));
            }
        }

        Ok(Self {
            registry,
            name: name_segments.join("/"),
            tag,
        })
    }

    /// Build a reference from already-validated parts.
    pub fn new(registry: Option<&str>, name: &str, tag: &str) -> Self {
        Self {
            registry: registry.map(str::to_string),
            name: name.to_string(),
            tag: tag.to_string(),
        }
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// True when both references point at the same repository, ignoring tags.
    pub fn same_repository(&self, other: &ImageRef) -> bool {
        self.registry == other.registry && self.name == other.name
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref registry) = self.registry {
            write!(f, "{}/", registry)?;
        }
        write!(f, "{}:{}", self.name, self.tag)
    }
}

impl std::str::FromStr for ImageRef {
    type Err = ParseImageRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn validate_tag(tag: &str) -> Result<(), ParseImageRefError> {
    let valid_chars = tag
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-');
    if tag.is_empty() || tag.chars().count() > MAX_TAG_LEN || !valid_chars {
        return Err(ParseImageRefError::InvalidTag(tag.to_string()));
    }
    Ok(())
}

fn validate_registry(registry: &str) -> Result<(), ParseImageRefError> {
    let (host, port) = match registry.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (registry, None),
    };

    let host_valid = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '-');
    let port_valid = port
        .map(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(true);

    if host_valid && port_valid {
        Ok(())
    } else {
        Err(ParseImageRefError::InvalidRegistry(registry.to_string()))
    }
}

fn is_name_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-' || c == '_'
        })
}
