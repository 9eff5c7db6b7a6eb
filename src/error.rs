// ABOUTME: Application-wide error types for ecs-pipeline-deploy.
// ABOUTME: Uses thiserror and maps each failure to a process exit code.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::DeployError;
use crate::types::ParseImageRefError;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for malformed input and operational failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code when the image is already deployed and nothing was forced.
pub const EXIT_ALREADY_DEPLOYED: i32 = 2;
/// Exit code after an interrupt, following the shell convention.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid image {image:?}: {source}")]
    MalformedImage {
        image: String,
        source: ParseImageRefError,
    },

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("interrupted")]
    Interrupted,
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Interrupted => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
