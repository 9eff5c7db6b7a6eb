// ABOUTME: Settings file parsing and merging with command-line options.
// ABOUTME: Handles YAML discovery, humantime durations, and CLI precedence.

use crate::deploy::{DEFAULT_DELAY, DeployFlags, DeployRequest, WaitPolicy};
use crate::error::{Error, Result};
use crate::types::ImageRef;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "ecs-pipeline-deploy.yml";
pub const CONFIG_FILENAME_ALT: &str = "ecs-pipeline-deploy.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".ecs-pipeline-deploy/config.yml";

/// Optional defaults read from a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub profile: Option<String>,

    #[serde(default, with = "humantime_serde")]
    pub delay: Option<Duration>,

    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    #[serde(default)]
    pub wait: bool,

    #[serde(default)]
    pub only_new: bool,
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(yaml)?;
        if settings.delay.is_some_and(|delay| delay.is_zero()) {
            return Err(Error::InvalidConfig("delay must be greater than zero".to_string()));
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml(&content)?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Look for a settings file in `dir`. No file means default settings.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Ok(Self::default())
    }

    /// Load `explicit` when given, which must exist, else discover in `dir`.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(Error::ConfigNotFound(path.to_path_buf())),
            Some(path) => Self::load(path),
            None => Self::discover(dir),
        }
    }

    /// Apply command-line values on top of the file values.
    ///
    /// Options given on the command line win. Boolean switches can only turn
    /// a setting on.
    pub fn merge(mut self, cli: &Overrides) -> Self {
        if cli.region.is_some() {
            self.region = cli.region.clone();
        }
        if cli.profile.is_some() {
            self.profile = cli.profile.clone();
        }
        if cli.delay.is_some() {
            self.delay = cli.delay;
        }
        if cli.timeout.is_some() {
            self.timeout = cli.timeout;
        }
        self.wait |= cli.wait;
        self.only_new |= cli.only_new;
        self
    }

    /// Wait policy, or `None` when the rollout should not be awaited.
    pub fn wait_policy(&self) -> Option<WaitPolicy> {
        if !self.wait {
            if self.only_new {
                tracing::warn!("only_new has no effect without wait");
            }
            return None;
        }

        Some(WaitPolicy {
            delay: self.delay.unwrap_or(DEFAULT_DELAY),
            require_all_new: self.only_new,
            timeout: self.timeout,
        })
    }

    /// Build a deployment request from these settings.
    pub fn request(
        &self,
        cluster: String,
        service: String,
        image: ImageRef,
        flags: DeployFlags,
    ) -> DeployRequest {
        DeployRequest {
            cluster,
            service,
            image,
            flags,
            wait: self.wait_policy(),
        }
    }
}

/// Values taken from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub delay: Option<Duration>,
    pub timeout: Option<Duration>,
    pub wait: bool,
    pub only_new: bool,
}
