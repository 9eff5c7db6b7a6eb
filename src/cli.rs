// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Positional cluster, service and image plus deployment flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use ecs_pipeline_deploy::config::Overrides;
use ecs_pipeline_deploy::deploy::DeployFlags;

#[derive(Debug, Parser)]
#[command(name = "ecs-pipeline-deploy")]
#[command(about = "Deploy a container image to an ECS service")]
#[command(version)]
pub struct Cli {
    /// Cluster that runs the service
    #[arg(env = "ECS_DEPLOY_CLUSTER")]
    pub cluster: String,

    /// Service name, or the part after `<cluster>-` in its generated name
    #[arg(env = "ECS_DEPLOY_SERVICE")]
    pub service: String,

    /// Image to deploy, e.g. registry.example.com/team/app:1.4.2
    #[arg(env = "ECS_DEPLOY_IMAGE")]
    pub image: String,

    /// Register a new task definition even if the image is already deployed
    #[arg(short, long)]
    pub force: bool,

    /// Restart the service's tasks even if the image is already deployed
    #[arg(short, long)]
    pub redeploy: bool,

    /// Wait until the desired number of tasks run the new definition
    #[arg(short, long)]
    pub wait: bool,

    /// While waiting, also require that no task runs an older definition
    #[arg(short, long)]
    pub only_new: bool,

    /// Seconds between polls while waiting [default: 5]
    #[arg(short, long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub delay: Option<u64>,

    /// Give up waiting after this long, e.g. 10m
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS shared config profile
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Settings file (defaults to ecs-pipeline-deploy.yml in the current directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print the final result
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn flags(&self) -> DeployFlags {
        DeployFlags {
            force: self.force,
            redeploy: self.redeploy,
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            region: self.region.clone(),
            profile: self.profile.clone(),
            delay: self.delay.map(Duration::from_secs),
            timeout: self.timeout,
            wait: self.wait,
            only_new: self.only_new,
        }
    }
}
