// ABOUTME: Command module aggregator for the ecs-pipeline-deploy CLI.
// ABOUTME: Re-exports the deploy command handler.

mod deploy;

pub use deploy::deploy;
