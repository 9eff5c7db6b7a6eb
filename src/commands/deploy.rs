// ABOUTME: Deploy command implementation.
// ABOUTME: Connects to ECS, runs the deployment driver, and reports how it ended.

use ecs_pipeline_deploy::config::Settings;
use ecs_pipeline_deploy::deploy::{Outcome, TokioClock, execute};
use ecs_pipeline_deploy::ecs::EcsClient;
use ecs_pipeline_deploy::error::{Error, Result};
use ecs_pipeline_deploy::output::Output;
use ecs_pipeline_deploy::types::ImageRef;

use crate::cli::Cli;

/// Deploy the image named on the command line.
///
/// The image is parsed before any network call so malformed input fails fast.
pub async fn deploy(cli: &Cli, settings: Settings, mut output: Output) -> Result<Outcome> {
    let image = ImageRef::parse(&cli.image).map_err(|source| Error::MalformedImage {
        image: cli.image.clone(),
        source,
    })?;

    output.start_timer();
    let request = settings.request(cli.cluster.clone(), cli.service.clone(), image, cli.flags());

    let client = EcsClient::connect(settings.region.as_deref(), settings.profile.as_deref()).await;
    let outcome = execute(&client, &TokioClock, request, &output).await?;

    match &outcome {
        Outcome::Deployed(summary) => output.deployed(summary),
        Outcome::AlreadyDeployed(conflict) => output.already_deployed(conflict),
    }
    Ok(outcome)
}
