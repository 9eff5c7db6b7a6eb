// ABOUTME: Library root for ecs-pipeline-deploy - exposes the deployment core for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod ecs;
pub mod error;
pub mod output;
pub mod types;
