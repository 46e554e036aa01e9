pub mod deploy;
pub mod fund;
pub mod status;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::context::DeploymentContext;

/// Load the configuration and connect to the network chosen on the CLI.
pub fn connect(cli: &Cli) -> Result<DeploymentContext> {
	let config = Config::load(cli.config.as_deref())?;
	Ok(DeploymentContext::connect(&cli.network, config)?)
}
