use anyhow::Result;
use clap::Parser;

use fund_me_deployer::cli::{Cli, Command};
use fund_me_deployer::{commands, logging};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	logging::init(&cli.log_filter)?;

	let ctx = commands::connect(&cli)?;

	match &cli.command {
		Command::Deploy => commands::deploy::run(&ctx).await,
		Command::Fund { amount } => commands::fund::fund(&ctx, *amount).await,
		Command::Withdraw => commands::fund::withdraw(&ctx).await,
		Command::Run => commands::fund::run(&ctx).await,
		Command::Status => commands::status::run(&ctx).await,
	}
}
