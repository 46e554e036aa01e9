use std::path::PathBuf;

use alloy::primitives::U256;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
	name = "fund-me",
	about = "Deploy and interact with the FundMe contract on local or live networks.",
	version
)]
pub struct Cli {
	/// Network to operate on (development, ganache-local, mainnet-fork, or a
	/// live network configured in the config file).
	#[arg(long, env = "FUND_ME_NETWORK", default_value = "development", global = true)]
	pub network: String,

	/// Project configuration file. Without it, fund-me.toml is used when
	/// present, then ~/.fund-me/config.toml.
	#[arg(long, env = "FUND_ME_CONFIG", global = true)]
	pub config: Option<PathBuf>,

	/// Log filter used when RUST_LOG is unset.
	#[arg(long, default_value = "info", global = true)]
	pub log_filter: String,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Deploy FundMe, provisioning a mock price feed on local networks.
	Deploy,

	/// Fund the most recently deployed FundMe.
	Fund {
		/// Amount in wei. Defaults to the contract's entrance fee.
		#[arg(long)]
		amount: Option<U256>,
	},

	/// Withdraw everything from the most recently deployed FundMe.
	Withdraw,

	/// Deploy, fund and withdraw in a single session.
	Run,

	/// Show the network, signing account and known deployments.
	Status,
}
