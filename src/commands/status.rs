use alloy::primitives::utils::format_ether;
use anyhow::Result;

use crate::account;
use crate::context::DeploymentContext;
use crate::contracts::ContractKind;
use crate::interact;

pub async fn run(ctx: &DeploymentContext) -> Result<()> {
	println!("Network");
	println!("  Name:     {}", ctx.network());
	println!("  Class:    {}", ctx.class());
	match ctx.config().host(ctx.network()) {
		Some(host) => println!("  RPC:      {host}"),
		None => println!("  RPC:      in-process"),
	}

	match account::resolve_account(ctx, ctx.class()).await {
		Ok(account) => {
			let balance = ctx.chain().balance(account.address()).await?;
			println!("  Account:  {}", account.address());
			println!("  Balance:  {} ETH", format_ether(balance));
		}
		Err(e) => println!("  Account:  unavailable ({e})"),
	}

	let deployments = ctx.registry().all();
	if deployments.is_empty() {
		println!("\nNo deployments recorded.");
		return Ok(());
	}

	println!("\nDeployments");
	for d in &deployments {
		println!(
			"  {:<17} {}  {}",
			d.kind.name(),
			d.address,
			d.deployed_at.format("%Y-%m-%d %H:%M:%S UTC")
		);
	}

	if ctx.registry().count(ContractKind::FundMe) > 0 {
		let fee = interact::entrance_fee(ctx).await?;
		println!("\nEntrance fee: {} ETH", format_ether(fee));
	}
	Ok(())
}
