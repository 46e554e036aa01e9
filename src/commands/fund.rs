use alloy::primitives::utils::format_ether;
use alloy::primitives::U256;
use anyhow::Result;

use crate::context::DeploymentContext;
use crate::{deploy, interact};

pub async fn fund(ctx: &DeploymentContext, amount: Option<U256>) -> Result<()> {
	let receipt = interact::fund(ctx, amount).await?;
	println!("Funded.");
	println!("TX: {}", receipt.tx_hash);
	Ok(())
}

pub async fn withdraw(ctx: &DeploymentContext) -> Result<()> {
	let receipt = interact::withdraw(ctx).await?;
	println!("Withdrawn.");
	println!("TX: {}", receipt.tx_hash);
	Ok(())
}

/// Deploy, fund with the entrance fee and withdraw again, all in one
/// session so it also works on the throwaway development chain.
pub async fn run(ctx: &DeploymentContext) -> Result<()> {
	let fund_me = deploy::deploy_target_contract(ctx).await?;
	println!("FundMe deployed to {}", fund_me.address);

	let fee = interact::entrance_fee(ctx).await?;
	println!("Entrance fee: {} ETH ({fee} wei)", format_ether(fee));

	let funded = interact::fund(ctx, None).await?;
	println!("Funded:    {}", funded.tx_hash);

	let withdrawn = interact::withdraw(ctx).await?;
	println!("Withdrawn: {}", withdrawn.tx_hash);
	Ok(())
}
