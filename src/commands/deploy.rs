use anyhow::Result;

use crate::context::DeploymentContext;
use crate::contracts::ContractKind;
use crate::deploy;

pub async fn run(ctx: &DeploymentContext) -> Result<()> {
	let fund_me = deploy::deploy_target_contract(ctx).await?;

	println!("Network:    {} ({})", ctx.network(), ctx.class());
	if ctx.class().is_local() {
		let mock = ctx.registry().latest(ContractKind::MockV3Aggregator)?;
		println!("Price feed: {} (mock)", mock.address);
	}
	println!("FundMe:     {}", fund_me.address);
	println!("TX:         {}", fund_me.tx_hash);
	Ok(())
}
