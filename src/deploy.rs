use crate::account;
use crate::chain::DeployRequest;
use crate::context::DeploymentContext;
use crate::contracts::ConstructorArgs;
use crate::error::Error;
use crate::network::NetworkClass;
use crate::price_feed;
use crate::registry::Deployment;

/// Deploy FundMe against the price feed appropriate for the active network.
///
/// Account and feed resolution both happen before the deploy call; if either
/// fails nothing is sent to the chain.
pub async fn deploy_target_contract(ctx: &DeploymentContext) -> Result<Deployment, Error> {
	let class = ctx.class();
	let account = account::resolve_account(ctx, class).await?;
	tracing::info!(network = ctx.network(), %class, "The active network is {}", ctx.network());

	let feed = price_feed::resolve_feed_address(ctx, class, &account).await?;
	let price_feed = feed.to_address()?;

	let publish = publish_source(ctx, class);
	let fund_me = ctx
		.deploy(
			DeployRequest {
				signer: account,
				constructor: ConstructorArgs::FundMe { price_feed },
			},
			publish,
		)
		.await?;

	tracing::info!(address = %fund_me.address, %price_feed, "Contract deployed to {}", fund_me.address);
	Ok(fund_me)
}

/// Source publication is only attempted on live networks that ask for it.
fn publish_source(ctx: &DeploymentContext, class: NetworkClass) -> bool {
	class == NetworkClass::Live
		&& ctx
			.config()
			.network(ctx.network())
			.and_then(|n| n.verify)
			.unwrap_or(false)
}
