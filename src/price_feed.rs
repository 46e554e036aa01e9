use std::fmt;

use alloy::primitives::Address;

use crate::account::Account;
use crate::context::DeploymentContext;
use crate::error::Error;
use crate::mocks;
use crate::network::NetworkClass;

/// Configuration key holding a live network's ETH/USD feed address.
pub const PRICE_FEED_KEY: &str = "eth_usd_price_feed";

/// A price-feed address exactly as it was resolved.  Configured values are
/// kept verbatim; they become an [`Address`] only when a constructor needs
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFeedAddress(String);

impl PriceFeedAddress {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Parse into a 20-byte address.
	pub fn to_address(&self) -> Result<Address, Error> {
		self.0.trim().parse().map_err(|_| Error::InvalidAddress {
			value: self.0.clone(),
		})
	}
}

impl From<Address> for PriceFeedAddress {
	fn from(address: Address) -> Self {
		Self(address.to_string())
	}
}

impl fmt::Display for PriceFeedAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// The price-feed address the FundMe constructor receives.
///
/// Live networks read it from the network's configuration table and return
/// it unchanged; local and forked-local networks use the session's mock and
/// never consult the configuration.
pub async fn resolve_feed_address(
	ctx: &DeploymentContext,
	class: NetworkClass,
	account: &Account,
) -> Result<PriceFeedAddress, Error> {
	if class.is_local() {
		let mock = mocks::ensure_mock_deployed(ctx, account).await?;
		return Ok(mock.address.into());
	}

	let value = ctx
		.config()
		.network(ctx.network())
		.and_then(|n| n.eth_usd_price_feed.as_deref())
		.ok_or_else(|| Error::ConfigKeyMissing {
			network: ctx.network().to_owned(),
			key: PRICE_FEED_KEY,
		})?;

	Ok(PriceFeedAddress(value.to_owned()))
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::chain::dev::DevChain;
	use crate::config::Config;
	use crate::contracts::ContractKind;
	use crate::registry::DeploymentRegistry;

	const RINKEBY_FEED: &str = "0x8A753747A1Fa494EC906cE90E9f37563A8AF630e";

	fn ctx(network: &str, config: Config) -> (DeploymentContext, Account) {
		let chain = DevChain::new();
		let account = chain.accounts_now()[0].clone();
		let ctx =
			DeploymentContext::new(network, config, Arc::new(chain), DeploymentRegistry::in_memory());
		(ctx, account)
	}

	#[tokio::test]
	async fn live_reads_configuration_without_mocking() {
		let config =
			Config::parse(&format!("[networks.rinkeby]\neth_usd_price_feed = \"{RINKEBY_FEED}\"\n"))
				.unwrap();
		let (ctx, account) = ctx("rinkeby", config);

		let feed = resolve_feed_address(&ctx, ctx.class(), &account).await.unwrap();
		assert_eq!(feed.as_str(), RINKEBY_FEED);
		assert_eq!(feed.to_address().unwrap(), RINKEBY_FEED.parse::<Address>().unwrap());
		assert_eq!(ctx.registry().count(ContractKind::MockV3Aggregator), 0);
	}

	#[tokio::test]
	async fn live_without_feed_is_config_key_missing() {
		let config = Config::parse("[networks.mainnet]\nverify = true\n").unwrap();
		let (ctx, account) = ctx("mainnet", config);

		let err = resolve_feed_address(&ctx, ctx.class(), &account).await.unwrap_err();
		assert!(matches!(
			err,
			Error::ConfigKeyMissing { ref network, key: PRICE_FEED_KEY } if network == "mainnet"
		));
		assert_eq!(ctx.registry().count(ContractKind::MockV3Aggregator), 0);
	}

	#[tokio::test]
	async fn live_returns_configured_value_verbatim() {
		let config = Config::parse("[networks.kovan]\neth_usd_price_feed = \"0xABCD\"\n").unwrap();
		let (ctx, account) = ctx("kovan", config);

		let feed = resolve_feed_address(&ctx, ctx.class(), &account).await.unwrap();
		assert_eq!(feed.as_str(), "0xABCD");
		assert_eq!(ctx.registry().count(ContractKind::MockV3Aggregator), 0);

		// Too short for a constructor argument.
		assert!(matches!(
			feed.to_address(),
			Err(Error::InvalidAddress { ref value }) if value == "0xABCD"
		));
	}

	#[tokio::test]
	async fn forked_local_ignores_configured_feed() {
		let config = Config::parse(&format!(
			"[networks.mainnet-fork]\neth_usd_price_feed = \"{RINKEBY_FEED}\"\n"
		))
		.unwrap();
		let (ctx, account) = ctx("mainnet-fork", config);

		let feed = resolve_feed_address(&ctx, ctx.class(), &account).await.unwrap();
		let mock = ctx.registry().latest(ContractKind::MockV3Aggregator).unwrap();
		assert_eq!(feed.to_address().unwrap(), mock.address);
		assert_ne!(feed.as_str(), RINKEBY_FEED);
	}
}
