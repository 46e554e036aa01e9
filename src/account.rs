use std::fmt;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::context::DeploymentContext;
use crate::error::Error;
use crate::network::NetworkClass;

/// An identity able to sign transactions.
///
/// Accounts exposed by an external local node are unlocked there and carry
/// no key; everything else holds its private key.
#[derive(Clone)]
pub struct Account {
	address: Address,
	key: Option<PrivateKeySigner>,
}

impl Account {
	/// An account the node signs for.
	pub fn unlocked(address: Address) -> Self {
		Self { address, key: None }
	}

	pub fn from_signer(signer: PrivateKeySigner) -> Self {
		Self {
			address: signer.address(),
			key: Some(signer),
		}
	}

	/// Materialize an account from a hex private key (with or without 0x).
	pub fn from_key(key: &str) -> Result<Self, Error> {
		let signer: PrivateKeySigner = key
			.trim()
			.parse()
			.map_err(|e| Error::InvalidKey(format!("{e}")))?;
		Ok(Self::from_signer(signer))
	}

	/// A freshly generated random identity with no history.
	pub fn generate() -> Self {
		loop {
			let bytes: [u8; 32] = rand::random();
			if let Ok(signer) = PrivateKeySigner::from_slice(&bytes) {
				return Self::from_signer(signer);
			}
		}
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn signer(&self) -> Option<&PrivateKeySigner> {
		self.key.as_ref()
	}
}

impl fmt::Debug for Account {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Account")
			.field("address", &self.address)
			.field("keyed", &self.key.is_some())
			.finish()
	}
}

impl PartialEq for Account {
	fn eq(&self, other: &Self) -> bool {
		self.address == other.address
	}
}

impl Eq for Account {}

/// Pick the signing identity for the given network class.  Not cached: every
/// call asks the chain (or the configuration) again.
pub async fn resolve_account(
	ctx: &DeploymentContext,
	class: NetworkClass,
) -> Result<Account, Error> {
	if class.is_local() {
		let accounts = ctx.chain().accounts().await?;
		return accounts.into_iter().next().ok_or(Error::NoLocalAccounts);
	}

	let key = ctx
		.config()
		.wallet_key()
		.ok_or_else(|| Error::MissingCredential(ctx.network().to_owned()))?;
	Account::from_key(&key)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::chain::dev::DevChain;
	use crate::config::Config;
	use crate::registry::DeploymentRegistry;

	// Well-known throwaway key (second anvil/hardhat account).
	const KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

	fn ctx(network: &str, config: Config, chain: DevChain) -> DeploymentContext {
		DeploymentContext::new(network, config, Arc::new(chain), DeploymentRegistry::in_memory())
	}

	#[test]
	fn key_parsing() {
		let a = Account::from_key(KEY).unwrap();
		let b = Account::from_key(KEY.strip_prefix("0x").unwrap()).unwrap();
		assert_eq!(a, b);
		assert_eq!(
			a.address(),
			"0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse::<Address>().unwrap()
		);
		assert!(matches!(Account::from_key("0xnothex"), Err(Error::InvalidKey(_))));
	}

	#[test]
	fn generated_accounts_differ() {
		let a = Account::generate();
		let b = Account::generate();
		assert_ne!(a, b);
		assert!(a.signer().is_some());
	}

	#[tokio::test]
	async fn local_uses_first_prefunded_account() {
		let chain = DevChain::new();
		let first = chain.accounts_now()[0].clone();
		let ctx = ctx("development", Config::default(), chain);

		let account = resolve_account(&ctx, ctx.class()).await.unwrap();
		assert_eq!(account, first);
	}

	#[tokio::test]
	async fn empty_local_set_is_an_error() {
		let ctx = ctx("ganache-local", Config::default(), DevChain::with_accounts(0));
		let err = resolve_account(&ctx, ctx.class()).await.unwrap_err();
		assert!(matches!(err, Error::NoLocalAccounts));
	}

	#[tokio::test]
	async fn live_without_key_is_missing_credential() {
		let ctx = ctx("rinkeby", Config::default(), DevChain::new());
		let err = resolve_account(&ctx, ctx.class()).await.unwrap_err();
		assert!(matches!(err, Error::MissingCredential(ref n) if n == "rinkeby"));
	}

	#[tokio::test]
	async fn live_materializes_configured_key() {
		let mut config = Config::default();
		config.wallets.from_key = Some(KEY.into());
		let ctx = ctx("rinkeby", config, DevChain::new());

		let account = resolve_account(&ctx, ctx.class()).await.unwrap();
		assert_eq!(account, Account::from_key(KEY).unwrap());
		assert!(account.signer().is_some());
	}
}
