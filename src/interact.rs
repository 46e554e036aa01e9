use alloy::primitives::{Address, U256};

use crate::account::{self, Account};
use crate::chain::{FundMeCall, FundMeQuery, Receipt, TransactionRequest};
use crate::context::DeploymentContext;
use crate::contracts::ContractKind;
use crate::error::Error;
use crate::registry::Deployment;

/// Fund the most recent FundMe from the resolved account, sending the
/// contract's entrance fee unless `amount` overrides it.
pub async fn fund(ctx: &DeploymentContext, amount: Option<U256>) -> Result<Receipt, Error> {
	let fund_me = ctx.registry().latest(ContractKind::FundMe)?;
	let account = account::resolve_account(ctx, ctx.class()).await?;
	fund_at(ctx, &fund_me, &account, amount).await
}

pub async fn fund_from(
	ctx: &DeploymentContext,
	account: &Account,
	amount: Option<U256>,
) -> Result<Receipt, Error> {
	let fund_me = ctx.registry().latest(ContractKind::FundMe)?;
	fund_at(ctx, &fund_me, account, amount).await
}

async fn fund_at(
	ctx: &DeploymentContext,
	fund_me: &Deployment,
	account: &Account,
	amount: Option<U256>,
) -> Result<Receipt, Error> {
	let value = match amount {
		Some(v) => v,
		None => {
			let fee = ctx.chain().query(fund_me.address, FundMeQuery::EntranceFee).await?;
			tracing::info!(%fee, "The current entry fee is {fee}");
			fee
		}
	};

	tracing::info!(contract = %fund_me.address, from = %account.address(), %value, "Funding");
	let receipt = ctx
		.chain()
		.send(TransactionRequest {
			signer: account.clone(),
			to: fund_me.address,
			value,
			call: FundMeCall::Fund,
		})
		.await?;
	Ok(receipt)
}

/// Withdraw the contract balance from the most recent FundMe.  Only the
/// owner can; any other signer gets the contract's rejection back.
pub async fn withdraw(ctx: &DeploymentContext) -> Result<Receipt, Error> {
	let fund_me = ctx.registry().latest(ContractKind::FundMe)?;
	let account = account::resolve_account(ctx, ctx.class()).await?;
	withdraw_at(ctx, &fund_me, &account).await
}

pub async fn withdraw_from(ctx: &DeploymentContext, account: &Account) -> Result<Receipt, Error> {
	let fund_me = ctx.registry().latest(ContractKind::FundMe)?;
	withdraw_at(ctx, &fund_me, account).await
}

async fn withdraw_at(
	ctx: &DeploymentContext,
	fund_me: &Deployment,
	account: &Account,
) -> Result<Receipt, Error> {
	tracing::info!(contract = %fund_me.address, from = %account.address(), "Withdrawing");
	let receipt = ctx
		.chain()
		.send(TransactionRequest {
			signer: account.clone(),
			to: fund_me.address,
			value: U256::ZERO,
			call: FundMeCall::Withdraw,
		})
		.await?;
	Ok(receipt)
}

pub async fn entrance_fee(ctx: &DeploymentContext) -> Result<U256, Error> {
	let fund_me = ctx.registry().latest(ContractKind::FundMe)?;
	Ok(ctx.chain().query(fund_me.address, FundMeQuery::EntranceFee).await?)
}

/// `addressToAmountFunded(funder)` on the most recent FundMe.
pub async fn amount_funded(ctx: &DeploymentContext, funder: Address) -> Result<U256, Error> {
	let fund_me = ctx.registry().latest(ContractKind::FundMe)?;
	Ok(ctx
		.chain()
		.query(fund_me.address, FundMeQuery::AmountFunded(funder))
		.await?)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::chain::dev::DevChain;
	use crate::config::Config;
	use crate::deploy::deploy_target_contract;
	use crate::registry::DeploymentRegistry;

	fn local_ctx() -> DeploymentContext {
		DeploymentContext::new(
			"development",
			Config::default(),
			Arc::new(DevChain::new()),
			DeploymentRegistry::in_memory(),
		)
	}

	#[tokio::test]
	async fn interacting_before_deploying_fails() {
		let ctx = local_ctx();
		assert!(matches!(
			fund(&ctx, None).await,
			Err(Error::NoInstanceDeployed(ContractKind::FundMe))
		));
		assert!(matches!(
			withdraw(&ctx).await,
			Err(Error::NoInstanceDeployed(ContractKind::FundMe))
		));
	}

	#[tokio::test]
	async fn missing_deployment_is_reported_before_missing_key() {
		let ctx = DeploymentContext::new(
			"rinkeby",
			Config::default(),
			Arc::new(DevChain::new()),
			DeploymentRegistry::in_memory(),
		);
		assert!(matches!(
			fund(&ctx, None).await,
			Err(Error::NoInstanceDeployed(ContractKind::FundMe))
		));
		assert!(matches!(
			withdraw(&ctx).await,
			Err(Error::NoInstanceDeployed(ContractKind::FundMe))
		));
	}

	#[tokio::test]
	async fn fund_then_withdraw_round_trips_the_ledger() {
		let ctx = local_ctx();
		deploy_target_contract(&ctx).await.unwrap();
		let account = account::resolve_account(&ctx, ctx.class()).await.unwrap();
		let fee = entrance_fee(&ctx).await.unwrap();

		fund(&ctx, None).await.unwrap();
		assert_eq!(amount_funded(&ctx, account.address()).await.unwrap(), fee);

		withdraw(&ctx).await.unwrap();
		assert_eq!(amount_funded(&ctx, account.address()).await.unwrap(), U256::ZERO);
	}

	#[tokio::test]
	async fn explicit_amount_overrides_the_fee() {
		let ctx = local_ctx();
		deploy_target_contract(&ctx).await.unwrap();
		let account = account::resolve_account(&ctx, ctx.class()).await.unwrap();
		let fee = entrance_fee(&ctx).await.unwrap();

		fund(&ctx, Some(fee * U256::from(3))).await.unwrap();
		assert_eq!(
			amount_funded(&ctx, account.address()).await.unwrap(),
			fee * U256::from(3)
		);
	}

	#[tokio::test]
	async fn underpaying_is_a_contract_rejection() {
		let ctx = local_ctx();
		deploy_target_contract(&ctx).await.unwrap();
		let fee = entrance_fee(&ctx).await.unwrap();

		let err = fund(&ctx, Some(fee - U256::from(2))).await.unwrap_err();
		assert!(matches!(err, Error::ContractRejection { .. }));
	}

	#[tokio::test]
	async fn stranger_cannot_withdraw() {
		let ctx = local_ctx();
		deploy_target_contract(&ctx).await.unwrap();
		let owner = account::resolve_account(&ctx, ctx.class()).await.unwrap();
		fund(&ctx, None).await.unwrap();
		let funded = amount_funded(&ctx, owner.address()).await.unwrap();

		let err = withdraw_from(&ctx, &Account::generate()).await.unwrap_err();
		assert!(matches!(err, Error::ContractRejection { .. }));
		assert_eq!(amount_funded(&ctx, owner.address()).await.unwrap(), funded);
	}
}
