use crate::account::Account;
use crate::chain::DeployRequest;
use crate::context::DeploymentContext;
use crate::contracts::{ConstructorArgs, ContractKind};
use crate::error::Error;
use crate::registry::Deployment;

/// Get-or-create the session's mock price feed.
///
/// Deploys a `MockV3Aggregator` (8 decimals, 2000 USD) only when the registry
/// holds none, and returns the most recent one either way.  The count check
/// and the deploy run under the context's provisioning lock, so concurrent
/// callers cannot both observe zero and both deploy.
pub async fn ensure_mock_deployed(
	ctx: &DeploymentContext,
	account: &Account,
) -> Result<Deployment, Error> {
	let _guard = ctx.provision_lock().lock().await;
	tracing::info!(network = ctx.network(), "Deploying mocks...");

	if ctx.registry().count(ContractKind::MockV3Aggregator) == 0 {
		ctx.deploy(
			DeployRequest {
				signer: account.clone(),
				constructor: ConstructorArgs::default_mock(),
			},
			false,
		)
		.await?;
	}

	let mock = ctx.registry().latest(ContractKind::MockV3Aggregator)?;
	tracing::info!(address = %mock.address, "Mocks deployed.");
	Ok(mock)
}
