use std::sync::Arc;

use chrono::Utc;

use crate::artifacts::Artifact;
use crate::chain::dev::DevChain;
use crate::chain::rpc::RpcChain;
use crate::chain::{Chain, DeployRequest};
use crate::config::Config;
use crate::error::Error;
use crate::network::{self, NetworkClass};
use crate::registry::{Deployment, DeploymentRegistry};
use crate::verify::EtherscanClient;

/// Everything an operation needs to know about where it runs, threaded
/// through every call instead of living in process-wide state.
pub struct DeploymentContext {
	network: String,
	class: NetworkClass,
	config: Config,
	chain: Arc<dyn Chain>,
	registry: DeploymentRegistry,
	verifier: Option<EtherscanClient>,
	/// Serializes the mock feed's check-and-deploy sequence.
	provision_lock: tokio::sync::Mutex<()>,
}

impl DeploymentContext {
	/// Wire a context from explicit parts.  The network is classified once
	/// here and never re-read.
	pub fn new(
		network: &str,
		config: Config,
		chain: Arc<dyn Chain>,
		registry: DeploymentRegistry,
	) -> Self {
		Self {
			network: network.to_owned(),
			class: network::classify(network),
			config,
			chain,
			registry,
			verifier: None,
			provision_lock: tokio::sync::Mutex::new(()),
		}
	}

	/// Publish sources of contracts deployed with `publish_source` through
	/// this explorer client.
	pub fn with_verifier(mut self, verifier: EtherscanClient) -> Self {
		self.verifier = Some(verifier);
		self
	}

	/// Build the chain and registry the configuration describes for
	/// `network`: the in-process chain for `development`, a JSON-RPC node
	/// for everything else.
	pub fn connect(network: &str, config: Config) -> Result<Self, Error> {
		if network == network::DEVELOPMENT {
			return Ok(Self::new(
				network,
				config,
				Arc::new(DevChain::new()),
				DeploymentRegistry::in_memory(),
			));
		}

		let class = network::classify(network);
		let host = config.host(network).ok_or_else(|| Error::ConfigKeyMissing {
			network: network.to_owned(),
			key: "host",
		})?;
		let chain = RpcChain::connect(&host, config.project.artifacts.clone())?;

		let registry = if class == NetworkClass::Live || config.project.dev_deployment_artifacts {
			DeploymentRegistry::open(config.project.deployments.join(format!("{network}.json")))?
		} else {
			DeploymentRegistry::in_memory()
		};

		let explorer = config.network(network).and_then(|n| n.explorer.as_deref());
		let verifier = match (explorer, config.etherscan_key()) {
			(Some(api), Some(key)) => Some(EtherscanClient::new(api, &key)),
			_ => None,
		};

		let ctx = Self::new(network, config, Arc::new(chain), registry);
		Ok(match verifier {
			Some(v) => ctx.with_verifier(v),
			None => ctx,
		})
	}

	pub fn network(&self) -> &str {
		&self.network
	}

	pub fn class(&self) -> NetworkClass {
		self.class
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn chain(&self) -> &dyn Chain {
		self.chain.as_ref()
	}

	pub fn registry(&self) -> &DeploymentRegistry {
		&self.registry
	}

	pub(crate) fn provision_lock(&self) -> &tokio::sync::Mutex<()> {
		&self.provision_lock
	}

	/// Run a contract creation, record it in the registry and, when asked,
	/// publish its source.  The deployment is recorded before publication so
	/// a failed verification never hides a contract that exists on chain.
	pub async fn deploy(
		&self,
		request: DeployRequest,
		publish_source: bool,
	) -> Result<Deployment, Error> {
		let kind = request.constructor.kind();
		let deployer = request.signer.address();
		let constructor_args = request.constructor.abi_encode();

		let receipt = self.chain.deploy(request).await?;
		let address = receipt.contract_address.ok_or_else(|| {
			Error::Registry(format!("{kind} deployment {} returned no address", receipt.tx_hash))
		})?;

		let deployment = Deployment {
			kind,
			address,
			tx_hash: receipt.tx_hash,
			deployer,
			deployed_at: Utc::now(),
		};
		self.registry.record(deployment.clone())?;
		tracing::debug!(%kind, %address, tx = %receipt.tx_hash, "deployment recorded");

		if publish_source {
			self.publish(&deployment, &constructor_args).await?;
		}
		Ok(deployment)
	}

	async fn publish(&self, deployment: &Deployment, constructor_args: &[u8]) -> Result<(), Error> {
		let Some(verifier) = &self.verifier else {
			let explorer_set = self
				.config
				.network(&self.network)
				.is_some_and(|n| n.explorer.is_some());
			return Err(if explorer_set {
				Error::ConfigKeyMissing {
					network: self.network.clone(),
					key: "etherscan.api_key",
				}
			} else {
				Error::ConfigKeyMissing {
					network: self.network.clone(),
					key: "explorer",
				}
			});
		};

		tracing::info!(contract = %deployment.kind, address = %deployment.address, "publishing source");
		let artifact = Artifact::load(&self.config.project.artifacts, deployment.kind)?;
		verifier
			.publish(&artifact, deployment.address, constructor_args)
			.await?;
		Ok(())
	}
}
