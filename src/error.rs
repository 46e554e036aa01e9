use crate::chain::ChainError;
use crate::contracts::ContractKind;

/// Failures surfaced by deployment and interaction operations.  Nothing in
/// this crate catches or retries them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("network `{network}` has no `{key}` entry in the configuration")]
	ConfigKeyMissing { network: String, key: &'static str },

	#[error("no signing key configured for live network `{0}` (set wallets.from_key)")]
	MissingCredential(String),

	#[error("the local chain exposes no pre-funded accounts")]
	NoLocalAccounts,

	#[error("no {0} contract has been deployed on this network")]
	NoInstanceDeployed(ContractKind),

	#[error("transaction rejected by contract: {reason}")]
	ContractRejection { reason: String },

	#[error("invalid private key: {0}")]
	InvalidKey(String),

	#[error("invalid address `{value}`")]
	InvalidAddress { value: String },

	#[error("configuration error: {0}")]
	Config(String),

	#[error("deployment registry error: {0}")]
	Registry(String),

	#[error(transparent)]
	Chain(ChainError),
}

impl From<ChainError> for Error {
	fn from(err: ChainError) -> Self {
		match err {
			ChainError::Reverted(reason) => Self::ContractRejection { reason },
			other => Self::Chain(other),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reverts_become_contract_rejections() {
		let err = Error::from(ChainError::Reverted("not owner".into()));
		assert!(matches!(err, Error::ContractRejection { ref reason } if reason == "not owner"));
	}

	#[test]
	fn transport_failures_stay_chain_errors() {
		let err = Error::from(ChainError::Transport("connection refused".into()));
		assert!(matches!(err, Error::Chain(ChainError::Transport(_))));
		assert_eq!(err.to_string(), "RPC transport error: connection refused");
	}
}
