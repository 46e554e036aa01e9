pub mod dev;
pub mod rpc;

use alloy::primitives::{Address, B256, U256};

use crate::account::Account;
use crate::contracts::ConstructorArgs;

/// Failures reported by the chain layer.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
	#[error("execution reverted: {0}")]
	Reverted(String),

	#[error("insufficient funds: {address} holds {balance} wei, needs {required}")]
	InsufficientFunds {
		address: Address,
		balance: U256,
		required: U256,
	},

	#[error("no contract of the expected kind at {0}")]
	UnknownContract(Address),

	#[error("artifact error: {0}")]
	Artifact(String),

	#[error("source verification failed: {0}")]
	Verification(String),

	#[error("RPC transport error: {0}")]
	Transport(String),
}

/// A contract creation.
#[derive(Debug, Clone)]
pub struct DeployRequest {
	pub signer: Account,
	pub constructor: ConstructorArgs,
}

/// State-changing FundMe entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundMeCall {
	Fund,
	Withdraw,
}

/// Read-only FundMe views, all returning a uint256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundMeQuery {
	EntranceFee,
	Price,
	AmountFunded(Address),
}

/// A signed call against a deployed contract.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
	pub signer: Account,
	pub to: Address,
	pub value: U256,
	pub call: FundMeCall,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
	pub tx_hash: B256,
	/// Set for contract creations.
	pub contract_address: Option<Address>,
}

/// The blockchain a deployment context talks to.  Every call blocks until
/// the node has answered or the transaction is mined.
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
	/// The node's pre-funded local account set, in order.
	async fn accounts(&self) -> Result<Vec<Account>, ChainError>;

	async fn balance(&self, address: Address) -> Result<U256, ChainError>;

	async fn deploy(&self, request: DeployRequest) -> Result<Receipt, ChainError>;

	async fn query(&self, to: Address, query: FundMeQuery) -> Result<U256, ChainError>;

	async fn send(&self, request: TransactionRequest) -> Result<Receipt, ChainError>;
}
