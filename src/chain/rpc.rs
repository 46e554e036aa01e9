use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest as RpcTransaction;
use alloy::sol_types::SolCall;
use alloy::transports::TransportError;

use super::{
	Chain, ChainError, DeployRequest, FundMeCall, FundMeQuery, Receipt, TransactionRequest,
};
use crate::account::Account;
use crate::artifacts::Artifact;
use crate::contracts::IFundMe;

/// A node reached over JSON-RPC.
///
/// Accounts without a key are assumed to be unlocked on the node and go
/// through `eth_sendTransaction`; keyed accounts sign locally through a
/// wallet-enabled provider built on first use.
pub struct RpcChain {
	url: reqwest::Url,
	provider: DynProvider,
	signers: Mutex<HashMap<Address, DynProvider>>,
	artifacts: PathBuf,
}

impl RpcChain {
	pub fn connect(url: &str, artifacts: PathBuf) -> Result<Self, ChainError> {
		let url: reqwest::Url = url
			.parse()
			.map_err(|e| ChainError::Transport(format!("invalid RPC url `{url}`: {e}")))?;
		let provider = ProviderBuilder::new().connect_http(url.clone()).erased();

		Ok(Self {
			url,
			provider,
			signers: Mutex::new(HashMap::new()),
			artifacts,
		})
	}

	/// The provider that will get `account`'s transaction signed.
	fn provider_for(&self, account: &Account) -> DynProvider {
		let Some(signer) = account.signer() else {
			return self.provider.clone();
		};

		let mut signers = self.signers.lock().unwrap_or_else(|e| e.into_inner());
		signers
			.entry(account.address())
			.or_insert_with(|| {
				ProviderBuilder::new()
					.wallet(EthereumWallet::from(signer.clone()))
					.connect_http(self.url.clone())
					.erased()
			})
			.clone()
	}

	async fn submit(&self, account: &Account, tx: RpcTransaction) -> Result<Receipt, ChainError> {
		let receipt = self
			.provider_for(account)
			.send_transaction(tx.with_from(account.address()))
			.await
			.map_err(classify)?
			.get_receipt()
			.await
			.map_err(|e| ChainError::Transport(e.to_string()))?;

		if !receipt.status() {
			return Err(ChainError::Reverted(format!(
				"transaction {} reverted",
				receipt.transaction_hash
			)));
		}
		tracing::debug!(tx = %receipt.transaction_hash, "transaction confirmed");

		Ok(Receipt {
			tx_hash: receipt.transaction_hash,
			contract_address: receipt.contract_address,
		})
	}

	async fn call(&self, to: Address, input: Vec<u8>) -> Result<Bytes, ChainError> {
		let tx = RpcTransaction::default()
			.with_to(to)
			.with_input(Bytes::from(input));
		self.provider.call(tx).await.map_err(classify)
	}
}

#[async_trait::async_trait]
impl Chain for RpcChain {
	async fn accounts(&self) -> Result<Vec<Account>, ChainError> {
		let addresses = self.provider.get_accounts().await.map_err(classify)?;
		Ok(addresses.into_iter().map(Account::unlocked).collect())
	}

	async fn balance(&self, address: Address) -> Result<U256, ChainError> {
		self.provider.get_balance(address).await.map_err(classify)
	}

	async fn deploy(&self, request: DeployRequest) -> Result<Receipt, ChainError> {
		let kind = request.constructor.kind();
		let artifact = Artifact::load(&self.artifacts, kind)?;
		let code = artifact.creation_code(&request.constructor.abi_encode())?;

		let tx = RpcTransaction::default().with_deploy_code(Bytes::from(code));
		let receipt = self.submit(&request.signer, tx).await?;
		if receipt.contract_address.is_none() {
			return Err(ChainError::Transport(format!(
				"{kind} creation receipt has no contract address"
			)));
		}
		Ok(receipt)
	}

	async fn query(&self, to: Address, query: FundMeQuery) -> Result<U256, ChainError> {
		let decoded = match query {
			FundMeQuery::EntranceFee => {
				let out = self.call(to, IFundMe::getEntranceFeeCall {}.abi_encode()).await?;
				IFundMe::getEntranceFeeCall::abi_decode_returns(&out)
			}
			FundMeQuery::Price => {
				let out = self.call(to, IFundMe::getPriceCall {}.abi_encode()).await?;
				IFundMe::getPriceCall::abi_decode_returns(&out)
			}
			FundMeQuery::AmountFunded(funder) => {
				let input = IFundMe::addressToAmountFundedCall { funder }.abi_encode();
				let out = self.call(to, input).await?;
				IFundMe::addressToAmountFundedCall::abi_decode_returns(&out)
			}
		};
		decoded.map_err(|e| ChainError::Transport(format!("undecodable return data: {e}")))
	}

	async fn send(&self, request: TransactionRequest) -> Result<Receipt, ChainError> {
		let input = match request.call {
			FundMeCall::Fund => IFundMe::fundCall {}.abi_encode(),
			FundMeCall::Withdraw => IFundMe::withdrawCall {}.abi_encode(),
		};
		let tx = RpcTransaction::default()
			.with_to(request.to)
			.with_value(request.value)
			.with_input(Bytes::from(input));
		self.submit(&request.signer, tx).await
	}
}

/// Node errors that mention a revert are contract rejections; everything
/// else is a transport problem.
fn classify(err: TransportError) -> ChainError {
	if let Some(payload) = err.as_error_resp() {
		if payload.message.to_lowercase().contains("revert") {
			return ChainError::Reverted(payload.message.to_string());
		}
	}
	ChainError::Transport(err.to_string())
}
