//! In-process development chain.
//!
//! The `development` network needs no node: this simulator keeps balances,
//! nonces and the state of the two contracts in memory for the lifetime of
//! the process, mirroring the Solidity sources of FundMe and
//! MockV3Aggregator.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::{keccak256, Address, B256, I256, U256};
use alloy::signers::local::PrivateKeySigner;
use sha2::{Digest, Sha256};

use super::{
	Chain, ChainError, DeployRequest, FundMeCall, FundMeQuery, Receipt, TransactionRequest,
};
use crate::account::Account;
use crate::contracts::ConstructorArgs;

const DEFAULT_ACCOUNTS: usize = 10;
const INITIAL_BALANCE_ETH: u64 = 100;

fn ether(amount: u64) -> U256 {
	U256::from(amount) * U256::from(10u64).pow(U256::from(18))
}

fn pow10(exp: u8) -> U256 {
	U256::from(10u64).pow(U256::from(exp))
}

/// Minimum funding value in USD with 18 decimals.
fn minimum_usd() -> U256 {
	ether(50)
}

#[derive(Debug)]
enum Contract {
	Aggregator {
		decimals: u8,
		answer: I256,
	},
	FundMe {
		owner: Address,
		price_feed: Address,
		funded: HashMap<Address, U256>,
		funders: Vec<Address>,
	},
}

#[derive(Debug, Default)]
struct State {
	balances: HashMap<Address, U256>,
	nonces: HashMap<Address, u64>,
	contracts: HashMap<Address, Contract>,
}

impl State {
	fn balance(&self, address: &Address) -> U256 {
		self.balances.get(address).copied().unwrap_or_default()
	}

	/// Consume the sender's next nonce and derive a transaction hash from it.
	fn next_tx(&mut self, from: Address) -> (u64, B256) {
		let nonce = self.nonces.entry(from).or_default();
		let current = *nonce;
		*nonce += 1;

		let mut preimage = from.to_vec();
		preimage.extend_from_slice(&current.to_be_bytes());
		(current, keccak256(preimage))
	}

	fn transfer(&mut self, from: Address, to: Address, value: U256) -> Result<(), ChainError> {
		if value.is_zero() {
			return Ok(());
		}
		let balance = self.balance(&from);
		if balance < value {
			return Err(ChainError::InsufficientFunds {
				address: from,
				balance,
				required: value,
			});
		}
		self.balances.insert(from, balance - value);
		*self.balances.entry(to).or_default() += value;
		Ok(())
	}

	/// `getPrice()`: the feed answer scaled from the feed's decimals to 18.
	fn price(&self, fund_me: Address) -> Result<U256, ChainError> {
		let Some(Contract::FundMe { price_feed, .. }) = self.contracts.get(&fund_me) else {
			return Err(ChainError::UnknownContract(fund_me));
		};
		let Some(Contract::Aggregator { decimals, answer }) = self.contracts.get(price_feed) else {
			return Err(ChainError::Reverted("price feed call failed".into()));
		};
		if answer.is_negative() {
			return Err(ChainError::Reverted("negative price feed answer".into()));
		}
		let answer = answer.into_raw();
		Ok(match 18u8.checked_sub(*decimals) {
			Some(up) => answer * pow10(up),
			None => answer / pow10(*decimals - 18),
		})
	}

	/// `getConversionRate(ethAmount)`: USD value with 18 decimals.
	fn conversion_rate(&self, fund_me: Address, amount: U256) -> Result<U256, ChainError> {
		Ok(self.price(fund_me)? * amount / ether(1))
	}

	fn entrance_fee(&self, fund_me: Address) -> Result<U256, ChainError> {
		let price = self.price(fund_me)?;
		if price.is_zero() {
			return Err(ChainError::Reverted("division by zero".into()));
		}
		Ok(minimum_usd() * ether(1) / price + U256::from(1))
	}
}

/// Ephemeral single-process chain with deterministic pre-funded accounts.
#[derive(Debug)]
pub struct DevChain {
	accounts: Vec<Account>,
	state: Mutex<State>,
}

impl Default for DevChain {
	fn default() -> Self {
		Self::new()
	}
}

impl DevChain {
	pub fn new() -> Self {
		Self::with_accounts(DEFAULT_ACCOUNTS)
	}

	/// A chain with `count` pre-funded accounts.  The keys are derived from
	/// the account index, so every run sees the same addresses.
	pub fn with_accounts(count: usize) -> Self {
		let accounts: Vec<Account> = (0u64..)
			.filter_map(|salt| {
				let seed = Sha256::digest(format!("fund-me development account {salt}"));
				PrivateKeySigner::from_slice(&seed).ok()
			})
			.take(count)
			.map(Account::from_signer)
			.collect();

		let mut state = State::default();
		for account in &accounts {
			state.balances.insert(account.address(), ether(INITIAL_BALANCE_ETH));
		}

		Self {
			accounts,
			state: Mutex::new(state),
		}
	}

	/// The pre-funded accounts, without going through the async trait.
	pub fn accounts_now(&self) -> Vec<Account> {
		self.accounts.clone()
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|e| e.into_inner())
	}
}

#[async_trait::async_trait]
impl Chain for DevChain {
	async fn accounts(&self) -> Result<Vec<Account>, ChainError> {
		Ok(self.accounts_now())
	}

	async fn balance(&self, address: Address) -> Result<U256, ChainError> {
		Ok(self.lock().balance(&address))
	}

	async fn deploy(&self, request: DeployRequest) -> Result<Receipt, ChainError> {
		let deployer = request.signer.address();

		let contract = match request.constructor {
			ConstructorArgs::MockV3Aggregator {
				decimals,
				initial_answer,
			} => Contract::Aggregator {
				decimals,
				answer: initial_answer,
			},
			ConstructorArgs::FundMe { price_feed } => Contract::FundMe {
				owner: deployer,
				price_feed,
				funded: HashMap::new(),
				funders: Vec::new(),
			},
		};

		let mut state = self.lock();
		let (nonce, tx_hash) = state.next_tx(deployer);
		let address = deployer.create(nonce);
		state.contracts.insert(address, contract);

		Ok(Receipt {
			tx_hash,
			contract_address: Some(address),
		})
	}

	async fn query(&self, to: Address, query: FundMeQuery) -> Result<U256, ChainError> {
		let state = self.lock();
		let Some(Contract::FundMe { funded, .. }) = state.contracts.get(&to) else {
			return Err(ChainError::UnknownContract(to));
		};

		match query {
			FundMeQuery::AmountFunded(funder) => {
				Ok(funded.get(&funder).copied().unwrap_or_default())
			}
			FundMeQuery::Price => state.price(to),
			FundMeQuery::EntranceFee => state.entrance_fee(to),
		}
	}

	async fn send(&self, request: TransactionRequest) -> Result<Receipt, ChainError> {
		let sender = request.signer.address();
		let mut state = self.lock();

		let owner = match state.contracts.get(&request.to) {
			Some(Contract::FundMe { owner, .. }) => *owner,
			_ => return Err(ChainError::UnknownContract(request.to)),
		};

		// Every check happens before the first mutation so a revert leaves
		// the state untouched.
		let available = state.balance(&sender);
		if available < request.value {
			return Err(ChainError::InsufficientFunds {
				address: sender,
				balance: available,
				required: request.value,
			});
		}
		match request.call {
			FundMeCall::Fund => {
				if state.conversion_rate(request.to, request.value)? < minimum_usd() {
					return Err(ChainError::Reverted("You need to spend more ETH!".into()));
				}
			}
			FundMeCall::Withdraw => {
				if sender != owner {
					return Err(ChainError::Reverted("caller is not the owner".into()));
				}
			}
		}

		let (_, tx_hash) = state.next_tx(sender);
		state.transfer(sender, request.to, request.value)?;

		match request.call {
			FundMeCall::Fund => {
				if let Some(Contract::FundMe { funded, funders, .. }) =
					state.contracts.get_mut(&request.to)
				{
					*funded.entry(sender).or_default() += request.value;
					funders.push(sender);
				}
			}
			FundMeCall::Withdraw => {
				let payout = state.balance(&request.to);
				state.transfer(request.to, owner, payout)?;
				if let Some(Contract::FundMe { funded, funders, .. }) =
					state.contracts.get_mut(&request.to)
				{
					for funder in funders.drain(..) {
						funded.insert(funder, U256::ZERO);
					}
				}
			}
		}

		Ok(Receipt {
			tx_hash,
			contract_address: None,
		})
	}
}
