use std::fmt;

use alloy::primitives::{Address, I256, U256};
use alloy::sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// Decimals reported by the mock price feed.
pub const DECIMALS: u8 = 8;

/// Starting ETH/USD answer of the mock feed: 2000 USD with 8 decimals.
pub const STARTING_PRICE: u64 = 200_000_000_000;

/// The contracts this tool knows how to deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContractKind {
	FundMe,
	MockV3Aggregator,
}

impl ContractKind {
	/// Name of the compiled artifact (`<name>.json`).
	pub fn name(self) -> &'static str {
		match self {
			Self::FundMe => "FundMe",
			Self::MockV3Aggregator => "MockV3Aggregator",
		}
	}
}

impl fmt::Display for ContractKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Constructor arguments, one variant per deployable contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArgs {
	MockV3Aggregator { decimals: u8, initial_answer: I256 },
	FundMe { price_feed: Address },
}

impl ConstructorArgs {
	/// The mock feed with the fixed starting parameters.
	pub fn default_mock() -> Self {
		Self::MockV3Aggregator {
			decimals: DECIMALS,
			initial_answer: I256::from_raw(U256::from(STARTING_PRICE)),
		}
	}

	pub fn kind(&self) -> ContractKind {
		match self {
			Self::MockV3Aggregator { .. } => ContractKind::MockV3Aggregator,
			Self::FundMe { .. } => ContractKind::FundMe,
		}
	}

	/// ABI-encoded arguments, appended to the creation bytecode.
	pub fn abi_encode(&self) -> Vec<u8> {
		match self {
			Self::MockV3Aggregator {
				decimals,
				initial_answer,
			} => (U256::from(*decimals), *initial_answer).abi_encode_params(),
			Self::FundMe { price_feed } => (*price_feed,).abi_encode_params(),
		}
	}
}

alloy::sol! {
	/// Call surface of the deployed FundMe contract.
	interface IFundMe {
		function fund() external payable;
		function withdraw() external;
		function getEntranceFee() external view returns (uint256);
		function getPrice() external view returns (uint256);
		function addressToAmountFunded(address funder) external view returns (uint256);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mock_defaults() {
		let args = ConstructorArgs::default_mock();
		assert_eq!(args.kind(), ContractKind::MockV3Aggregator);
		match args {
			ConstructorArgs::MockV3Aggregator {
				decimals,
				initial_answer,
			} => {
				assert_eq!(decimals, 8);
				assert_eq!(initial_answer.into_raw(), U256::from(200_000_000_000u64));
			}
			other => panic!("unexpected args {other:?}"),
		}
	}

	#[test]
	fn constructor_args_are_word_aligned() {
		let mock = ConstructorArgs::default_mock().abi_encode();
		assert_eq!(mock.len(), 64);
		// uint8 decimals occupy a full word, right-aligned.
		assert!(mock[..31].iter().all(|b| *b == 0));
		assert_eq!(mock[31], DECIMALS);
		assert_eq!(U256::from_be_slice(&mock[32..]), U256::from(STARTING_PRICE));

		let feed = Address::repeat_byte(0x11);
		let encoded = ConstructorArgs::FundMe { price_feed: feed }.abi_encode();
		assert_eq!(encoded.len(), 32);
		assert_eq!(&encoded[12..], feed.as_slice());
		assert!(encoded[..12].iter().all(|b| *b == 0));
	}

	#[test]
	fn artifact_names() {
		assert_eq!(ContractKind::FundMe.to_string(), "FundMe");
		assert_eq!(ContractKind::MockV3Aggregator.name(), "MockV3Aggregator");
	}
}
