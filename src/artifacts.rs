use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::chain::ChainError;
use crate::contracts::ContractKind;

/// A compiled contract as written by the build toolchain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
	pub contract_name: String,
	bytecode: BytecodeField,
	/// Flattened Solidity source, needed for source publication.
	#[serde(default)]
	pub source: Option<String>,
	#[serde(default)]
	pub compiler: Option<CompilerInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
	Hex(String),
	Object { object: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompilerInfo {
	pub version: String,
	#[serde(default)]
	pub optimizer: Optimizer,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Optimizer {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default)]
	pub runs: u32,
}

impl Artifact {
	/// Path of the artifact for `kind` inside `dir`.
	pub fn path(dir: &Path, kind: ContractKind) -> PathBuf {
		dir.join(format!("{}.json", kind.name()))
	}

	pub fn load(dir: &Path, kind: ContractKind) -> Result<Self, ChainError> {
		let path = Self::path(dir, kind);
		let content = std::fs::read_to_string(&path)
			.map_err(|e| ChainError::Artifact(format!("{}: {e}", path.display())))?;
		Self::parse(&content)
	}

	pub fn parse(content: &str) -> Result<Self, ChainError> {
		serde_json::from_str(content).map_err(|e| ChainError::Artifact(e.to_string()))
	}

	/// Creation bytecode.
	pub fn bytecode(&self) -> Result<Vec<u8>, ChainError> {
		let raw = match &self.bytecode {
			BytecodeField::Hex(s) => s,
			BytecodeField::Object { object } => object,
		};
		let raw = raw.strip_prefix("0x").unwrap_or(raw);
		if raw.is_empty() {
			return Err(ChainError::Artifact(format!(
				"{} has no creation bytecode (abstract contract or interface?)",
				self.contract_name
			)));
		}
		hex::decode(raw).map_err(|e| {
			ChainError::Artifact(format!("{} bytecode is not hex: {e}", self.contract_name))
		})
	}

	/// Creation bytecode followed by the ABI-encoded constructor arguments.
	pub fn creation_code(&self, constructor_args: &[u8]) -> Result<Vec<u8>, ChainError> {
		let mut code = self.bytecode()?;
		code.extend_from_slice(constructor_args);
		Ok(code)
	}
}
