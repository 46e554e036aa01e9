use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Project configuration, one table per network plus wallet and explorer
/// credentials.  Values may reference environment variables as `${NAME}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
	#[serde(default)]
	pub project: ProjectConfig,
	#[serde(default)]
	pub wallets: WalletConfig,
	#[serde(default)]
	pub etherscan: EtherscanConfig,
	#[serde(default)]
	pub networks: BTreeMap<String, NetworkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
	/// Directory holding compiled contract artifacts (`<Name>.json`).
	#[serde(default = "default_artifacts")]
	pub artifacts: PathBuf,
	/// Directory where deployment maps are written, one file per network.
	#[serde(default = "default_deployments")]
	pub deployments: PathBuf,
	/// Also persist deployments made on external local nodes.
	#[serde(default)]
	pub dev_deployment_artifacts: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
	pub from_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtherscanConfig {
	pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkConfig {
	/// JSON-RPC endpoint.
	pub host: Option<String>,
	/// Block explorer API used for source publication.
	pub explorer: Option<String>,
	pub eth_usd_price_feed: Option<String>,
	pub verify: Option<bool>,
}

/// Project file looked up in the working directory when no path is given.
pub const DEFAULT_FILE: &str = "fund-me.toml";

fn default_artifacts() -> PathBuf {
	PathBuf::from("build/contracts")
}

fn default_deployments() -> PathBuf {
	PathBuf::from("build/deployments")
}

impl Default for ProjectConfig {
	fn default() -> Self {
		Self {
			artifacts: default_artifacts(),
			deployments: default_deployments(),
			dev_deployment_artifacts: false,
		}
	}
}

impl Config {
	/// Per-user fallback directory (~/.fund-me/).
	pub fn dir() -> Option<PathBuf> {
		dirs::home_dir().map(|home| home.join(".fund-me"))
	}

	/// Load the config at an explicit `path`, which must exist.  Without one,
	/// look for `fund-me.toml`, then the per-user file, then use defaults.
	pub fn load(path: Option<&Path>) -> Result<Self, Error> {
		if let Some(path) = path {
			if !path.exists() {
				return Err(Error::Config(format!("{}: file not found", path.display())));
			}
			return Self::read(path);
		}

		let fallback = Self::dir().map(|d| d.join("config.toml"));
		let found = std::iter::once(PathBuf::from(DEFAULT_FILE))
			.chain(fallback)
			.find(|p| p.exists());

		match found {
			Some(p) => Self::read(&p),
			None => Ok(Self::default()),
		}
	}

	fn read(path: &Path) -> Result<Self, Error> {
		tracing::debug!(path = %path.display(), "loading configuration");
		let content = std::fs::read_to_string(path)
			.map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
		Self::parse(&content)
	}

	pub fn parse(content: &str) -> Result<Self, Error> {
		toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
	}

	/// The table for a network, if any.
	pub fn network(&self, name: &str) -> Option<&NetworkConfig> {
		self.networks.get(name)
	}

	/// The live-wallet private key, environment-expanded.
	pub fn wallet_key(&self) -> Option<String> {
		self.wallets.from_key.as_deref().and_then(expand_env)
	}

	pub fn etherscan_key(&self) -> Option<String> {
		self.etherscan.api_key.as_deref().and_then(expand_env)
	}

	/// RPC endpoint for a network, environment-expanded.
	pub fn host(&self, name: &str) -> Option<String> {
		self.network(name)?.host.as_deref().and_then(expand_env)
	}
}

/// Replace every `${NAME}` with the value of the environment variable. A
/// reference to an unset variable makes the whole value absent.
pub fn expand_env(value: &str) -> Option<String> {
	let mut out = String::with_capacity(value.len());
	let mut rest = value;

	while let Some(start) = rest.find("${") {
		out.push_str(&rest[..start]);
		let after = &rest[start + 2..];
		let end = after.find('}')?;
		let var = std::env::var(&after[..end]).ok()?;
		out.push_str(&var);
		rest = &after[end + 1..];
	}
	out.push_str(rest);

	Some(out).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"
[wallets]
from_key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"

[networks.rinkeby]
host = "https://rinkeby.example/rpc"
eth_usd_price_feed = "0x8A753747A1Fa494EC906cE90E9f37563A8AF630e"
verify = true

[networks.ganache-local]
host = "http://127.0.0.1:8545"
"#;

	#[test]
	fn defaults_are_sensible() {
		let c = Config::default();
		assert_eq!(c.project.artifacts, PathBuf::from("build/contracts"));
		assert_eq!(c.project.deployments, PathBuf::from("build/deployments"));
		assert!(!c.project.dev_deployment_artifacts);
		assert!(c.wallets.from_key.is_none());
		assert!(c.networks.is_empty());
	}

	#[test]
	fn parses_network_tables() {
		let c = Config::parse(SAMPLE).unwrap();
		let rinkeby = c.network("rinkeby").unwrap();
		assert_eq!(rinkeby.verify, Some(true));
		assert_eq!(
			rinkeby.eth_usd_price_feed.as_deref(),
			Some("0x8A753747A1Fa494EC906cE90E9f37563A8AF630e")
		);

		// Missing keys stay absent rather than defaulting.
		let ganache = c.network("ganache-local").unwrap();
		assert!(ganache.eth_usd_price_feed.is_none());
		assert!(ganache.verify.is_none());
		assert_eq!(c.host("ganache-local").as_deref(), Some("http://127.0.0.1:8545"));
		assert!(c.network("mainnet").is_none());
	}

	#[test]
	fn toml_roundtrip() {
		let c = Config::parse(SAMPLE).unwrap();
		let serialized = toml::to_string_pretty(&c).unwrap();
		let parsed = Config::parse(&serialized).unwrap();
		assert_eq!(parsed.wallets.from_key, c.wallets.from_key);
		assert_eq!(parsed.networks.len(), 2);
	}

	#[test]
	fn rejects_malformed_toml() {
		assert!(matches!(Config::parse("[networks"), Err(Error::Config(_))));
	}

	#[test]
	fn env_expansion() {
		std::env::set_var("FUND_ME_TEST_PROJECT_ID", "abc123");
		assert_eq!(
			expand_env("https://node/${FUND_ME_TEST_PROJECT_ID}/rpc").as_deref(),
			Some("https://node/abc123/rpc")
		);
		assert_eq!(expand_env("plain").as_deref(), Some("plain"));
		assert!(expand_env("${FUND_ME_TEST_SURELY_UNSET}").is_none());
		assert!(expand_env("${UNTERMINATED").is_none());
		assert!(expand_env("").is_none());
	}

	#[test]
	fn explicit_missing_file_is_an_error() {
		let path = std::env::temp_dir().join("fund-me-no-such-config.toml");
		let err = Config::load(Some(&path)).unwrap_err();
		assert!(matches!(err, Error::Config(ref m) if m.contains("fund-me-no-such-config.toml")));
	}

	#[test]
	fn explicit_file_is_loaded() {
		let path = std::env::temp_dir().join(format!("fund-me-{}.toml", rand::random::<u64>()));
		std::fs::write(&path, SAMPLE).unwrap();
		let c = Config::load(Some(&path)).unwrap();
		assert_eq!(c.network("rinkeby").unwrap().verify, Some(true));
		let _ = std::fs::remove_file(&path);
	}

	#[test]
	fn unset_wallet_key_is_absent() {
		let c = Config::parse("[wallets]\nfrom_key = \"${FUND_ME_TEST_NO_SUCH_KEY}\"\n").unwrap();
		assert!(c.wallet_key().is_none());
	}
}
