use std::fmt;

/// Networks backed by an ephemeral local simulator with pre-funded accounts.
pub const LOCAL_BLOCKCHAIN_ENVIRONMENTS: &[&str] = &["development", "ganache-local"];

/// Local simulators that mirror live chain state at a fork point.
pub const FORKED_LOCAL_ENVIRONMENTS: &[&str] = &["mainnet-fork"];

/// The in-process network that needs no node at all.
pub const DEVELOPMENT: &str = "development";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkClass {
	Local,
	ForkedLocal,
	Live,
}

impl NetworkClass {
	/// Local and forked-local networks share every decision path: mocks,
	/// pre-funded accounts and no source publication.
	pub fn is_local(self) -> bool {
		matches!(self, Self::Local | Self::ForkedLocal)
	}
}

impl fmt::Display for NetworkClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Local => "local",
			Self::ForkedLocal => "forked-local",
			Self::Live => "live",
		})
	}
}

/// Classify a network name. Total over all strings: anything not known to be
/// local is treated as live.
pub fn classify(name: &str) -> NetworkClass {
	if LOCAL_BLOCKCHAIN_ENVIRONMENTS.contains(&name) {
		NetworkClass::Local
	} else if FORKED_LOCAL_ENVIRONMENTS.contains(&name) {
		NetworkClass::ForkedLocal
	} else {
		NetworkClass::Live
	}
}
