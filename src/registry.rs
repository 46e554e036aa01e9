use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contracts::ContractKind;
use crate::error::Error;

/// A contract instance created by a deploy operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
	pub kind: ContractKind,
	pub address: Address,
	pub tx_hash: B256,
	pub deployer: Address,
	pub deployed_at: DateTime<Utc>,
}

/// Append-only record of deployments on one network, in deployment order.
///
/// Optionally backed by a JSON file so live deployments survive the process
/// that made them.
#[derive(Debug)]
pub struct DeploymentRegistry {
	entries: Mutex<Vec<Deployment>>,
	path: Option<PathBuf>,
}

impl DeploymentRegistry {
	pub fn in_memory() -> Self {
		Self {
			entries: Mutex::new(Vec::new()),
			path: None,
		}
	}

	/// Open a file-backed registry, starting empty if the file does not exist.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
		let path = path.into();
		let entries = if path.exists() {
			let content = std::fs::read_to_string(&path)
				.map_err(|e| Error::Registry(format!("{}: {e}", path.display())))?;
			serde_json::from_str(&content)
				.map_err(|e| Error::Registry(format!("{}: {e}", path.display())))?
		} else {
			Vec::new()
		};
		Ok(Self {
			entries: Mutex::new(entries),
			path: Some(path),
		})
	}

	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// Number of recorded instances of `kind`.
	pub fn count(&self, kind: ContractKind) -> usize {
		self.lock().iter().filter(|d| d.kind == kind).count()
	}

	/// The most recently deployed instance of `kind`.
	pub fn latest(&self, kind: ContractKind) -> Result<Deployment, Error> {
		self.lock()
			.iter()
			.rev()
			.find(|d| d.kind == kind)
			.cloned()
			.ok_or(Error::NoInstanceDeployed(kind))
	}

	pub fn all(&self) -> Vec<Deployment> {
		self.lock().clone()
	}

	/// Append a deployment and, when file-backed, rewrite the map on disk.
	pub fn record(&self, deployment: Deployment) -> Result<(), Error> {
		let mut entries = self.lock();
		entries.push(deployment);

		if let Some(path) = &self.path {
			if let Some(parent) = path.parent() {
				std::fs::create_dir_all(parent)
					.map_err(|e| Error::Registry(format!("{}: {e}", parent.display())))?;
			}
			let json = serde_json::to_string_pretty(&*entries)
				.map_err(|e| Error::Registry(e.to_string()))?;
			std::fs::write(path, json)
				.map_err(|e| Error::Registry(format!("{}: {e}", path.display())))?;
		}
		Ok(())
	}

	fn lock(&self) -> MutexGuard<'_, Vec<Deployment>> {
		// A poisoned lock still holds a consistent append-only list.
		self.entries.lock().unwrap_or_else(|e| e.into_inner())
	}
}
