use std::time::Duration;

use alloy::primitives::Address;
use serde::Deserialize;

use crate::artifacts::Artifact;
use crate::chain::ChainError;

const STATUS_POLLS: u32 = 12;
const STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// Publishes contract sources to an Etherscan-compatible explorer API.
#[derive(Debug, Clone)]
pub struct EtherscanClient {
	http: reqwest::Client,
	api_url: String,
	api_key: String,
}

/// Envelope shared by every Etherscan API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
	status: String,
	#[serde(default)]
	message: String,
	result: String,
}

#[derive(Debug, PartialEq, Eq)]
enum VerificationStatus {
	Pending,
	Verified,
	Failed(String),
}

impl EtherscanClient {
	pub fn new(api_url: &str, api_key: &str) -> Self {
		Self {
			http: reqwest::Client::new(),
			api_url: api_url.to_owned(),
			api_key: api_key.to_owned(),
		}
	}

	/// Submit the artifact's source for the contract at `address` and wait
	/// until the explorer reports a final verdict.
	pub async fn publish(
		&self,
		artifact: &Artifact,
		address: Address,
		constructor_args: &[u8],
	) -> Result<(), ChainError> {
		let source = artifact.source.as_deref().ok_or_else(|| {
			ChainError::Verification(format!("{} artifact has no source", artifact.contract_name))
		})?;
		let compiler = artifact.compiler.as_ref().ok_or_else(|| {
			ChainError::Verification(format!(
				"{} artifact has no compiler settings",
				artifact.contract_name
			))
		})?;

		let form = [
			("apikey", self.api_key.clone()),
			("module", "contract".into()),
			("action", "verifysourcecode".into()),
			("contractaddress", format!("{address:#x}")),
			("sourceCode", source.to_owned()),
			("codeformat", "solidity-single-file".into()),
			("contractname", artifact.contract_name.clone()),
			("compilerversion", compiler_version(&compiler.version)),
			("optimizationUsed", u8::from(compiler.optimizer.enabled).to_string()),
			("runs", compiler.optimizer.runs.to_string()),
			// Etherscan's own spelling.
			("constructorArguements", hex::encode(constructor_args)),
		];

		let submitted: ApiResponse = self
			.http
			.post(&self.api_url)
			.form(&form)
			.send()
			.await
			.map_err(transport)?
			.json()
			.await
			.map_err(transport)?;

		if submitted.status != "1" {
			return Err(ChainError::Verification(format!(
				"{}: {}",
				submitted.message, submitted.result
			)));
		}
		let guid = submitted.result;
		tracing::info!(%address, %guid, "source submitted for verification");

		for _ in 0..STATUS_POLLS {
			tokio::time::sleep(STATUS_INTERVAL).await;
			match self.status(&guid).await? {
				VerificationStatus::Pending => continue,
				VerificationStatus::Verified => {
					tracing::info!(%address, "source verified");
					return Ok(());
				}
				VerificationStatus::Failed(reason) => {
					return Err(ChainError::Verification(reason));
				}
			}
		}

		Err(ChainError::Verification(format!(
			"verification {guid} still pending after {STATUS_POLLS} checks"
		)))
	}

	async fn status(&self, guid: &str) -> Result<VerificationStatus, ChainError> {
		let resp: ApiResponse = self
			.http
			.get(&self.api_url)
			.query(&[
				("apikey", self.api_key.as_str()),
				("module", "contract"),
				("action", "checkverifystatus"),
				("guid", guid),
			])
			.send()
			.await
			.map_err(transport)?
			.json()
			.await
			.map_err(transport)?;

		Ok(parse_status(&resp))
	}
}

fn parse_status(resp: &ApiResponse) -> VerificationStatus {
	if resp.result.starts_with("Pending") {
		VerificationStatus::Pending
	} else if resp.status == "1" || resp.result.contains("Already Verified") {
		VerificationStatus::Verified
	} else {
		VerificationStatus::Failed(resp.result.clone())
	}
}

/// Explorers expect the `v` prefix solc itself omits.
fn compiler_version(version: &str) -> String {
	if version.starts_with('v') {
		version.to_owned()
	} else {
		format!("v{version}")
	}
}

fn transport(err: reqwest::Error) -> ChainError {
	ChainError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn resp(status: &str, result: &str) -> ApiResponse {
		ApiResponse {
			status: status.into(),
			message: String::new(),
			result: result.into(),
		}
	}

	#[test]
	fn status_parsing() {
		assert_eq!(parse_status(&resp("0", "Pending in queue")), VerificationStatus::Pending);
		assert_eq!(parse_status(&resp("1", "Pass - Verified")), VerificationStatus::Verified);
		assert_eq!(
			parse_status(&resp("0", "Contract source code already verified. Already Verified")),
			VerificationStatus::Verified
		);
		assert_eq!(
			parse_status(&resp("0", "Fail - Unable to verify")),
			VerificationStatus::Failed("Fail - Unable to verify".into())
		);
	}

	#[test]
	fn compiler_version_prefix() {
		assert_eq!(compiler_version("0.6.6+commit.6c089d02"), "v0.6.6+commit.6c089d02");
		assert_eq!(compiler_version("v0.8.0"), "v0.8.0");
	}

	#[test]
	fn response_envelope_deserializes() {
		let r: ApiResponse =
			serde_json::from_str(r#"{"status":"1","message":"OK","result":"abc"}"#).unwrap();
		assert_eq!(r.result, "abc");
	}
}
