pub mod detail;
pub mod owner;
pub mod search;

mod error;

pub use error::{Error, Result};

use reqwest::{
	Response, StatusCode,
	header::{HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

/// Error reasons the remote side uses when the daily cost allowance is spent.
const QUOTA_REASONS: [&str; 2] = ["quotaExceeded", "dailyLimitExceeded"];

pub fn request_headers(default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

pub fn endpoint(api_base: &str, path: &str) -> String {
	format!("{}/{}", api_base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Maps quota failures to [`Error::QuotaExhausted`] and other failures to their HTTP error.
pub(crate) async fn check_status(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_success() {
		return Ok(res);
	}
	if status == StatusCode::FORBIDDEN {
		let body: Value = res.json().await.unwrap_or(Value::Null);

		if let Some(reason) = quota_reason(&body) {
			return Err(Error::QuotaExhausted { message: reason });
		}

		return Err(Error::InvalidResponse {
			message: format!("Remote service rejected the request with status {status}."),
		});
	}

	Err(res.error_for_status().err().map(Error::from).unwrap_or_else(|| {
		Error::InvalidResponse { message: format!("Unexpected status {status}.") }
	}))
}

pub(crate) fn quota_reason(body: &Value) -> Option<String> {
	let errors = body.get("error")?.get("errors")?.as_array()?;

	errors
		.iter()
		.filter_map(|err| err.get("reason").and_then(Value::as_str))
		.find(|reason| QUOTA_REASONS.contains(reason))
		.map(str::to_string)
}
