// std
use std::time::Duration as StdDuration;

// crates.io
use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use trawl_config::OwnerProviderConfig;

/// Looks up the aggregate metric (subscriber count) for one owner.
///
/// Returns `Ok(None)` when the owner does not exist. An owner that hides the metric reports 0.
pub async fn lookup(cfg: &OwnerProviderConfig, owner_id: &str) -> Result<Option<u64>> {
	let client = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let params = [("part", "statistics"), ("id", owner_id), ("key", cfg.api_key.as_str())];
	let res = client
		.get(url)
		.headers(crate::request_headers(&cfg.default_headers)?)
		.query(&params)
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	parse_owner_response(json)
}

fn parse_owner_response(json: Value) -> Result<Option<u64>> {
	let Some(first) = json.get("items").and_then(Value::as_array).and_then(|items| items.first())
	else {
		return Ok(None);
	};
	let Some(statistics) = first.get("statistics") else {
		return Err(Error::InvalidResponse {
			message: "Owner response is missing statistics.".to_string(),
		});
	};
	let count: u64 = match statistics.get("subscriberCount") {
		Some(Value::String(raw)) => raw.trim().parse().map_err(|_| Error::InvalidResponse {
			message: format!("Owner subscriberCount is not a number: {raw}."),
		})?,
		Some(Value::Number(number)) => number.as_u64().unwrap_or(0),
		_ => 0,
	};

	Ok(Some(count))
}
