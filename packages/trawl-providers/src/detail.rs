// std
use std::time::Duration as StdDuration;

// crates.io
use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use trawl_config::DetailProviderConfig;
use trawl_domain::record::RawItem;

const DETAIL_PARTS: &str = "snippet,contentDetails,statistics,status";

/// Fetches raw detail payloads for one batch of ids. Interpretation is left to the caller.
pub async fn resolve(cfg: &DetailProviderConfig, ids: &[String]) -> Result<Vec<RawItem>> {
	if ids.len() > cfg.batch_size as usize {
		return Err(Error::InvalidConfig {
			message: format!("Batch of {} ids exceeds batch_size {}.", ids.len(), cfg.batch_size),
		});
	}

	let client = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let params =
		[("part", DETAIL_PARTS.to_string()), ("id", ids.join(",")), ("key", cfg.api_key.clone())];
	let res = client
		.get(url)
		.headers(crate::request_headers(&cfg.default_headers)?)
		.query(&params)
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	parse_detail_response(json)
}

fn parse_detail_response(json: Value) -> Result<Vec<RawItem>> {
	let items = match json.get("items") {
		Some(Value::Array(items)) => items.clone(),
		Some(Value::Null) | None => Vec::new(),
		Some(_) => {
			return Err(Error::InvalidResponse {
				message: "Detail response items must be an array.".to_string(),
			});
		},
	};

	// A malformed item keeps its id so the resolver can account for it.
	Ok(items
		.into_iter()
		.map(|item| {
			let id = item.get("id").and_then(Value::as_str).map(str::to_string);

			serde_json::from_value::<RawItem>(item)
				.unwrap_or_else(|_| RawItem { id, ..Default::default() })
		})
		.collect())
}
