// std
use std::time::Duration as StdDuration;

// crates.io
use reqwest::Client;
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, Result};
use trawl_config::SearchProviderConfig;
use trawl_domain::request::SortOrder;

/// One page request against the search endpoint.
#[derive(Clone, Debug)]
pub struct SearchQuery<'a> {
	pub query_text: &'a str,
	pub sort_order: SortOrder,
	pub region: &'a str,
	pub relevance_language: Option<&'a str>,
	pub published_after: OffsetDateTime,
	pub cursor: Option<&'a str>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchPage {
	pub ids: Vec<String>,
	/// `None` when there are no further pages.
	pub next_cursor: Option<String>,
}

pub async fn search(cfg: &SearchProviderConfig, query: &SearchQuery<'_>) -> Result<SearchPage> {
	let client = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let published_after = query
		.published_after
		.format(&Rfc3339)
		.map_err(|err| Error::InvalidConfig { message: format!("Invalid period start: {err}") })?;
	let mut params = vec![
		("part", "id".to_string()),
		("type", "video".to_string()),
		("q", query.query_text.to_string()),
		("order", order_param(query.sort_order).to_string()),
		("publishedAfter", published_after),
		("regionCode", query.region.to_string()),
		("maxResults", cfg.page_size.to_string()),
		("key", cfg.api_key.clone()),
	];

	if let Some(language) = query.relevance_language {
		params.push(("relevanceLanguage", language.to_string()));
	}
	if let Some(cursor) = query.cursor {
		params.push(("pageToken", cursor.to_string()));
	}

	let res = client
		.get(url)
		.headers(crate::request_headers(&cfg.default_headers)?)
		.query(&params)
		.send()
		.await?;
	let json: Value = crate::check_status(res).await?.json().await?;

	parse_search_response(json)
}

pub fn order_param(order: SortOrder) -> &'static str {
	match order {
		SortOrder::Relevance => "relevance",
		SortOrder::Recency => "date",
		SortOrder::Popularity => "viewCount",
	}
}

fn parse_search_response(json: Value) -> Result<SearchPage> {
	let items: &[Value] = match json.get("items") {
		Some(Value::Array(items)) => items.as_slice(),
		Some(Value::Null) | None => &[],
		Some(_) => {
			return Err(Error::InvalidResponse {
				message: "Search response items must be an array.".to_string(),
			});
		},
	};
	let ids = items
		.iter()
		.filter_map(|item| {
			let id = item.get("id")?;

			id.get("videoId").or(Some(id)).and_then(Value::as_str).map(str::to_string)
		})
		.filter(|id| !id.trim().is_empty())
		.collect();
	let next_cursor = json
		.get("nextPageToken")
		.and_then(Value::as_str)
		.filter(|token| !token.is_empty())
		.map(str::to_string);

	Ok(SearchPage { ids, next_cursor })
}
