use serde::{Deserialize, Serialize};

use trawl_config::Regions;

pub const MAX_QUERY_CHARS: usize = 100;
pub const MIN_PERIOD_DAYS: u32 = 1;
pub const MAX_PERIOD_DAYS: u32 = 365;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
	#[default]
	Any,
	Short,
	Long,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
	Relevance,
	Recency,
	Popularity,
}
impl SortOrder {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Relevance => "relevance",
			Self::Recency => "recency",
			Self::Popularity => "popularity",
		}
	}
}

/// How hard a run works to reach its recall target.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
	Basic,
	#[default]
	Medium,
	Maximum,
}
impl Intensity {
	/// Page budget of the first, most exhaustive strategy.
	pub fn page_budget(self) -> u32 {
		match self {
			Self::Basic => 3,
			Self::Medium => 8,
			Self::Maximum => 15,
		}
	}

	pub fn strategy_cap(self) -> usize {
		match self {
			Self::Basic => 2,
			Self::Medium => 4,
			Self::Maximum => 6,
		}
	}

	pub fn expands_queries(self) -> bool {
		!matches!(self, Self::Basic)
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchRequest {
	pub query_text: String,
	pub region: String,
	pub period_days: u32,
	pub desired_count: u32,
	#[serde(default)]
	pub type_filter: TypeFilter,
	/// Minimum primary count metric (view count).
	pub min_metric: Option<u64>,
	/// Maximum owner aggregate metric (subscriber count).
	pub max_owner_metric: Option<u64>,
	#[serde(default)]
	pub intensity: Intensity,
	/// Optional per-request ceiling. The configured quota still applies.
	pub cost_limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct RequestError {
	pub field: &'static str,
	pub message: String,
}

impl SearchRequest {
	pub fn new(query_text: impl Into<String>, region: impl Into<String>) -> Self {
		Self {
			query_text: query_text.into(),
			region: region.into(),
			period_days: 30,
			desired_count: 50,
			type_filter: TypeFilter::Any,
			min_metric: None,
			max_owner_metric: None,
			intensity: Intensity::Medium,
			cost_limit: None,
		}
	}

	/// Rejects malformed fields before any remote call is made.
	pub fn validate(&self, regions: &Regions) -> Result<(), RequestError> {
		let query = self.query_text.trim();

		if query.is_empty() {
			return Err(RequestError {
				field: "query_text",
				message: "must be non-empty.".to_string(),
			});
		}
		if self.query_text.chars().count() > MAX_QUERY_CHARS {
			return Err(RequestError {
				field: "query_text",
				message: format!("must be at most {MAX_QUERY_CHARS} characters."),
			});
		}
		if !regions.is_supported(self.region.trim()) {
			return Err(RequestError {
				field: "region",
				message: format!(
					"unsupported region '{}', expected one of {}.",
					self.region,
					regions.supported.join(", ")
				),
			});
		}
		if !(MIN_PERIOD_DAYS..=MAX_PERIOD_DAYS).contains(&self.period_days) {
			return Err(RequestError {
				field: "period_days",
				message: format!("must be in the range {MIN_PERIOD_DAYS}-{MAX_PERIOD_DAYS}."),
			});
		}
		if self.desired_count == 0 {
			return Err(RequestError {
				field: "desired_count",
				message: "must be greater than zero.".to_string(),
			});
		}
		if self.cost_limit == Some(0) {
			return Err(RequestError {
				field: "cost_limit",
				message: "must be greater than zero when set.".to_string(),
			});
		}

		Ok(())
	}
}
