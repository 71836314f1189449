use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub providers: Providers,
	pub budget: Budget,
	pub fetch: Fetch,
	#[serde(default)]
	pub filter: Filter,
	pub cache: Cache,
	pub regions: Regions,
	#[serde(default)]
	pub expansion: Expansion,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub search: SearchProviderConfig,
	pub detail: DetailProviderConfig,
	pub owner: OwnerProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	/// Cost units declared for a single page request.
	pub cost_per_call: u64,
	/// Items requested per page. The remote service caps this at 50.
	pub page_size: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	pub cost_per_batch: u64,
	pub batch_size: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	pub cost_per_lookup: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Budget {
	pub quota_limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fetch {
	pub inter_page_delay_ms: u64,
	#[serde(default)]
	pub inter_batch_delay_ms: u64,
	pub recall_multiplier: u32,
	/// Optional wall-clock ceiling for a whole run. Zero is treated as unset.
	pub run_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Filter {
	#[serde(default = "default_short_max_duration_secs")]
	pub short_max_duration_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cache {
	pub owner_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Regions {
	pub supported: Vec<String>,
	/// Region code to relevance language, e.g. "KR" = "ko".
	#[serde(default)]
	pub languages: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Expansion {
	#[serde(default = "default_max_variants")]
	pub max_variants: u32,
	#[serde(default)]
	pub synonyms: Vec<SynonymEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SynonymEntry {
	pub phrase: String,
	pub related: Vec<String>,
}

impl Default for Filter {
	fn default() -> Self {
		Self { short_max_duration_secs: default_short_max_duration_secs() }
	}
}

impl Default for Expansion {
	fn default() -> Self {
		Self { max_variants: default_max_variants(), synonyms: Vec::new() }
	}
}

impl Regions {
	pub fn is_supported(&self, region: &str) -> bool {
		self.supported.iter().any(|code| code.eq_ignore_ascii_case(region))
	}

	pub fn language_for(&self, region: &str) -> Option<&str> {
		self.languages
			.iter()
			.find(|(code, _)| code.eq_ignore_ascii_case(region))
			.map(|(_, language)| language.as_str())
	}
}

fn default_short_max_duration_secs() -> u64 {
	60
}

fn default_max_variants() -> u32 {
	4
}
