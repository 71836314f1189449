mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Budget, Cache, Config, DetailProviderConfig, Expansion, Fetch, Filter, OwnerProviderConfig,
	Providers, Regions, SearchProviderConfig, Service, SynonymEntry,
};

use std::{fs, path::Path};

/// Upper bound the remote services accept for items per page or ids per batch.
pub const MAX_ITEMS_PER_CALL: u32 = 50;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, key) in [
		("search", &cfg.providers.search.api_key),
		("detail", &cfg.providers.detail.api_key),
		("owner", &cfg.providers.owner.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}
	for (label, cost) in [
		("providers.search.cost_per_call", cfg.providers.search.cost_per_call),
		("providers.detail.cost_per_batch", cfg.providers.detail.cost_per_batch),
		("providers.owner.cost_per_lookup", cfg.providers.owner.cost_per_lookup),
	] {
		if cost == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}
	for (label, size) in [
		("providers.search.page_size", cfg.providers.search.page_size),
		("providers.detail.batch_size", cfg.providers.detail.batch_size),
	] {
		if size == 0 || size > MAX_ITEMS_PER_CALL {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 1-{MAX_ITEMS_PER_CALL}."),
			});
		}
	}

	if cfg.budget.quota_limit == 0 {
		return Err(Error::Validation {
			message: "budget.quota_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.fetch.recall_multiplier == 0 {
		return Err(Error::Validation {
			message: "fetch.recall_multiplier must be greater than zero.".to_string(),
		});
	}
	if cfg.filter.short_max_duration_secs == 0 {
		return Err(Error::Validation {
			message: "filter.short_max_duration_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.owner_ttl_secs == 0 {
		return Err(Error::Validation {
			message: "cache.owner_ttl_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.regions.supported.is_empty() {
		return Err(Error::Validation {
			message: "regions.supported must be non-empty.".to_string(),
		});
	}

	for code in &cfg.regions.supported {
		if code.trim().is_empty() {
			return Err(Error::Validation {
				message: "regions.supported must not contain empty codes.".to_string(),
			});
		}
	}
	for entry in &cfg.expansion.synonyms {
		if entry.phrase.trim().is_empty() {
			return Err(Error::Validation {
				message: "expansion.synonyms.phrase must be non-empty.".to_string(),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for code in &mut cfg.regions.supported {
		*code = code.trim().to_ascii_uppercase();
	}

	cfg.regions.languages = cfg
		.regions
		.languages
		.drain()
		.map(|(code, language)| (code.trim().to_ascii_uppercase(), language.trim().to_string()))
		.collect();

	for entry in &mut cfg.expansion.synonyms {
		entry.phrase = entry.phrase.trim().to_lowercase();
		entry.related.retain(|related| !related.trim().is_empty());
	}

	if cfg.fetch.run_timeout_ms == Some(0) {
		cfg.fetch.run_timeout_ms = None;
	}
}
