pub mod aggregate;
pub mod aggregator;
pub mod cache;
pub mod cancel;
pub mod filter;
pub mod ledger;
pub mod planner;
pub mod trace;

mod error;
mod fetcher;
mod resolver;

pub use aggregator::CandidateSet;
pub use cache::{CacheStats, OwnerMetricCache, OwnerMetricCacheEntry};
pub use cancel::CancellationToken;
pub use error::{Error, Result};
pub use ledger::{CostLedger, QuotaLevel, QuotaStatus};
pub use planner::Strategy;
pub use trace::{
	AggregationResult, Completion, DefectCount, FilterStage, SkipReason, SkipRecord, SkipScope,
	StageReport, StopReason, StrategyRun,
};

use std::{future::Future, pin::Pin, sync::Arc};

use trawl_config::{Config, DetailProviderConfig, OwnerProviderConfig, SearchProviderConfig};
use trawl_domain::{
	expansion::{QueryExpander, SynonymTable},
	record::RawItem,
};
use trawl_providers::{
	detail, owner,
	search::{self, SearchPage, SearchQuery},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Issues one page of one query.
pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		query: &'a SearchQuery<'a>,
	) -> BoxFuture<'a, trawl_providers::Result<SearchPage>>;
}

/// Resolves one batch of ids into raw detail payloads.
pub trait DetailProvider
where
	Self: Send + Sync,
{
	fn resolve<'a>(
		&'a self,
		cfg: &'a DetailProviderConfig,
		ids: &'a [String],
	) -> BoxFuture<'a, trawl_providers::Result<Vec<RawItem>>>;
}

/// Looks up the aggregate metric of one owner. `None` means the owner is unknown.
pub trait OwnerMetricProvider
where
	Self: Send + Sync,
{
	fn lookup<'a>(
		&'a self,
		cfg: &'a OwnerProviderConfig,
		owner_id: &'a str,
	) -> BoxFuture<'a, trawl_providers::Result<Option<u64>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub search: Arc<dyn SearchProvider>,
	pub detail: Arc<dyn DetailProvider>,
	pub owner: Arc<dyn OwnerMetricProvider>,
}

pub struct TrawlService {
	pub cfg: Config,
	pub providers: Providers,
	pub expander: Arc<dyn QueryExpander>,
	pub owner_cache: Arc<OwnerMetricCache>,
}

struct DefaultProviders;

impl SearchProvider for DefaultProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		query: &'a SearchQuery<'a>,
	) -> BoxFuture<'a, trawl_providers::Result<SearchPage>> {
		Box::pin(search::search(cfg, query))
	}
}

impl DetailProvider for DefaultProviders {
	fn resolve<'a>(
		&'a self,
		cfg: &'a DetailProviderConfig,
		ids: &'a [String],
	) -> BoxFuture<'a, trawl_providers::Result<Vec<RawItem>>> {
		Box::pin(detail::resolve(cfg, ids))
	}
}

impl OwnerMetricProvider for DefaultProviders {
	fn lookup<'a>(
		&'a self,
		cfg: &'a OwnerProviderConfig,
		owner_id: &'a str,
	) -> BoxFuture<'a, trawl_providers::Result<Option<u64>>> {
		Box::pin(owner::lookup(cfg, owner_id))
	}
}

impl Providers {
	pub fn new(
		search: Arc<dyn SearchProvider>,
		detail: Arc<dyn DetailProvider>,
		owner: Arc<dyn OwnerMetricProvider>,
	) -> Self {
		Self { search, detail, owner }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { search: provider.clone(), detail: provider.clone(), owner: provider }
	}
}

impl TrawlService {
	pub fn new(cfg: Config) -> Self {
		Self::with_providers(cfg, Providers::default())
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		let expander = Arc::new(SynonymTable::from_config(&cfg.expansion));
		let ttl = time::Duration::seconds(cfg.cache.owner_ttl_secs.min(i64::MAX as u64) as i64);

		Self { cfg, providers, expander, owner_cache: Arc::new(OwnerMetricCache::new(ttl)) }
	}

	/// Replaces the configured synonym table with another variant source.
	pub fn with_expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
		self.expander = expander;

		self
	}

	/// Shares an owner metric cache with other services or runs.
	pub fn with_owner_cache(mut self, cache: Arc<OwnerMetricCache>) -> Self {
		self.owner_cache = cache;

		self
	}
}
