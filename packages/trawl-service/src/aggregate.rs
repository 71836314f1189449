use std::time::Duration;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	AggregationResult, CancellationToken, Completion, CostLedger, Result, TrawlService,
	aggregator,
	cancel::RunGuard,
	fetcher::FetchContext,
	filter::{self, FilterContext},
	planner,
	resolver::{self, ResolveContext},
	trace::RunTrace,
};
use trawl_domain::request::SearchRequest;

impl TrawlService {
	pub async fn aggregate(&self, req: SearchRequest) -> Result<AggregationResult> {
		self.aggregate_with_cancel(req, CancellationToken::new()).await
	}

	/// Runs plan, fetch, resolve, and filter to completion or until `cancel` fires.
	///
	/// Cancellation and the configured run timeout both return partial results. Only an invalid
	/// request or a remote quota failure is returned as an error.
	pub async fn aggregate_with_cancel(
		&self,
		req: SearchRequest,
		cancel: CancellationToken,
	) -> Result<AggregationResult> {
		req.validate(&self.cfg.regions)?;

		let run_id = Uuid::new_v4();
		let guard = RunGuard::new(cancel, self.cfg.fetch.run_timeout_ms.map(Duration::from_millis));
		let cost_limit = req
			.cost_limit
			.map(|limit| limit.min(self.cfg.budget.quota_limit))
			.unwrap_or(self.cfg.budget.quota_limit);
		let mut ledger = CostLedger::new(cost_limit);
		let mut trace = RunTrace::new(run_id);
		let cache_before = self.owner_cache.stats();
		let purged = self.owner_cache.purge_expired(OffsetDateTime::now_utc());
		let strategies =
			planner::plan(&req, self.expander.as_ref(), self.cfg.expansion.max_variants as usize);
		let target = (req.desired_count as usize)
			.saturating_mul(self.cfg.fetch.recall_multiplier as usize);
		let region = req.region.trim().to_ascii_uppercase();
		let published_after =
			OffsetDateTime::now_utc() - time::Duration::days(i64::from(req.period_days));

		tracing::info!(
			%run_id,
			query = %req.query_text,
			region = %region,
			intensity = ?req.intensity,
			strategies = strategies.len(),
			target,
			cost_limit,
			purged,
			"Aggregation started."
		);

		let fetch_ctx = FetchContext {
			cfg: &self.cfg.providers.search,
			provider: self.providers.search.as_ref(),
			region: region.as_str(),
			relevance_language: self.cfg.regions.language_for(&region),
			published_after,
			inter_page_delay: Duration::from_millis(self.cfg.fetch.inter_page_delay_ms),
			guard: &guard,
		};
		let candidates = aggregator::collect_candidates(
			&fetch_ctx,
			&strategies,
			target,
			&mut ledger,
			&mut trace,
		)
		.await?;

		if candidates.len() < req.desired_count as usize {
			tracing::info!(
				%run_id,
				candidates = candidates.len(),
				desired = req.desired_count,
				"Strategies exhausted below the desired count."
			);
		}

		let resolve_ctx = ResolveContext {
			cfg: &self.cfg.providers.detail,
			provider: self.providers.detail.as_ref(),
			inter_batch_delay: Duration::from_millis(self.cfg.fetch.inter_batch_delay_ms),
			guard: &guard,
		};
		let records =
			resolver::resolve_details(&resolve_ctx, candidates.ids(), &mut ledger, &mut trace)
				.await?;
		let records_resolved = records.len();
		let filter_ctx = FilterContext {
			request: &req,
			short_max_duration_secs: self.cfg.filter.short_max_duration_secs,
			owner_cfg: &self.cfg.providers.owner,
			provider: self.providers.owner.as_ref(),
			cache: self.owner_cache.as_ref(),
			guard: &guard,
		};
		let items = filter::run_pipeline(&filter_ctx, records, &mut ledger, &mut trace).await?;
		let completion = Completion::from(guard.observed());

		tracing::info!(
			%run_id,
			items = items.len(),
			candidates = candidates.len(),
			records_resolved,
			cost_used = ledger.used(),
			completion = ?completion,
			"Aggregation finished."
		);

		Ok(AggregationResult {
			run_id,
			items,
			cost_used: ledger.used(),
			cost_limit: ledger.limit(),
			quota: ledger.status(),
			candidates_found: candidates.len(),
			records_resolved,
			records_dropped: trace.defect_counts(),
			owner_lookups: trace.owner_lookups,
			strategies_run: trace.strategies,
			filter_report: trace.stages,
			skipped: trace.skipped,
			cache: self.owner_cache.stats().since(&cache_before),
			completion,
		})
	}
}
