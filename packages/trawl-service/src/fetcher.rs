use std::time::Duration;

use time::OffsetDateTime;

use crate::{
	Error, Result, SearchProvider,
	cancel::RunGuard,
	ledger::CostLedger,
	planner::Strategy,
	trace::{RunTrace, SkipReason, SkipScope, StopReason},
};
use trawl_config::SearchProviderConfig;
use trawl_providers::search::SearchQuery;

/// Immutable request context shared by every strategy of a run.
pub(crate) struct FetchContext<'a> {
	pub(crate) cfg: &'a SearchProviderConfig,
	pub(crate) provider: &'a dyn SearchProvider,
	pub(crate) region: &'a str,
	pub(crate) relevance_language: Option<&'a str>,
	pub(crate) published_after: OffsetDateTime,
	pub(crate) inter_page_delay: Duration,
	pub(crate) guard: &'a RunGuard,
}

#[derive(Debug)]
pub(crate) struct FetchOutcome {
	pub(crate) ids: Vec<String>,
	pub(crate) pages: u32,
	pub(crate) cost: u64,
	pub(crate) stop: StopReason,
}

/// Paginates one strategy until its pages, its page budget, or the ledger run out.
///
/// Only a remote quota failure is returned as an error. Everything else ends the strategy with
/// the ids collected so far.
pub(crate) async fn fetch_strategy(
	ctx: &FetchContext<'_>,
	strategy: &Strategy,
	ledger: &mut CostLedger,
	trace: &mut RunTrace,
) -> Result<FetchOutcome> {
	let mut outcome =
		FetchOutcome { ids: Vec::new(), pages: 0, cost: 0, stop: StopReason::EndOfResults };
	let mut cursor: Option<String> = None;

	loop {
		if outcome.pages >= strategy.page_budget {
			outcome.stop = StopReason::PageBudget;

			break;
		}
		if outcome.pages > 0 && !ctx.inter_page_delay.is_zero() {
			tokio::time::sleep(ctx.inter_page_delay).await;
		}
		if let Some(interrupt) = ctx.guard.interrupted() {
			trace.skip(
				SkipScope::Page,
				interrupt.into(),
				strategy.description.as_str(),
				Some(format!("page {}", outcome.pages + 1)),
			);

			outcome.stop = interrupt.into();

			break;
		}
		if !ledger.reserve(ctx.cfg.cost_per_call) {
			trace.skip(
				SkipScope::Page,
				SkipReason::Budget,
				strategy.description.as_str(),
				Some(format!(
					"page {} needs {} units, {} remaining",
					outcome.pages + 1,
					ctx.cfg.cost_per_call,
					ledger.remaining()
				)),
			);

			outcome.stop = StopReason::BudgetExhausted;

			break;
		}

		let query = SearchQuery {
			query_text: strategy.query_variant.as_str(),
			sort_order: strategy.sort_order,
			region: ctx.region,
			relevance_language: ctx.relevance_language,
			published_after: ctx.published_after,
			cursor: cursor.as_deref(),
		};
		let bounded = ctx.guard.bounded(ctx.provider.search(ctx.cfg, &query)).await;

		outcome.pages += 1;
		outcome.cost += ctx.cfg.cost_per_call;

		let result = match bounded {
			Ok(result) => result,
			Err(interrupt) => {
				trace.skip(
					SkipScope::Page,
					interrupt.into(),
					strategy.description.as_str(),
					Some(format!("page {} abandoned in flight", outcome.pages)),
				);

				outcome.stop = interrupt.into();

				break;
			},
		};

		match result {
			Ok(page) => {
				tracing::debug!(
					run_id = %trace.run_id,
					strategy = %strategy.description,
					page = outcome.pages,
					items = page.ids.len(),
					cost_used = ledger.used(),
					"Fetched search page."
				);

				outcome.ids.extend(page.ids);
				cursor = page.next_cursor;

				if cursor.is_none() {
					outcome.stop = StopReason::EndOfResults;

					break;
				}
			},
			Err(err) if err.is_quota_exhausted() => {
				tracing::warn!(
					run_id = %trace.run_id,
					strategy = %strategy.description,
					error = %err,
					"Remote quota exhausted during pagination."
				);

				return Err(Error::QuotaExhausted {
					message: err.to_string(),
					cost_used: ledger.used(),
				});
			},
			Err(err) => {
				// The cursor cannot advance past a failed page.
				trace.skip(
					SkipScope::Page,
					SkipReason::Transient,
					strategy.description.as_str(),
					Some(format!("page {}: {err}", outcome.pages)),
				);

				outcome.stop = StopReason::RemoteFailure;

				break;
			},
		}
	}

	Ok(outcome)
}
