//! Cheapest-first filter stages over resolved records.
//!
//! Stages 1-3 are local. Stage 4 is the only one that spends cost, so it runs last on the
//! smallest input.

use std::collections::{HashMap, HashSet};

use time::OffsetDateTime;

use crate::{
	Error, OwnerMetricProvider, Result,
	cache::OwnerMetricCache,
	cancel::RunGuard,
	ledger::CostLedger,
	trace::{FilterStage, RunTrace, SkipReason, SkipScope},
};
use trawl_config::OwnerProviderConfig;
use trawl_domain::{
	record::ItemRecord,
	request::{SearchRequest, TypeFilter},
};

pub(crate) struct FilterContext<'a> {
	pub(crate) request: &'a SearchRequest,
	pub(crate) short_max_duration_secs: u64,
	pub(crate) owner_cfg: &'a OwnerProviderConfig,
	pub(crate) provider: &'a dyn OwnerMetricProvider,
	pub(crate) cache: &'a OwnerMetricCache,
	pub(crate) guard: &'a RunGuard,
}

pub(crate) async fn run_pipeline(
	ctx: &FilterContext<'_>,
	records: Vec<ItemRecord>,
	ledger: &mut CostLedger,
	trace: &mut RunTrace,
) -> Result<Vec<ItemRecord>> {
	let input = records.len();
	let records = structural(records);

	trace.stage(FilterStage::Structural, input, records.len());

	let input = records.len();
	let records = by_type(records, ctx.request.type_filter, ctx.short_max_duration_secs);

	trace.stage(FilterStage::TypeClassification, input, records.len());

	let input = records.len();
	let records = by_min_metric(records, ctx.request.min_metric);

	trace.stage(FilterStage::NumericThreshold, input, records.len());

	let input = records.len();
	let mut records = match ctx.request.max_owner_metric {
		Some(max_owner_metric) => {
			by_owner_metric(ctx, records, max_owner_metric, ledger, trace).await?
		},
		None => records,
	};

	trace.stage(FilterStage::OwnerAggregate, input, records.len());

	rank_by_recency(&mut records);
	records.truncate(ctx.request.desired_count as usize);

	Ok(records)
}

/// Structural validity is established by the resolver; the stage stays for symmetry.
pub fn structural(records: Vec<ItemRecord>) -> Vec<ItemRecord> {
	records
}

pub fn by_type(
	records: Vec<ItemRecord>,
	type_filter: TypeFilter,
	short_max_duration_secs: u64,
) -> Vec<ItemRecord> {
	if type_filter == TypeFilter::Any {
		return records;
	}

	records
		.into_iter()
		.filter(|record| record.classify(short_max_duration_secs) == type_filter)
		.collect()
}

pub fn by_min_metric(records: Vec<ItemRecord>, min_metric: Option<u64>) -> Vec<ItemRecord> {
	let Some(min_metric) = min_metric else {
		return records;
	};

	records.into_iter().filter(|record| record.view_count >= min_metric).collect()
}

/// Most recent first; ids break ties so output is stable.
pub fn rank_by_recency(records: &mut [ItemRecord]) {
	records.sort_by(|a, b| b.published_at.cmp(&a.published_at).then_with(|| a.id.cmp(&b.id)));
}

async fn by_owner_metric(
	ctx: &FilterContext<'_>,
	records: Vec<ItemRecord>,
	max_owner_metric: u64,
	ledger: &mut CostLedger,
	trace: &mut RunTrace,
) -> Result<Vec<ItemRecord>> {
	let mut seen = HashSet::new();
	let owners: Vec<&str> = records
		.iter()
		.map(|record| record.owner_id.as_str())
		.filter(|owner_id| seen.insert(*owner_id))
		.collect();
	let mut metrics: HashMap<String, u64> = HashMap::new();

	// Sequential on purpose: one lookup per distinct owner per run.
	for owner_id in owners {
		if let Some(metric) = ctx.cache.get(owner_id, OffsetDateTime::now_utc()) {
			metrics.insert(owner_id.to_string(), metric);

			continue;
		}
		if let Some(interrupt) = ctx.guard.interrupted() {
			trace.skip(SkipScope::OwnerLookup, interrupt.into(), owner_id, None);

			continue;
		}
		if !ledger.reserve(ctx.owner_cfg.cost_per_lookup) {
			trace.skip(
				SkipScope::OwnerLookup,
				SkipReason::Budget,
				owner_id,
				Some(format!(
					"lookup needs {} units, {} remaining",
					ctx.owner_cfg.cost_per_lookup,
					ledger.remaining()
				)),
			);

			continue;
		}

		trace.owner_lookups += 1;

		match ctx.guard.bounded(ctx.provider.lookup(ctx.owner_cfg, owner_id)).await {
			Err(interrupt) => {
				trace.skip(
					SkipScope::OwnerLookup,
					interrupt.into(),
					owner_id,
					Some("lookup abandoned in flight".to_string()),
				);
			},
			Ok(Ok(metric)) => {
				// An owner the service does not know counts as 0.
				let metric = metric.unwrap_or(0);

				ctx.cache.insert(owner_id, metric, OffsetDateTime::now_utc());
				metrics.insert(owner_id.to_string(), metric);
			},
			Ok(Err(err)) if err.is_quota_exhausted() => {
				tracing::warn!(
					run_id = %trace.run_id,
					owner_id,
					error = %err,
					"Remote quota exhausted during owner lookups."
				);

				return Err(Error::QuotaExhausted {
					message: err.to_string(),
					cost_used: ledger.used(),
				});
			},
			Ok(Err(err)) => {
				trace.skip(
					SkipScope::OwnerLookup,
					SkipReason::Transient,
					owner_id,
					Some(err.to_string()),
				);
			},
		}
	}

	// Owners whose metric stayed unknown cannot be shown to pass, so their records are dropped.
	Ok(records
		.into_iter()
		.filter(|record| {
			metrics.get(&record.owner_id).is_some_and(|metric| *metric <= max_owner_metric)
		})
		.collect())
}
