use std::{collections::HashSet, time::Duration};

use crate::{
	DetailProvider, Error, Result,
	cancel::RunGuard,
	ledger::CostLedger,
	trace::{RunTrace, SkipReason, SkipScope},
};
use trawl_config::DetailProviderConfig;
use trawl_domain::record::ItemRecord;

pub(crate) struct ResolveContext<'a> {
	pub(crate) cfg: &'a DetailProviderConfig,
	pub(crate) provider: &'a dyn DetailProvider,
	pub(crate) inter_batch_delay: Duration,
	pub(crate) guard: &'a RunGuard,
}

/// Resolves candidate ids into typed records, one fixed-size batch at a time.
///
/// Batches that cannot be paid for or that fail transiently are skipped, so their ids are simply
/// absent from the output. Records with missing or malformed required fields are dropped here
/// and never reach the filter pipeline.
pub(crate) async fn resolve_details(
	ctx: &ResolveContext<'_>,
	ids: &[String],
	ledger: &mut CostLedger,
	trace: &mut RunTrace,
) -> Result<Vec<ItemRecord>> {
	let batch_size = (ctx.cfg.batch_size as usize).max(1);
	let batch_count = ids.len().div_ceil(batch_size);
	let mut records = Vec::with_capacity(ids.len());
	let mut seen = HashSet::new();

	for (index, batch) in ids.chunks(batch_size).enumerate() {
		let label = format!("batch {}/{batch_count}", index + 1);

		if index > 0 && !ctx.inter_batch_delay.is_zero() {
			tokio::time::sleep(ctx.inter_batch_delay).await;
		}
		if let Some(interrupt) = ctx.guard.interrupted() {
			trace.skip(
				SkipScope::Batch,
				interrupt.into(),
				label,
				Some(format!("{} batches not resolved", batch_count - index)),
			);

			break;
		}
		if !ledger.reserve(ctx.cfg.cost_per_batch) {
			trace.skip(
				SkipScope::Batch,
				SkipReason::Budget,
				label,
				Some(format!("{} ids unresolved", batch.len())),
			);

			continue;
		}

		let raws = match ctx.guard.bounded(ctx.provider.resolve(ctx.cfg, batch)).await {
			Err(interrupt) => {
				trace.skip(
					SkipScope::Batch,
					interrupt.into(),
					label,
					Some(format!("{} batches not resolved", batch_count - index)),
				);

				break;
			},
			Ok(Ok(raws)) => raws,
			Ok(Err(err)) if err.is_quota_exhausted() => {
				tracing::warn!(
					run_id = %trace.run_id,
					batch = %label,
					error = %err,
					"Remote quota exhausted during detail resolution."
				);

				return Err(Error::QuotaExhausted {
					message: err.to_string(),
					cost_used: ledger.used(),
				});
			},
			Ok(Err(err)) => {
				trace.skip(SkipScope::Batch, SkipReason::Transient, label, Some(err.to_string()));

				continue;
			},
		};
		let requested: HashSet<&str> = batch.iter().map(String::as_str).collect();
		let returned = raws.len();

		for raw in raws {
			match ItemRecord::from_raw(raw) {
				Ok(record) => {
					if !requested.contains(record.id.as_str()) || !seen.insert(record.id.clone()) {
						tracing::debug!(
							run_id = %trace.run_id,
							id = %record.id,
							"Ignoring unrequested or repeated detail record."
						);

						continue;
					}

					records.push(record);
				},
				Err(defect) => {
					tracing::debug!(
						run_id = %trace.run_id,
						defect = defect.as_str(),
						"Dropping malformed detail record."
					);

					trace.drop_record(defect);
				},
			}
		}

		tracing::debug!(
			run_id = %trace.run_id,
			batch = %label,
			requested = batch.len(),
			returned,
			cost_used = ledger.used(),
			"Resolved detail batch."
		);
	}

	Ok(records)
}
