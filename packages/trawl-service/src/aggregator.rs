use std::collections::HashSet;

use crate::{
	Result,
	fetcher::{self, FetchContext},
	ledger::CostLedger,
	planner::Strategy,
	trace::{RunTrace, SkipReason, SkipScope, StopReason, StrategyRun},
};

/// Deduplicated candidate ids. Discovery order is kept only so batches are deterministic.
#[derive(Clone, Debug, Default)]
pub struct CandidateSet {
	ids: Vec<String>,
	seen: HashSet<String>,
}
impl CandidateSet {
	pub fn insert(&mut self, id: String) -> bool {
		if self.seen.contains(&id) {
			return false;
		}

		self.seen.insert(id.clone());
		self.ids.push(id);

		true
	}

	/// Returns how many ids were new.
	pub fn extend<I>(&mut self, ids: I) -> usize
	where
		I: IntoIterator<Item = String>,
	{
		let mut added = 0;

		for id in ids {
			if self.insert(id) {
				added += 1;
			}
		}

		added
	}

	pub fn contains(&self, id: &str) -> bool {
		self.seen.contains(id)
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}

	pub fn ids(&self) -> &[String] {
		&self.ids
	}
}

/// Runs strategies in order until the recall target is met or the run cannot continue.
pub(crate) async fn collect_candidates(
	ctx: &FetchContext<'_>,
	strategies: &[Strategy],
	target: usize,
	ledger: &mut CostLedger,
	trace: &mut RunTrace,
) -> Result<CandidateSet> {
	let mut candidates = CandidateSet::default();

	for (index, strategy) in strategies.iter().enumerate() {
		let remaining = strategies.len() - index;

		if let Some(interrupt) = ctx.guard.interrupted() {
			trace.skip(
				SkipScope::Strategy,
				interrupt.into(),
				strategy.description.as_str(),
				Some(format!("{remaining} strategies not run")),
			);

			break;
		}
		if !ledger.can_afford(ctx.cfg.cost_per_call) {
			trace.skip(
				SkipScope::Strategy,
				SkipReason::Budget,
				strategy.description.as_str(),
				Some(format!("{remaining} strategies not run")),
			);

			break;
		}

		let outcome = fetcher::fetch_strategy(ctx, strategy, ledger, trace).await?;
		let items_found = outcome.ids.len();
		let new_items = candidates.extend(outcome.ids);

		tracing::info!(
			run_id = %trace.run_id,
			strategy = %strategy.description,
			pages = outcome.pages,
			items_found,
			new_items,
			candidates = candidates.len(),
			stop = ?outcome.stop,
			"Strategy finished."
		);

		trace.strategies.push(StrategyRun {
			pages_fetched: outcome.pages,
			items_found,
			new_items,
			cost: outcome.cost,
			stop: outcome.stop,
			..StrategyRun::new(strategy)
		});

		if candidates.len() >= target {
			tracing::info!(
				run_id = %trace.run_id,
				target,
				candidates = candidates.len(),
				"Recall target reached."
			);

			break;
		}
		if matches!(
			outcome.stop,
			StopReason::BudgetExhausted | StopReason::Cancelled | StopReason::TimedOut
		) {
			break;
		}
	}

	Ok(candidates)
}
