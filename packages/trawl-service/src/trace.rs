use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::{cache::CacheStats, cancel::Interrupt, ledger::QuotaStatus, planner::Strategy};
use trawl_domain::{
	record::{ItemRecord, RecordDefect},
	request::SortOrder,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
	Complete,
	Cancelled,
	TimedOut,
}
impl From<Option<Interrupt>> for Completion {
	fn from(interrupt: Option<Interrupt>) -> Self {
		match interrupt {
			None => Self::Complete,
			Some(Interrupt::Cancelled) => Self::Cancelled,
			Some(Interrupt::TimedOut) => Self::TimedOut,
		}
	}
}

/// Why a strategy stopped paginating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
	EndOfResults,
	PageBudget,
	BudgetExhausted,
	RemoteFailure,
	Cancelled,
	TimedOut,
}
impl From<Interrupt> for StopReason {
	fn from(interrupt: Interrupt) -> Self {
		match interrupt {
			Interrupt::Cancelled => Self::Cancelled,
			Interrupt::TimedOut => Self::TimedOut,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrategyRun {
	pub description: String,
	pub query_variant: String,
	pub sort_order: SortOrder,
	pub page_budget: u32,
	pub pages_fetched: u32,
	/// Ids returned by this strategy, duplicates included.
	pub items_found: usize,
	/// Ids this strategy added to the candidate set.
	pub new_items: usize,
	pub cost: u64,
	pub stop: StopReason,
}
impl StrategyRun {
	pub(crate) fn new(strategy: &Strategy) -> Self {
		Self {
			description: strategy.description.clone(),
			query_variant: strategy.query_variant.clone(),
			sort_order: strategy.sort_order,
			page_budget: strategy.page_budget,
			pages_fetched: 0,
			items_found: 0,
			new_items: 0,
			cost: 0,
			stop: StopReason::EndOfResults,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipScope {
	Strategy,
	Page,
	Batch,
	OwnerLookup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
	Budget,
	Transient,
	Cancelled,
	TimedOut,
}
impl From<Interrupt> for SkipReason {
	fn from(interrupt: Interrupt) -> Self {
		match interrupt {
			Interrupt::Cancelled => Self::Cancelled,
			Interrupt::TimedOut => Self::TimedOut,
		}
	}
}

/// One unit of work the run gave up on instead of failing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkipRecord {
	pub scope: SkipScope,
	pub reason: SkipReason,
	/// Strategy description, batch label, or owner id.
	pub target: String,
	pub detail: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
	Structural,
	TypeClassification,
	NumericThreshold,
	OwnerAggregate,
}
impl FilterStage {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Structural => "structural",
			Self::TypeClassification => "type_classification",
			Self::NumericThreshold => "numeric_threshold",
			Self::OwnerAggregate => "owner_aggregate",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StageReport {
	pub stage: FilterStage,
	pub input: usize,
	pub output: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DefectCount {
	pub defect: RecordDefect,
	pub count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct AggregationResult {
	pub run_id: Uuid,
	pub items: Vec<ItemRecord>,
	pub cost_used: u64,
	pub cost_limit: u64,
	pub quota: QuotaStatus,
	pub strategies_run: Vec<StrategyRun>,
	pub candidates_found: usize,
	pub records_resolved: usize,
	pub records_dropped: Vec<DefectCount>,
	pub owner_lookups: usize,
	pub filter_report: Vec<StageReport>,
	pub skipped: Vec<SkipRecord>,
	pub cache: CacheStats,
	pub completion: Completion,
}
impl AggregationResult {
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

/// Accumulates everything the run reports besides its items.
#[derive(Debug)]
pub(crate) struct RunTrace {
	pub(crate) run_id: Uuid,
	pub(crate) strategies: Vec<StrategyRun>,
	pub(crate) skipped: Vec<SkipRecord>,
	pub(crate) stages: Vec<StageReport>,
	pub(crate) dropped: BTreeMap<RecordDefect, usize>,
	pub(crate) owner_lookups: usize,
}
impl RunTrace {
	pub(crate) fn new(run_id: Uuid) -> Self {
		Self {
			run_id,
			strategies: Vec::new(),
			skipped: Vec::new(),
			stages: Vec::new(),
			dropped: BTreeMap::new(),
			owner_lookups: 0,
		}
	}

	pub(crate) fn skip(
		&mut self,
		scope: SkipScope,
		reason: SkipReason,
		target: impl Into<String>,
		detail: Option<String>,
	) {
		let record = SkipRecord { scope, reason, target: target.into(), detail };

		tracing::warn!(
			run_id = %self.run_id,
			scope = ?record.scope,
			reason = ?record.reason,
			target = %record.target,
			detail = record.detail.as_deref().unwrap_or(""),
			"Skipped work item."
		);

		self.skipped.push(record);
	}

	pub(crate) fn drop_record(&mut self, defect: RecordDefect) {
		*self.dropped.entry(defect).or_insert(0) += 1;
	}

	pub(crate) fn stage(&mut self, stage: FilterStage, input: usize, output: usize) {
		tracing::debug!(
			run_id = %self.run_id,
			stage = stage.as_str(),
			input,
			output,
			"Filter stage applied."
		);

		self.stages.push(StageReport { stage, input, output });
	}

	pub(crate) fn defect_counts(&self) -> Vec<DefectCount> {
		self.dropped
			.iter()
			.map(|(defect, count)| DefectCount { defect: *defect, count: *count })
			.collect()
	}
}
