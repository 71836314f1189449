use std::time::Duration;

use trawl_domain::request::{SearchRequest, SortOrder};
use trawl_service::{SkipReason, SkipScope};

use super::{BATCH_COST, FixtureDetail, FixtureOwners, FixtureSearch, SEARCH_COST, item};

const PUBLISHED: &str = "2026-10-10T00:00:00Z";
const IDS: [&str; 5] = ["a1", "a2", "a3", "a4", "a5"];

fn two_per_batch() -> trawl_config::Config {
	let mut cfg = super::test_config();

	cfg.providers.detail.batch_size = 2;
	cfg.fetch.recall_multiplier = 1;

	cfg
}

fn five_candidates() -> (FixtureSearch, FixtureDetail) {
	let search = FixtureSearch::default().with_pages("cooking", SortOrder::Recency, &[&IDS]);
	let detail = FixtureDetail::default()
		.with_items(IDS.map(|id| item(id, "owner-1", "PT5M", 900, PUBLISHED)));

	(search, detail)
}

#[tokio::test(start_paused = true)]
async fn resolves_candidates_in_fixed_size_batches() {
	let mut cfg = two_per_batch();

	cfg.fetch.inter_batch_delay_ms = 100;

	let (search, detail) = five_candidates();
	let h = super::harness(cfg, search, detail, FixtureOwners::default());
	let started = tokio::time::Instant::now();
	let result = h
		.service
		.aggregate(SearchRequest { desired_count: 5, ..SearchRequest::new("cooking", "KR") })
		.await
		.expect("Aggregation must succeed.");

	assert!(started.elapsed() >= Duration::from_millis(200));
	assert_eq!(*h.detail.batches.lock().unwrap_or_else(|err| err.into_inner()), vec![2, 2, 1]);
	assert_eq!(h.detail.call_count(), 3);
	assert_eq!(h.search.call_count(), 1);
	assert_eq!(result.cost_used, SEARCH_COST + 3 * BATCH_COST);
	assert_eq!(result.records_resolved, 5);
	assert_eq!(super::item_ids(&result), IDS.to_vec());
	assert!(result.skipped.is_empty());
}

#[tokio::test]
async fn unaffordable_batches_are_skipped_after_earlier_ones_resolve() {
	let (search, detail) = five_candidates();
	let h = super::harness(two_per_batch(), search, detail, FixtureOwners::default());
	let req = SearchRequest {
		desired_count: 5,
		cost_limit: Some(SEARCH_COST + BATCH_COST),
		..SearchRequest::new("cooking", "KR")
	};
	let result = h.service.aggregate(req).await.expect("Aggregation must succeed.");
	let budget_skips: Vec<&str> = result
		.skipped
		.iter()
		.filter(|skip| skip.scope == SkipScope::Batch && skip.reason == SkipReason::Budget)
		.map(|skip| skip.target.as_str())
		.collect();

	assert_eq!(h.detail.call_count(), 1);
	assert_eq!(result.cost_used, SEARCH_COST + BATCH_COST);
	assert_eq!(super::item_ids(&result), vec!["a1", "a2"]);
	assert_eq!(budget_skips, vec!["batch 2/3", "batch 3/3"]);
}
