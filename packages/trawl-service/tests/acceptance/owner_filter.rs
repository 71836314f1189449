use trawl_domain::request::{SearchRequest, SortOrder};
use trawl_service::{FilterStage, StageReport};

use super::{FixtureDetail, FixtureOwners, FixtureSearch, item};

const PUBLISHED: &str = "2026-10-10T00:00:00Z";

fn owner_request(max_owner_metric: u64) -> SearchRequest {
	SearchRequest { max_owner_metric: Some(max_owner_metric), ..SearchRequest::new("cooking", "KR") }
}

#[tokio::test]
async fn looks_up_each_surviving_owner_once() {
	let search = FixtureSearch::default()
		.with_pages("cooking", SortOrder::Recency, &[&["a1", "a2", "a3", "a4"]]);
	let detail = FixtureDetail::default().with_items([
		item("a1", "owner-1", "PT5M", 5_000, PUBLISHED),
		item("a2", "owner-1", "PT5M", 5_000, PUBLISHED),
		item("a3", "owner-2", "PT5M", 10, PUBLISHED),
		item("a4", "owner-3", "PT5M", 500, PUBLISHED),
	]);
	let owners = FixtureOwners::default()
		.with_metric("owner-1", 500)
		.with_metric("owner-2", 1)
		.with_metric("owner-3", 5_000);
	let h = super::harness(super::test_config(), search, detail, owners);
	let req = SearchRequest { min_metric: Some(100), ..owner_request(1_000) };
	let result = h.service.aggregate(req).await.expect("Aggregation must succeed.");

	assert_eq!(h.owners.call_count(), 2);
	assert_eq!(result.owner_lookups, 2);
	assert_eq!(super::item_ids(&result), vec!["a1", "a2"]);
	assert_eq!(
		result.filter_report,
		vec![
			StageReport { stage: FilterStage::Structural, input: 4, output: 4 },
			StageReport { stage: FilterStage::TypeClassification, input: 4, output: 4 },
			StageReport { stage: FilterStage::NumericThreshold, input: 4, output: 3 },
			StageReport { stage: FilterStage::OwnerAggregate, input: 3, output: 2 },
		]
	);
}

#[tokio::test]
async fn unknown_owner_counts_as_zero() {
	let search = FixtureSearch::default().with_pages("cooking", SortOrder::Recency, &[&["a1"]]);
	let detail =
		FixtureDetail::default().with_items([item("a1", "ghost", "PT5M", 900, PUBLISHED)]);
	let h = super::harness(super::test_config(), search, detail, FixtureOwners::default());
	let result = h.service.aggregate(owner_request(0)).await.expect("Aggregation must succeed.");

	assert_eq!(super::item_ids(&result), vec!["a1"]);
	assert_eq!(h.service.owner_cache.entry("ghost").map(|entry| entry.metric_value), Some(0));
}

#[tokio::test]
async fn cached_owner_metrics_are_reused_across_runs() {
	let search = FixtureSearch::default().with_pages("cooking", SortOrder::Recency, &[&["a1"]]);
	let detail =
		FixtureDetail::default().with_items([item("a1", "owner-1", "PT5M", 900, PUBLISHED)]);
	let owners = FixtureOwners::default().with_metric("owner-1", 50);
	let h = super::harness(super::test_config(), search, detail, owners);
	let first =
		h.service.aggregate(owner_request(100)).await.expect("First aggregation must succeed.");
	let second =
		h.service.aggregate(owner_request(100)).await.expect("Second aggregation must succeed.");

	assert_eq!(h.owners.call_count(), 1);
	assert_eq!((first.cache.misses, first.cache.inserts, first.cache.hits), (1, 1, 0));
	assert_eq!((second.cache.misses, second.cache.inserts, second.cache.hits), (0, 0, 1));
	assert_eq!(first.owner_lookups, 1);
	assert_eq!(second.owner_lookups, 0);
	assert_eq!(second.cost_used + super::LOOKUP_COST, first.cost_used);
	assert_eq!(super::item_ids(&second), vec!["a1"]);
}

#[tokio::test]
async fn without_owner_ceiling_no_lookups_are_made() {
	let search = FixtureSearch::default().with_pages("cooking", SortOrder::Recency, &[&["a1"]]);
	let detail =
		FixtureDetail::default().with_items([item("a1", "owner-1", "PT5M", 900, PUBLISHED)]);
	let h = super::harness(super::test_config(), search, detail, FixtureOwners::default());
	let result = h
		.service
		.aggregate(SearchRequest::new("cooking", "KR"))
		.await
		.expect("Aggregation must succeed.");

	assert_eq!(h.owners.call_count(), 0);
	assert_eq!(result.owner_lookups, 0);
	assert_eq!(
		result.filter_report.last(),
		Some(&StageReport { stage: FilterStage::OwnerAggregate, input: 1, output: 1 })
	);
}

#[tokio::test]
async fn never_expiring_owner_ttl_serves_cached_metrics() {
	let mut cfg = super::test_config();

	cfg.cache.owner_ttl_secs = 10_000_000_000_000;

	let search = FixtureSearch::default().with_pages("cooking", SortOrder::Recency, &[&["a1"]]);
	let detail =
		FixtureDetail::default().with_items([item("a1", "owner-1", "PT5M", 900, PUBLISHED)]);
	let owners = FixtureOwners::default().with_metric("owner-1", 50);
	let h = super::harness(cfg, search, detail, owners);

	h.service.aggregate(owner_request(100)).await.expect("First aggregation must succeed.");

	let second =
		h.service.aggregate(owner_request(100)).await.expect("Second aggregation must succeed.");

	assert_eq!(h.owners.call_count(), 1);
	assert_eq!(second.cache.hits, 1);
	assert_eq!(second.cache.expirations, 0);
	assert_eq!(super::item_ids(&second), vec!["a1"]);
}
