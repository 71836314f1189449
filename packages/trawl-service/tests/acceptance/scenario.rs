use trawl_domain::request::{Intensity, SearchRequest, SortOrder, TypeFilter};
use trawl_service::{Completion, QuotaLevel};

use super::{
	BATCH_COST, FixtureDetail, FixtureOwners, FixtureSearch, LOOKUP_COST, SEARCH_COST, item,
};

#[tokio::test]
async fn long_form_cooking_under_owner_ceiling() {
	let search = FixtureSearch::default()
		.with_pages("cooking", SortOrder::Recency, &[&["v1", "v2", "v3"], &["v4", "v5"]])
		.with_pages("cooking", SortOrder::Relevance, &[&["v3", "v6"]])
		.with_pages("cooking", SortOrder::Popularity, &[&["v7"]])
		.with_pages("recipe", SortOrder::Recency, &[&["v8", "v9"]]);
	let detail = FixtureDetail::default().with_items([
		item("v1", "owner-a", "PT45S", 1_000, "2026-10-09T00:00:00Z"),
		item("v2", "owner-a", "PT10M", 1_000, "2026-10-10T00:00:00Z"),
		item("v3", "owner-b", "PT1H", 1_000, "2026-10-11T00:00:00Z"),
		item("v4", "owner-a", "PT5M", 1_000, "2026-10-12T00:00:00Z"),
		item("v5", "owner-c", "PT2M", 1_000, "2026-10-08T00:00:00Z"),
		item("v6", "owner-a", "PT1M", 1_000, "2026-10-13T00:00:00Z"),
		item("v7", "owner-d", "PT3M", 1_000, "2026-10-14T00:00:00Z"),
		item("v8", "owner-b", "PT20M", 1_000, "2026-10-15T00:00:00Z"),
	]);
	let owners = FixtureOwners::default()
		.with_metric("owner-a", 50_000)
		.with_metric("owner-b", 250_000)
		.with_metric("owner-d", 100_000);
	let h = super::harness(super::test_config(), search, detail, owners);
	let req = SearchRequest {
		period_days: 7,
		desired_count: 4,
		type_filter: TypeFilter::Long,
		max_owner_metric: Some(100_000),
		intensity: Intensity::Medium,
		..SearchRequest::new("cooking", "KR")
	};
	let result = h.service.aggregate(req).await.expect("Aggregation must succeed.");
	let expected_cost = h.search.call_count() as u64 * SEARCH_COST
		+ h.detail.call_count() as u64 * BATCH_COST
		+ h.owners.call_count() as u64 * LOOKUP_COST;

	assert_eq!(result.completion, Completion::Complete);
	assert_eq!(super::item_ids(&result), vec!["v7", "v4", "v2", "v5"]);
	assert!(result.items.iter().all(|record| record.duration_seconds > 60));
	assert_eq!(result.cost_used, expected_cost);
	assert_eq!(result.cost_used, 505);
	assert_eq!(result.quota.level, QuotaLevel::Low);
	assert_eq!(result.candidates_found, 9);
	assert_eq!(result.records_resolved, 8);
	assert_eq!(result.owner_lookups, 4);
	assert_eq!(
		result.strategies_run.iter().map(|run| run.description.as_str()).collect::<Vec<_>>(),
		vec![
			"recency 'cooking' (8 pages)",
			"relevance 'cooking' (6 pages)",
			"popularity 'cooking' (4 pages)",
			"variant recency 'recipe' (4 pages)",
		]
	);
	assert!(result.skipped.is_empty());
}

#[tokio::test]
async fn no_matches_is_an_empty_success() {
	let h = super::harness(
		super::test_config(),
		FixtureSearch::default(),
		FixtureDetail::default(),
		FixtureOwners::default(),
	);
	let result = h
		.service
		.aggregate(SearchRequest::new("obscure hobby", "US"))
		.await
		.expect("An empty result is not an error.");

	assert!(result.is_empty());
	assert_eq!(result.completion, Completion::Complete);
	assert_eq!(result.strategies_run.len(), 3);
	assert_eq!(result.cost_used, 3 * SEARCH_COST);
	assert_eq!(h.detail.call_count(), 0);
	assert_eq!(result.candidates_found, 0);
}

#[tokio::test]
async fn result_serializes_for_callers() {
	let search = FixtureSearch::default().with_pages("cooking", SortOrder::Recency, &[&["a1"]]);
	let detail = FixtureDetail::default()
		.with_items([item("a1", "owner-1", "PT5M", 900, "2026-10-10T00:00:00Z")]);
	let h = super::harness(super::test_config(), search, detail, FixtureOwners::default());
	let result = h
		.service
		.aggregate(SearchRequest { desired_count: 1, ..SearchRequest::new("cooking", "KR") })
		.await
		.expect("Aggregation must succeed.");
	let value = serde_json::to_value(&result).expect("Failed to encode result.");

	assert_eq!(value["completion"], "complete");
	assert_eq!(value["items"][0]["published_at"], "2026-10-10T00:00:00Z");
	assert_eq!(value["quota"]["level"], "low");
	assert_eq!(value["filter_report"][0]["stage"], "structural");
}
