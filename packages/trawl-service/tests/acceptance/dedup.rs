use trawl_domain::request::{Intensity, SearchRequest, SortOrder};

use super::{FixtureDetail, FixtureOwners, FixtureSearch, item};

const PUBLISHED: &str = "2026-10-10T00:00:00Z";

#[tokio::test]
async fn overlapping_strategies_resolve_each_id_once() {
	let search = FixtureSearch::default()
		.with_pages("cooking", SortOrder::Recency, &[&["a1", "a2", "a3"], &["a4"]])
		.with_pages("cooking", SortOrder::Relevance, &[&["a2", "a3", "b1"]]);
	let detail = FixtureDetail::default().with_items(
		["a1", "a2", "a3", "a4", "b1"].map(|id| item(id, "owner-1", "PT5M", 900, PUBLISHED)),
	);
	let h = super::harness(super::test_config(), search, detail, FixtureOwners::default());
	let req = SearchRequest {
		desired_count: 10,
		intensity: Intensity::Basic,
		..SearchRequest::new("cooking", "KR")
	};
	let result = h.service.aggregate(req).await.expect("Aggregation must succeed.");
	let mut requested = h.detail.requested.lock().unwrap_or_else(|err| err.into_inner()).clone();

	requested.sort();

	assert_eq!(requested, vec!["a1", "a2", "a3", "a4", "b1"]);
	assert_eq!(result.candidates_found, 5);
	assert_eq!(result.strategies_run.len(), 2);
	assert_eq!(result.strategies_run[0].items_found, 4);
	assert_eq!(result.strategies_run[0].new_items, 4);
	assert_eq!(result.strategies_run[1].items_found, 3);
	assert_eq!(result.strategies_run[1].new_items, 1);
	assert_eq!(super::item_ids(&result), vec!["a1", "a2", "a3", "a4", "b1"]);
}

#[tokio::test]
async fn stops_running_strategies_once_recall_target_is_met() {
	let search = FixtureSearch::default()
		.with_pages("cooking", SortOrder::Recency, &[&["a1", "a2", "a3", "a4"], &["a5", "a6"]])
		.with_pages("cooking", SortOrder::Relevance, &[&["b1"]]);
	let detail = FixtureDetail::default().with_items(
		["a1", "a2", "a3", "a4", "a5", "a6"].map(|id| item(id, "owner-1", "PT5M", 900, PUBLISHED)),
	);
	let h = super::harness(super::test_config(), search, detail, FixtureOwners::default());
	let req = SearchRequest { desired_count: 3, ..SearchRequest::new("cooking", "US") };
	let result = h.service.aggregate(req).await.expect("Aggregation must succeed.");

	assert_eq!(result.strategies_run.len(), 1);
	assert_eq!(h.search.call_count(), 2);
	assert_eq!(result.candidates_found, 6);
	assert_eq!(result.items.len(), 3);
	assert!(
		h.search
			.queries
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.iter()
			.all(|(_, sort_order)| *sort_order == SortOrder::Recency)
	);
}
