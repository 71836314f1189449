use trawl_domain::{
	record::RecordDefect,
	request::{SearchRequest, SortOrder},
};
use trawl_service::{Completion, DefectCount, Error, SkipReason, SkipScope, StopReason};

use super::{Failure, FixtureDetail, FixtureOwners, FixtureSearch, item};

const PUBLISHED: &str = "2026-10-10T00:00:00Z";

#[tokio::test]
async fn invalid_request_makes_no_remote_calls() {
	let h = super::harness(
		super::test_config(),
		FixtureSearch::default(),
		FixtureDetail::default(),
		FixtureOwners::default(),
	);
	let err = h
		.service
		.aggregate(SearchRequest::new("cooking", "JP"))
		.await
		.expect_err("Unsupported region must be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert!(!err.is_recoverable());
	assert_eq!(h.search.call_count(), 0);
	assert_eq!(h.detail.call_count(), 0);
}

#[tokio::test]
async fn remote_quota_failure_during_search_is_recoverable() {
	let search = FixtureSearch::default()
		.with_pages("cooking", SortOrder::Recency, &[&["a1"], &["a2"], &["a3"]])
		.failing("cooking", SortOrder::Recency, 1, Failure::Quota);
	let h = super::harness(
		super::test_config(),
		search,
		FixtureDetail::default(),
		FixtureOwners::default(),
	);
	let err = h
		.service
		.aggregate(SearchRequest::new("cooking", "KR"))
		.await
		.expect_err("Quota failure must abort the run.");

	assert!(err.is_recoverable());
	assert!(matches!(err, Error::QuotaExhausted { cost_used: 200, .. }));
	assert_eq!(h.detail.call_count(), 0);
}

#[tokio::test]
async fn remote_quota_failure_during_resolution_is_recoverable() {
	let search = FixtureSearch::default().with_pages("cooking", SortOrder::Recency, &[&["a1"]]);
	let detail = FixtureDetail::default().failing(Failure::Quota);
	let h = super::harness(super::test_config(), search, detail, FixtureOwners::default());
	let err = h
		.service
		.aggregate(SearchRequest { desired_count: 1, ..SearchRequest::new("cooking", "KR") })
		.await
		.expect_err("Quota failure must abort the run.");

	assert!(matches!(err, Error::QuotaExhausted { cost_used: 401, .. }));
}

#[tokio::test]
async fn transient_page_failure_skips_only_that_strategy() {
	let search = FixtureSearch::default()
		.with_pages("travel", SortOrder::Recency, &[&["a1"]])
		.with_pages("travel", SortOrder::Popularity, &[&["c1"]])
		.failing("travel", SortOrder::Relevance, 0, Failure::Transient);
	let detail = FixtureDetail::default().with_items([
		item("a1", "owner-1", "PT5M", 900, "2026-10-10T00:00:00Z"),
		item("c1", "owner-1", "PT5M", 900, "2026-10-11T00:00:00Z"),
	]);
	let h = super::harness(super::test_config(), search, detail, FixtureOwners::default());
	let result = h
		.service
		.aggregate(SearchRequest::new("travel", "US"))
		.await
		.expect("Transient failures must not abort the run.");

	assert_eq!(result.completion, Completion::Complete);
	assert_eq!(result.strategies_run.len(), 3);
	assert_eq!(result.strategies_run[1].stop, StopReason::RemoteFailure);
	assert_eq!(result.strategies_run[1].cost, super::SEARCH_COST);
	assert_eq!(result.skipped.len(), 1);
	assert_eq!(result.skipped[0].scope, SkipScope::Page);
	assert_eq!(result.skipped[0].reason, SkipReason::Transient);
	assert_eq!(result.skipped[0].target, result.strategies_run[1].description);
	assert_eq!(super::item_ids(&result), vec!["c1", "a1"]);
}

#[tokio::test]
async fn transient_batch_failure_yields_empty_result() {
	let search = FixtureSearch::default().with_pages("cooking", SortOrder::Recency, &[&["a1"]]);
	let detail = FixtureDetail::default().failing(Failure::Transient);
	let h = super::harness(super::test_config(), search, detail, FixtureOwners::default());
	let result = h
		.service
		.aggregate(SearchRequest { desired_count: 1, ..SearchRequest::new("cooking", "KR") })
		.await
		.expect("Transient failures must not abort the run.");

	assert!(result.is_empty());
	assert_eq!(result.candidates_found, 1);
	assert!(
		result
			.skipped
			.iter()
			.any(|skip| skip.scope == SkipScope::Batch && skip.reason == SkipReason::Transient)
	);
}

#[tokio::test]
async fn malformed_records_are_counted_and_dropped() {
	let mut broken = item("a2", "owner-1", "PT5M", 900, PUBLISHED);

	broken.as_object_mut().expect("Object expected.").remove("statistics");

	let search =
		FixtureSearch::default().with_pages("cooking", SortOrder::Recency, &[&["a1", "a2"]]);
	let detail = FixtureDetail::default()
		.with_items([item("a1", "owner-1", "PT5M", 900, PUBLISHED), broken]);
	let h = super::harness(super::test_config(), search, detail, FixtureOwners::default());
	let result = h
		.service
		.aggregate(SearchRequest { desired_count: 1, ..SearchRequest::new("cooking", "KR") })
		.await
		.expect("Aggregation must succeed.");

	assert_eq!(result.records_resolved, 1);
	assert_eq!(
		result.records_dropped,
		vec![DefectCount { defect: RecordDefect::MissingStatistics, count: 1 }]
	);
	assert_eq!(super::item_ids(&result), vec!["a1"]);
}
