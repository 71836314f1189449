//! Turns a validated request into an ordered list of search strategies.
//!
//! The three base strategies always come first. Query variants only widen recall after them.

use serde::Serialize;

use trawl_domain::{
	expansion::QueryExpander,
	request::{SearchRequest, SortOrder},
};

/// Upper bound on lexical variants added on top of the base strategies.
pub const MAX_QUERY_VARIANTS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Strategy {
	pub query_variant: String,
	pub sort_order: SortOrder,
	pub page_budget: u32,
	pub description: String,
}
impl Strategy {
	fn new(query_variant: &str, sort_order: SortOrder, page_budget: u32, label: &str) -> Self {
		Self {
			query_variant: query_variant.to_string(),
			sort_order,
			page_budget,
			description: format!("{label} '{query_variant}' ({page_budget} pages)"),
		}
	}
}

pub fn plan(
	req: &SearchRequest,
	expander: &dyn QueryExpander,
	max_variants: usize,
) -> Vec<Strategy> {
	let query = req.query_text.trim();
	let first_budget = req.intensity.page_budget();
	let mut strategies = vec![
		Strategy::new(query, SortOrder::Recency, first_budget, "recency"),
		Strategy::new(
			query,
			SortOrder::Relevance,
			first_budget.saturating_sub(2).max(3),
			"relevance",
		),
		Strategy::new(
			query,
			SortOrder::Popularity,
			first_budget.saturating_sub(4).max(2),
			"popularity",
		),
	];

	if req.intensity.expands_queries() {
		let variant_budget = (first_budget / 2).max(2);
		let limit = max_variants.min(MAX_QUERY_VARIANTS);

		let variants = expander
			.expand(query, limit)
			.into_iter()
			.filter(|variant| !variant.trim().eq_ignore_ascii_case(query))
			.take(limit);

		for variant in variants {
			strategies.push(Strategy::new(
				&variant,
				SortOrder::Recency,
				variant_budget,
				"variant recency",
			));
		}
	}

	strategies.truncate(req.intensity.strategy_cap());

	strategies
}
