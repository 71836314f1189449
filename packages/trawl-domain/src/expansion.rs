//! Lexical query variants used to widen recall.
//!
//! The engine only sees the [`QueryExpander`] trait, so callers can plug in any source of
//! variants. [`SynonymTable`] is the rule-based default fed from configuration.

use std::collections::HashSet;

use trawl_config::Expansion;

pub trait QueryExpander
where
	Self: Send + Sync,
{
	/// Returns at most `max_variants` variants, none equal to `query`.
	fn expand(&self, query: &str, max_variants: usize) -> Vec<String>;
}

/// Expander that never produces variants.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExpansion;
impl QueryExpander for NoExpansion {
	fn expand(&self, _query: &str, _max_variants: usize) -> Vec<String> {
		Vec::new()
	}
}

#[derive(Clone, Debug, Default)]
pub struct SynonymTable {
	entries: Vec<SynonymRule>,
}

#[derive(Clone, Debug)]
struct SynonymRule {
	phrase: String,
	related: Vec<String>,
}

impl SynonymTable {
	pub fn new<I, P, R>(entries: I) -> Self
	where
		I: IntoIterator<Item = (P, Vec<R>)>,
		P: Into<String>,
		R: Into<String>,
	{
		let entries = entries
			.into_iter()
			.map(|(phrase, related)| SynonymRule {
				phrase: phrase.into().trim().to_lowercase(),
				related: related.into_iter().map(Into::into).collect(),
			})
			.filter(|rule| !rule.phrase.is_empty())
			.collect();

		Self { entries }
	}

	pub fn from_config(cfg: &Expansion) -> Self {
		Self::new(cfg.synonyms.iter().map(|entry| (entry.phrase.clone(), entry.related.clone())))
	}
}

impl QueryExpander for SynonymTable {
	fn expand(&self, query: &str, max_variants: usize) -> Vec<String> {
		let lowered = query.trim().to_lowercase();
		let mut out = Vec::new();
		let mut seen = HashSet::from([lowered.clone()]);

		for rule in &self.entries {
			if !lowered.contains(rule.phrase.as_str()) {
				continue;
			}

			for related in &rule.related {
				if out.len() >= max_variants {
					return out;
				}

				let variant = lowered.replacen(rule.phrase.as_str(), related.trim(), 1);

				push_variant(&mut out, &mut seen, &variant);
			}
		}

		out.truncate(max_variants);

		out
	}
}

fn push_variant(out: &mut Vec<String>, seen: &mut HashSet<String>, value: &str) {
	let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");

	if collapsed.is_empty() {
		return;
	}
	if seen.insert(collapsed.clone()) {
		out.push(collapsed);
	}
}
