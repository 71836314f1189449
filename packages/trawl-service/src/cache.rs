use std::{collections::HashMap, sync::Mutex};

use serde::Serialize;
use time::{Duration, OffsetDateTime};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerMetricCacheEntry {
	pub owner_id: String,
	pub metric_value: u64,
	pub fetched_at: OffsetDateTime,
	pub ttl: Duration,
}
impl OwnerMetricCacheEntry {
	/// An expiry past the representable date range never comes, so such entries stay fresh.
	pub fn is_fresh(&self, now: OffsetDateTime) -> bool {
		self.fetched_at.checked_add(self.ttl).is_none_or(|expires_at| now < expires_at)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
	pub hits: u64,
	pub misses: u64,
	pub inserts: u64,
	pub expirations: u64,
}
impl CacheStats {
	/// Counter growth since `earlier`.
	pub fn since(&self, earlier: &CacheStats) -> CacheStats {
		CacheStats {
			hits: self.hits.saturating_sub(earlier.hits),
			misses: self.misses.saturating_sub(earlier.misses),
			inserts: self.inserts.saturating_sub(earlier.inserts),
			expirations: self.expirations.saturating_sub(earlier.expirations),
		}
	}
}

/// Owner metric memo shared across runs. Entries are replaced wholesale, never patched.
#[derive(Debug)]
pub struct OwnerMetricCache {
	ttl: Duration,
	state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
	entries: HashMap<String, OwnerMetricCacheEntry>,
	stats: CacheStats,
}

impl OwnerMetricCache {
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, state: Mutex::new(CacheState::default()) }
	}

	/// Returns the cached metric when present and fresh. Stale entries are evicted.
	pub fn get(&self, owner_id: &str, now: OffsetDateTime) -> Option<u64> {
		let mut state = self.state.lock().unwrap_or_else(|err| err.into_inner());
		let fresh =
			state.entries.get(owner_id).map(|entry| (entry.is_fresh(now), entry.metric_value));

		match fresh {
			Some((true, metric)) => {
				state.stats.hits += 1;

				Some(metric)
			},
			Some((false, _)) => {
				state.entries.remove(owner_id);
				state.stats.expirations += 1;
				state.stats.misses += 1;

				None
			},
			None => {
				state.stats.misses += 1;

				None
			},
		}
	}

	pub fn insert(&self, owner_id: &str, metric_value: u64, now: OffsetDateTime) {
		let entry = OwnerMetricCacheEntry {
			owner_id: owner_id.to_string(),
			metric_value,
			fetched_at: now,
			ttl: self.ttl,
		};
		let mut state = self.state.lock().unwrap_or_else(|err| err.into_inner());

		state.entries.insert(owner_id.to_string(), entry);
		state.stats.inserts += 1;
	}

	pub fn entry(&self, owner_id: &str) -> Option<OwnerMetricCacheEntry> {
		let state = self.state.lock().unwrap_or_else(|err| err.into_inner());

		state.entries.get(owner_id).cloned()
	}

	/// Drops every stale entry and returns how many were removed.
	pub fn purge_expired(&self, now: OffsetDateTime) -> usize {
		let mut state = self.state.lock().unwrap_or_else(|err| err.into_inner());
		let before = state.entries.len();

		state.entries.retain(|_, entry| entry.is_fresh(now));

		let removed = before - state.entries.len();

		state.stats.expirations += removed as u64;

		removed
	}

	pub fn len(&self) -> usize {
		self.state.lock().unwrap_or_else(|err| err.into_inner()).entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn stats(&self) -> CacheStats {
		self.state.lock().unwrap_or_else(|err| err.into_inner()).stats
	}
}
