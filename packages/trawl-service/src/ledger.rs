use serde::Serialize;

/// Client-side accounting of remote cost units for one aggregation run.
///
/// Every remote call is preceded by a successful [`CostLedger::reserve`] sized to that call's
/// declared cost. `used` never decreases and never exceeds `limit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostLedger {
	used: u64,
	limit: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaLevel {
	Low,
	Medium,
	High,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QuotaStatus {
	pub used: u64,
	pub limit: u64,
	pub remaining: u64,
	pub usage_fraction: f64,
	pub level: QuotaLevel,
}

impl CostLedger {
	pub fn new(limit: u64) -> Self {
		Self { used: 0, limit }
	}

	/// Reserves `units` if they fit under the limit. A refused reservation changes nothing.
	pub fn reserve(&mut self, units: u64) -> bool {
		match self.used.checked_add(units) {
			Some(next) if next <= self.limit => {
				self.used = next;

				true
			},
			_ => false,
		}
	}

	pub fn can_afford(&self, units: u64) -> bool {
		units <= self.remaining()
	}

	pub fn used(&self) -> u64 {
		self.used
	}

	pub fn limit(&self) -> u64 {
		self.limit
	}

	pub fn remaining(&self) -> u64 {
		self.limit.saturating_sub(self.used)
	}

	pub fn usage_fraction(&self) -> f64 {
		if self.limit == 0 {
			return 1.0;
		}

		self.used as f64 / self.limit as f64
	}

	pub fn status(&self) -> QuotaStatus {
		let usage_fraction = self.usage_fraction();
		let level = if usage_fraction > 0.8 {
			QuotaLevel::High
		} else if usage_fraction > 0.5 {
			QuotaLevel::Medium
		} else {
			QuotaLevel::Low
		};

		QuotaStatus {
			used: self.used,
			limit: self.limit,
			remaining: self.remaining(),
			usage_fraction,
			level,
		}
	}
}
