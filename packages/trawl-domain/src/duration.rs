//! ISO-8601 duration parsing for item lengths, e.g. `PT15M33S` or `P1DT2H`.

use std::sync::LazyLock;

use regex::Regex;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
		.unwrap_or_else(|err| panic!("Invalid duration pattern: {err}"))
});

/// Returns the total number of seconds, or `None` when the value is not a day/time duration.
pub fn parse_iso8601_seconds(raw: &str) -> Option<u64> {
	let raw = raw.trim();

	if raw == "P" || raw.ends_with('T') {
		return None;
	}

	let caps = ISO_DURATION.captures(raw)?;
	let part = |index: usize| -> Option<u64> {
		match caps.get(index) {
			Some(m) => m.as_str().parse().ok(),
			None => Some(0),
		}
	};
	let days = part(1)?;
	let hours = part(2)?;
	let minutes = part(3)?;
	let seconds = part(4)?;

	days.checked_mul(86_400)?
		.checked_add(hours.checked_mul(3_600)?)?
		.checked_add(minutes.checked_mul(60)?)?
		.checked_add(seconds)
}
