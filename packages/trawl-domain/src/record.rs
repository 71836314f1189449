//! Item records: the raw detail payload shape and the validated record built from it.
//!
//! [`ItemRecord::from_raw`] is the only place raw detail payloads are interpreted. Everything
//! downstream works with typed records.

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{duration, request::TypeFilter};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawItem {
	pub id: Option<String>,
	pub snippet: Option<RawSnippet>,
	pub content_details: Option<RawContentDetails>,
	pub statistics: Option<RawStatistics>,
	pub status: Option<RawStatus>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnippet {
	pub published_at: Option<String>,
	pub channel_id: Option<String>,
	pub category_id: Option<String>,
	pub title: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContentDetails {
	pub duration: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatistics {
	pub view_count: Option<RawCount>,
	pub like_count: Option<RawCount>,
	pub comment_count: Option<RawCount>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatus {
	pub upload_status: Option<String>,
	pub privacy_status: Option<String>,
	pub embeddable: Option<bool>,
}

/// Counts arrive as decimal strings from the remote service, but numbers are accepted too.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
	Number(u64),
	Text(String),
}
impl RawCount {
	pub fn value(&self) -> Option<u64> {
		match self {
			Self::Number(value) => Some(*value),
			Self::Text(raw) => raw.trim().parse().ok(),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StructuralFlags {
	pub public: bool,
	pub processed: bool,
	pub embeddable: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ItemRecord {
	pub id: String,
	pub title: String,
	#[serde(with = "time::serde::rfc3339")]
	pub published_at: OffsetDateTime,
	pub duration_seconds: u64,
	pub view_count: u64,
	pub like_count: Option<u64>,
	pub comment_count: Option<u64>,
	pub owner_id: String,
	pub category_id: Option<String>,
	pub structural_flags: StructuralFlags,
}

/// Why a raw payload could not become an [`ItemRecord`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordDefect {
	MissingId,
	MissingStatistics,
	MissingDuration,
	UnparsableDuration,
	MissingOwner,
	MissingPublishedAt,
}
impl RecordDefect {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::MissingId => "missing_id",
			Self::MissingStatistics => "missing_statistics",
			Self::MissingDuration => "missing_duration",
			Self::UnparsableDuration => "unparsable_duration",
			Self::MissingOwner => "missing_owner",
			Self::MissingPublishedAt => "missing_published_at",
		}
	}
}

impl ItemRecord {
	pub fn from_raw(raw: RawItem) -> Result<Self, RecordDefect> {
		let id = raw
			.id
			.map(|id| id.trim().to_string())
			.filter(|id| !id.is_empty())
			.ok_or(RecordDefect::MissingId)?;
		let statistics = raw.statistics.ok_or(RecordDefect::MissingStatistics)?;
		let view_count = statistics
			.view_count
			.as_ref()
			.and_then(RawCount::value)
			.ok_or(RecordDefect::MissingStatistics)?;
		let raw_duration = raw
			.content_details
			.and_then(|details| details.duration)
			.ok_or(RecordDefect::MissingDuration)?;
		let duration_seconds = duration::parse_iso8601_seconds(&raw_duration)
			.ok_or(RecordDefect::UnparsableDuration)?;
		let snippet = raw.snippet.unwrap_or_default();
		let owner_id = snippet
			.channel_id
			.map(|owner| owner.trim().to_string())
			.filter(|owner| !owner.is_empty())
			.ok_or(RecordDefect::MissingOwner)?;
		let published_at = snippet
			.published_at
			.as_deref()
			.and_then(|value| OffsetDateTime::parse(value.trim(), &Rfc3339).ok())
			.ok_or(RecordDefect::MissingPublishedAt)?;
		let status = raw.status.unwrap_or_default();
		let structural_flags = StructuralFlags {
			public: status.privacy_status.as_deref().map(|s| s == "public").unwrap_or(true),
			processed: status.upload_status.as_deref().map(|s| s == "processed").unwrap_or(true),
			embeddable: status.embeddable.unwrap_or(true),
		};

		Ok(Self {
			id,
			title: snippet.title.unwrap_or_default(),
			published_at,
			duration_seconds,
			view_count,
			like_count: statistics.like_count.as_ref().and_then(RawCount::value),
			comment_count: statistics.comment_count.as_ref().and_then(RawCount::value),
			owner_id,
			category_id: snippet.category_id.filter(|category| !category.trim().is_empty()),
			structural_flags,
		})
	}

	/// Short when at or under the threshold, long otherwise.
	pub fn classify(&self, short_max_duration_secs: u64) -> TypeFilter {
		if self.duration_seconds <= short_max_duration_secs {
			TypeFilter::Short
		} else {
			TypeFilter::Long
		}
	}
}
