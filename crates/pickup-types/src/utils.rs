//! Serde helpers and formatting utilities.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Deserializes an optional ISO-8601 timestamp.
///
/// Accepts both offset-carrying values (`2024-03-01T10:15:30+00:00`), which
/// are normalized to UTC, and naive ones (`2024-03-01T10:15:30.123456`).
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: Option<String> = Option::deserialize(deserializer)?;
	let Some(raw) = raw else {
		return Ok(None);
	};

	if let Ok(with_offset) = DateTime::parse_from_rfc3339(&raw) {
		return Ok(Some(with_offset.naive_utc()));
	}

	raw.parse::<NaiveDateTime>()
		.map(Some)
		.map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

/// Shortens text for tabular display, appending ".." when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		text.to_string()
	} else {
		let kept: String = text.chars().take(max_chars.saturating_sub(2)).collect();
		format!("{}..", kept)
	}
}
