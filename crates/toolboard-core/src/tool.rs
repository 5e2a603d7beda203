//! Tool records and the row-cleaning pipeline.
//!
//! A [`ToolRecord`] is identified by its title; the catalog carries no
//! surrogate ids. Rows arrive from the remote sheet as loosely-typed
//! [`RawToolRow`]s and pass through [`clean_rows`] before anything else in
//! the system sees them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A catalog row exactly as fetched, before cleaning. Every column is
/// optional; a missing column is treated the same as an empty cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawToolRow {
  pub title:             Option<String>,
  pub summary:           Option<String>,
  pub source_url:        Option<String>,
  pub author:            Option<String>,
  pub domain:            Option<String>,
  pub integration_steps: Option<String>,
  pub date_added:        Option<String>,
}

// ─── ToolRecord ──────────────────────────────────────────────────────────────

/// A cleaned catalog entry. The title doubles as the natural key; the vote
/// ledger references tools by title alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRecord {
  pub title:             String,
  pub summary:           String,
  pub source_url:        Option<String>,
  pub author:            String,
  pub domain:            String,
  /// Newline-delimited; see [`ToolRecord::integration_steps`].
  pub integration_steps: String,
  pub date_added:        DateTime<Utc>,
}

impl ToolRecord {
  /// The individual integration steps, with blank lines dropped.
  pub fn integration_steps(&self) -> impl Iterator<Item = &str> {
    self
      .integration_steps
      .lines()
      .map(str::trim)
      .filter(|s| !s.is_empty())
  }
}

// ─── Cleaning ────────────────────────────────────────────────────────────────

/// True when a cell is empty after trimming, or holds the literal `"nan"`
/// that the upstream sheet export produces for blank cells.
fn is_blank(value: &str) -> bool {
  let trimmed = value.trim();
  trimmed.is_empty() || trimmed == "nan"
}

fn cell(value: Option<String>) -> String {
  value.map(|s| s.trim().to_owned()).unwrap_or_default()
}

/// Accepted `Date_Added` formats, tried in order.
const DATE_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S",
  "%Y-%m-%d",
  "%m/%d/%Y %H:%M:%S",
  "%m/%d/%Y",
];

/// Parse a date cell, returning `None` when no format matches.
pub fn parse_date_added(value: &str) -> Option<DateTime<Utc>> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
    return Some(dt.with_timezone(&Utc));
  }
  for format in DATE_FORMATS {
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
      return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, format) {
      return Some(Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0)?));
    }
  }
  None
}

/// Run the cleaning pipeline over freshly-fetched rows.
///
/// - Rows with a blank (or `"nan"`) title or summary are dropped.
/// - Missing cells become empty strings; an empty source URL becomes `None`.
/// - `Date_Added` cells that fail to parse are stamped with `now`.
/// - The result is sorted newest-first by `date_added`.
pub fn clean_rows(rows: Vec<RawToolRow>, now: DateTime<Utc>) -> Vec<ToolRecord> {
  let mut records: Vec<ToolRecord> = rows
    .into_iter()
    .filter_map(|row| {
      let title = cell(row.title);
      let summary = cell(row.summary);
      if is_blank(&title) || is_blank(&summary) {
        return None;
      }

      let source_url = cell(row.source_url);
      let date_added = row
        .date_added
        .as_deref()
        .and_then(parse_date_added)
        .unwrap_or(now);

      Some(ToolRecord {
        title,
        summary,
        source_url: if is_blank(&source_url) { None } else { Some(source_url) },
        author: cell(row.author),
        domain: cell(row.domain),
        integration_steps: cell(row.integration_steps),
        date_added,
      })
    })
    .collect();

  records.sort_by(|a, b| b.date_added.cmp(&a.date_added));
  records
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn row(title: &str, summary: &str, date: &str) -> RawToolRow {
    RawToolRow {
      title:      Some(title.to_owned()),
      summary:    Some(summary.to_owned()),
      date_added: Some(date.to_owned()),
      ..Default::default()
    }
  }

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
  }

  #[test]
  fn blank_and_nan_titles_are_dropped() {
    let rows = vec![
      row("Real Tool", "Does things", "2025-01-02"),
      row("", "orphan summary", "2025-01-02"),
      row("  nan ", "nan title", "2025-01-02"),
      row("No summary", "", "2025-01-02"),
      row("Nan summary", "nan", "2025-01-02"),
    ];

    let cleaned = clean_rows(rows, now());
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].title, "Real Tool");
  }

  #[test]
  fn missing_columns_become_empty_cells() {
    let rows = vec![RawToolRow {
      title:   Some("Bare".into()),
      summary: Some("Minimal row".into()),
      ..Default::default()
    }];

    let cleaned = clean_rows(rows, now());
    assert_eq!(cleaned.len(), 1);
    assert_eq!(cleaned[0].author, "");
    assert_eq!(cleaned[0].domain, "");
    assert_eq!(cleaned[0].source_url, None);
    // Unparseable (absent) date falls back to ingestion time.
    assert_eq!(cleaned[0].date_added, now());
  }

  #[test]
  fn unparseable_date_uses_ingestion_time() {
    let cleaned = clean_rows(vec![row("T", "S", "soonish")], now());
    assert_eq!(cleaned[0].date_added, now());
  }

  #[test]
  fn date_formats_are_accepted() {
    for value in [
      "2025-03-04T05:06:07Z",
      "2025-03-04 05:06:07",
      "2025-03-04",
      "03/04/2025 05:06:07",
      "03/04/2025",
    ] {
      let parsed = parse_date_added(value);
      assert!(parsed.is_some(), "failed to parse {value:?}");
      let parsed = parsed.unwrap();
      assert_eq!(parsed.date_naive().to_string(), "2025-03-04");
    }
  }

  #[test]
  fn result_is_sorted_newest_first() {
    let rows = vec![
      row("Old", "s", "2024-01-01"),
      row("New", "s", "2025-05-01"),
      row("Mid", "s", "2024-12-31"),
    ];

    let titles: Vec<String> = clean_rows(rows, now())
      .into_iter()
      .map(|r| r.title)
      .collect();
    assert_eq!(titles, ["New", "Mid", "Old"]);
  }

  #[test]
  fn integration_steps_skip_blank_lines() {
    let record = clean_rows(
      vec![RawToolRow {
        title:             Some("T".into()),
        summary:           Some("S".into()),
        integration_steps: Some("1. Install\n\n  2. Configure\n".into()),
        ..Default::default()
      }],
      now(),
    )
    .remove(0);

    let steps: Vec<&str> = record.integration_steps().collect();
    assert_eq!(steps, ["1. Install", "2. Configure"]);
  }
}
