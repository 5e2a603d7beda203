//! Catalog filtering, hotness ordering, the spotlight rule, and pagination.
//!
//! These operate on already-cleaned [`ToolRecord`] sets in memory; the API
//! layer composes them per request.

use chrono::{DateTime, Duration, Utc};

use crate::{tool::ToolRecord, vote::HotnessTally};

/// Sentinel domain value that disables filtering.
pub const ALL_DOMAINS: &str = "All";
/// A tool whose tally reaches this count is rendered as the spotlight.
pub const SPOTLIGHT_THRESHOLD: u64 = 5;
/// Fixed grid page size.
pub const PAGE_SIZE: usize = 30;

// ─── Domain filter ───────────────────────────────────────────────────────────

/// Keep records whose domain contains `selected`, case-insensitively.
/// `"All"` (or an empty selection) disables filtering.
pub fn filter_by_domain(records: Vec<ToolRecord>, selected: &str) -> Vec<ToolRecord> {
  if selected.is_empty() || selected == ALL_DOMAINS {
    return records;
  }

  let needle = selected.to_lowercase();
  records
    .into_iter()
    .filter(|r| r.domain.to_lowercase().contains(&needle))
    .collect()
}

/// Keep records added within the last `days` days.
pub fn filter_recent(
  records: Vec<ToolRecord>,
  days: i64,
  now: DateTime<Utc>,
) -> Vec<ToolRecord> {
  let cutoff = now - Duration::days(days);
  records
    .into_iter()
    .filter(|r| r.date_added >= cutoff)
    .collect()
}

/// The sorted unique domain values present in `records`, with the `"All"`
/// sentinel prepended.
pub fn unique_domains(records: &[ToolRecord]) -> Vec<String> {
  let mut domains: Vec<String> = records
    .iter()
    .map(|r| r.domain.clone())
    .filter(|d| !d.is_empty())
    .collect();
  domains.sort();
  domains.dedup();

  let mut result = vec![ALL_DOMAINS.to_owned()];
  result.extend(domains.into_iter().filter(|d| d != ALL_DOMAINS));
  result
}

// ─── Hotness ordering ────────────────────────────────────────────────────────

/// Sort by tally descending, then by `date_added` descending.
pub fn sort_by_hotness(records: &mut [ToolRecord], tally: &HotnessTally) {
  records.sort_by(|a, b| {
    tally
      .count_for(&b.title)
      .cmp(&tally.count_for(&a.title))
      .then_with(|| b.date_added.cmp(&a.date_added))
  });
}

/// Pull the top record out of the grid when its tally reaches `threshold`.
///
/// `records` must already be hotness-sorted; the spotlight is excluded from
/// the remaining grid (and from its item count).
pub fn split_spotlight(
  mut records: Vec<ToolRecord>,
  tally: &HotnessTally,
  threshold: u64,
) -> (Option<ToolRecord>, Vec<ToolRecord>) {
  let qualifies = records
    .first()
    .is_some_and(|top| tally.count_for(&top.title) >= threshold);

  if qualifies {
    let top = records.remove(0);
    (Some(top), records)
  } else {
    (None, records)
  }
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// One page of the catalog grid.
#[derive(Debug, Clone)]
pub struct Page {
  pub items:      Vec<ToolRecord>,
  /// 1-indexed, clamped to `[1, page_count]`.
  pub page:       usize,
  pub page_count: usize,
  pub total:      usize,
}

/// Slice `records` into the requested page.
///
/// Page numbers are 1-indexed and clamped; an empty input yields a single
/// empty page 1.
pub fn paginate(records: Vec<ToolRecord>, page: usize, page_size: usize) -> Page {
  let total = records.len();
  let page_count = total.div_ceil(page_size).max(1);
  let page = page.clamp(1, page_count);

  let start = (page - 1) * page_size;
  let items = records
    .into_iter()
    .skip(start)
    .take(page_size)
    .collect();

  Page {
    items,
    page,
    page_count,
    total,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
