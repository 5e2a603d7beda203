//! Handlers for the catalog read endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/api/tools` | optional `domain`, `days`, `page`, `refresh` |
//! | `GET`  | `/api/domains` | unique domain values with `"All"` first |

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use toolboard_core::{
  filter::{
    ALL_DOMAINS, filter_by_domain, filter_recent, paginate, sort_by_hotness,
    split_spotlight, unique_domains,
  },
  source::{CatalogSource, SnapshotStore},
  tool::ToolRecord,
  vote::HotnessTally,
};

use crate::AppState;

// ─── Response shapes ─────────────────────────────────────────────────────────

/// A catalog entry with its tally merged in, as the front end renders it.
#[derive(Debug, Serialize)]
pub struct ToolCard {
  #[serde(flatten)]
  pub record:  ToolRecord,
  pub hotness: u64,
}

impl ToolCard {
  fn new(record: ToolRecord, tally: &HotnessTally) -> Self {
    let hotness = tally.count_for(&record.title);
    Self { record, hotness }
  }
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
  /// The standalone top tool, when its tally crosses the threshold. Always
  /// excluded from `items`.
  pub spotlight:  Option<ToolCard>,
  pub items:      Vec<ToolCard>,
  pub page:       usize,
  pub page_count: usize,
  /// Grid total, not counting the spotlight.
  pub total:      usize,
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ToolsParams {
  /// Case-insensitive substring filter on the domain; `"All"` disables it.
  pub domain:  Option<String>,
  /// Restrict to tools added in the last N days.
  pub days:    Option<i64>,
  /// 1-indexed page, clamped server-side.
  pub page:    Option<usize>,
  /// Bypass the catalog cache for this read.
  #[serde(default)]
  pub refresh: bool,
}

/// `GET /api/tools[?domain=...][&days=...][&page=...][&refresh=true]`
pub async fn list<S, P>(
  State(state): State<AppState<S, P>>,
  Query(params): Query<ToolsParams>,
) -> Json<ToolsResponse>
where
  S: CatalogSource + 'static,
  P: SnapshotStore + 'static,
{
  let catalog = state.catalog.get_catalog(params.refresh).await;
  let tally = state.tally_or_empty().await;

  let mut records =
    filter_by_domain(catalog, params.domain.as_deref().unwrap_or(ALL_DOMAINS));
  if let Some(days) = params.days {
    records = filter_recent(records, days, Utc::now());
  }

  sort_by_hotness(&mut records, &tally);
  let (spotlight, grid) =
    split_spotlight(records, &tally, state.config.spotlight_threshold);
  let page = paginate(grid, params.page.unwrap_or(1), state.config.page_size);

  Json(ToolsResponse {
    spotlight:  spotlight.map(|r| ToolCard::new(r, &tally)),
    items:      page
      .items
      .into_iter()
      .map(|r| ToolCard::new(r, &tally))
      .collect(),
    page:       page.page,
    page_count: page.page_count,
    total:      page.total,
  })
}

// ─── Domains ─────────────────────────────────────────────────────────────────

/// `GET /api/domains`
pub async fn domains<S, P>(
  State(state): State<AppState<S, P>>,
) -> Json<Vec<String>>
where
  S: CatalogSource + 'static,
  P: SnapshotStore + 'static,
{
  let catalog = state.catalog.get_catalog(false).await;
  Json(unique_domains(&catalog))
}
