//! JSON REST API for the toolboard catalog service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`toolboard_core::source::CatalogSource`]. The single-page front end is
//! an external collaborator; this crate is the surface it calls. TLS and
//! transport concerns are the caller's responsibility.

pub mod error;
pub mod signup;
pub mod tools;
pub mod votes;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use toolboard_core::{
  cache::CatalogCache,
  filter::{PAGE_SIZE, SPOTLIGHT_THRESHOLD},
  identity::IdentityResolver,
  ledger::{TALLY_TTL, VOTE_STATUS_TTL, VoteLedger},
  source::{CatalogSource, SnapshotStore},
  vote::HotnessTally,
};
use toolboard_sheets::SignupBook;

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_host() -> String {
  "127.0.0.1".to_owned()
}
fn default_port() -> u16 {
  8080
}
fn default_cache_ttl_hours() -> u64 {
  1
}
fn default_vote_status_ttl_secs() -> u64 {
  VOTE_STATUS_TTL.as_secs()
}
fn default_tally_ttl_secs() -> u64 {
  TALLY_TTL.as_secs()
}
fn default_credentials_path() -> PathBuf {
  PathBuf::from("credentials/service_account.json")
}
fn default_snapshot_path() -> PathBuf {
  PathBuf::from("cache/catalog_snapshot.csv")
}
fn default_signup_path() -> PathBuf {
  PathBuf::from("cache/signups.csv")
}
fn default_spotlight_threshold() -> u64 {
  SPOTLIGHT_THRESHOLD
}
fn default_page_size() -> usize {
  PAGE_SIZE
}
fn default_trust_forwarded_header() -> bool {
  true
}

/// Runtime server configuration, deserialised from `config.toml` layered
/// with `TOOLBOARD_`-prefixed environment variables. Only the catalog URL
/// has no default.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                   String,
  #[serde(default = "default_port")]
  pub port:                   u16,
  /// URL of the remote catalog spreadsheet.
  pub catalog_url:            String,
  #[serde(default = "default_cache_ttl_hours")]
  pub cache_ttl_hours:        u64,
  #[serde(default = "default_vote_status_ttl_secs")]
  pub vote_status_ttl_secs:   u64,
  #[serde(default = "default_tally_ttl_secs")]
  pub tally_ttl_secs:         u64,
  #[serde(default = "default_credentials_path")]
  pub credentials_path:       PathBuf,
  #[serde(default = "default_snapshot_path")]
  pub snapshot_path:          PathBuf,
  #[serde(default = "default_signup_path")]
  pub signup_path:            PathBuf,
  #[serde(default = "default_spotlight_threshold")]
  pub spotlight_threshold:    u64,
  #[serde(default = "default_page_size")]
  pub page_size:              usize,
  /// When true, the forwarded-address header from the reverse proxy is
  /// preferred over the derived visitor identifier.
  #[serde(default = "default_trust_forwarded_header")]
  pub trust_forwarded_header: bool,
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: CatalogSource, P: SnapshotStore> {
  pub catalog:  Arc<CatalogCache<S, P>>,
  pub ledger:   Arc<VoteLedger<S>>,
  pub signups:  Arc<SignupBook>,
  pub resolver: Arc<dyn IdentityResolver>,
  pub config:   Arc<ServerConfig>,
}

// Manual impl: every field is an `Arc`, so no bounds on `S`/`P` are needed.
impl<S: CatalogSource, P: SnapshotStore> Clone for AppState<S, P> {
  fn clone(&self) -> Self {
    Self {
      catalog:  self.catalog.clone(),
      ledger:   self.ledger.clone(),
      signups:  self.signups.clone(),
      resolver: self.resolver.clone(),
      config:   self.config.clone(),
    }
  }
}

impl<S, P> AppState<S, P>
where
  S: CatalogSource + 'static,
  P: SnapshotStore + 'static,
{
  /// The tally, degrading to an empty map when the vote log is unreachable.
  pub(crate) async fn tally_or_empty(&self) -> HotnessTally {
    match self.ledger.get_tally().await {
      Ok(tally) => tally,
      Err(e) => {
        tracing::warn!(error = %e, "tally fetch failed, serving empty tally");
        HotnessTally::default()
      }
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn router<S, P>(state: AppState<S, P>) -> Router
where
  S: CatalogSource + 'static,
  P: SnapshotStore + 'static,
{
  Router::new()
    .route("/api/health", get(health))
    // Catalog
    .route("/api/tools", get(tools::list::<S, P>))
    .route("/api/domains", get(tools::domains::<S, P>))
    // Votes
    .route("/api/tools/vote", post(votes::cast::<S, P>))
    .route("/api/tally", get(votes::tally::<S, P>))
    // Signups
    .route("/api/signup", post(signup::register::<S, P>))
    .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
  Json(json!({ "status": "ok" }))
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use std::time::Duration;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::Value;
  use tower::ServiceExt as _;

  use toolboard_core::{
    identity::TrustedProxyResolver,
    source::{MemorySnapshot, StaticSource},
    tool::RawToolRow,
  };

  fn raw(title: &str, domain: &str) -> RawToolRow {
    RawToolRow {
      title:      Some(title.to_owned()),
      summary:    Some("summary".to_owned()),
      domain:     Some(domain.to_owned()),
      date_added: Some("2025-04-01".to_owned()),
      ..Default::default()
    }
  }

  fn test_config() -> ServerConfig {
    ServerConfig {
      host:                   default_host(),
      port:                   default_port(),
      catalog_url:            "http://sheets.test/catalog".to_owned(),
      cache_ttl_hours:        default_cache_ttl_hours(),
      vote_status_ttl_secs:   default_vote_status_ttl_secs(),
      tally_ttl_secs:         default_tally_ttl_secs(),
      credentials_path:       default_credentials_path(),
      snapshot_path:          default_snapshot_path(),
      signup_path:            default_signup_path(),
      spotlight_threshold:    default_spotlight_threshold(),
      page_size:              default_page_size(),
      trust_forwarded_header: true,
    }
  }

  /// The returned `TempDir` keeps the signup book's directory alive.
  fn make_state(
    tools: Vec<RawToolRow>,
  ) -> (AppState<Arc<StaticSource>, MemorySnapshot>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(StaticSource::new(tools));

    let state = AppState {
      catalog:  Arc::new(CatalogCache::new(
        source.clone(),
        MemorySnapshot::new(),
        Duration::from_secs(3600),
      )),
      ledger:   Arc::new(VoteLedger::new(source, VOTE_STATUS_TTL, TALLY_TTL)),
      signups:  Arc::new(SignupBook::new(dir.path().join("signups.csv"))),
      resolver: Arc::new(TrustedProxyResolver::default()),
      config:   Arc::new(test_config()),
    };
    (state, dir)
  }

  async fn get_json(
    state: AppState<Arc<StaticSource>, MemorySnapshot>,
    uri: &str,
  ) -> (StatusCode, Value) {
    let resp = router(state)
      .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  async fn post_json(
    state: AppState<Arc<StaticSource>, MemorySnapshot>,
    uri: &str,
    headers: Vec<(header::HeaderName, &str)>,
    body: Value,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json");
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();

    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  // ── Health ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_reports_ok() {
    let (state, _dir) = make_state(vec![]);
    let (status, body) = get_json(state, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
  }

  // ── Tools ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn tools_listing_drops_invalid_rows_and_merges_tally() {
    let (state, _dir) = make_state(vec![
      raw("Prompt Studio", "Analytics"),
      raw("Chart Pilot", "Data Preparation & Automation"),
      RawToolRow::default(), // blank row — cleaned away
    ]);

    let (status, body) = get_json(state, "/api/tools").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_count"], 1);
    assert!(body["spotlight"].is_null());
    assert_eq!(body["items"][0]["hotness"], 0);
  }

  #[tokio::test]
  async fn tools_listing_filters_by_domain_substring() {
    let (state, _dir) = make_state(vec![
      raw("Prompt Studio", "Analytics"),
      raw("Chart Pilot", "Data Preparation & Automation"),
    ]);

    let (_, body) = get_json(state, "/api/tools?domain=data").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["title"], "Chart Pilot");
  }

  #[tokio::test]
  async fn domains_endpoint_lists_unique_values() {
    let (state, _dir) = make_state(vec![
      raw("A", "ML"),
      raw("B", "Analytics"),
      raw("C", "ML"),
    ]);

    let (_, body) = get_json(state, "/api/domains").await;
    assert_eq!(body, serde_json::json!(["All", "Analytics", "ML"]));
  }

  #[tokio::test]
  async fn unreachable_source_serves_empty_listing() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(StaticSource::new(vec![raw("A", "ML")]));
    source.set_unavailable(true);

    let state = AppState {
      catalog:  Arc::new(CatalogCache::new(
        source.clone(),
        MemorySnapshot::new(),
        Duration::from_secs(3600),
      )),
      ledger:   Arc::new(VoteLedger::new(source, VOTE_STATUS_TTL, TALLY_TTL)),
      signups:  Arc::new(SignupBook::new(dir.path().join("signups.csv"))),
      resolver: Arc::new(TrustedProxyResolver::default()),
      config:   Arc::new(test_config()),
    };

    // Remote down, no snapshot: the listing degrades to empty, never errors.
    let (status, body) = get_json(state, "/api/tools").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().unwrap().is_empty());
  }

  // ── Votes ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn vote_counts_once_per_visitor() {
    let (state, _dir) = make_state(vec![raw("Prompt Studio", "Analytics")]);
    let forwarded = header::HeaderName::from_static("x-forwarded-for");

    let (status, body) = post_json(
      state.clone(),
      "/api/tools/vote",
      vec![(forwarded.clone(), "203.0.113.9")],
      serde_json::json!({ "tool_title": "Prompt Studio" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counted"], true);
    assert_eq!(body["hotness"], 1);

    let (_, body) = post_json(
      state,
      "/api/tools/vote",
      vec![(forwarded, "203.0.113.9")],
      serde_json::json!({ "tool_title": "Prompt Studio" }),
    )
    .await;
    assert_eq!(body["counted"], false);
    assert_eq!(body["hotness"], 1);
  }

  #[tokio::test]
  async fn different_visitors_both_count() {
    let (state, _dir) = make_state(vec![raw("Prompt Studio", "Analytics")]);
    let forwarded = header::HeaderName::from_static("x-forwarded-for");

    for addr in ["203.0.113.9", "203.0.113.10"] {
      let (_, body) = post_json(
        state.clone(),
        "/api/tools/vote",
        vec![(forwarded.clone(), addr)],
        serde_json::json!({ "tool_title": "Prompt Studio" }),
      )
      .await;
      assert_eq!(body["counted"], true);
    }

    let (_, tally) = get_json(state, "/api/tally").await;
    assert_eq!(tally["Prompt Studio"], 2);
  }

  #[tokio::test]
  async fn vote_for_unknown_tool_is_404() {
    let (state, _dir) = make_state(vec![raw("Prompt Studio", "Analytics")]);

    let (status, _) = post_json(
      state,
      "/api/tools/vote",
      vec![],
      serde_json::json!({ "tool_title": "Not A Tool" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn vote_without_title_is_400() {
    let (state, _dir) = make_state(vec![raw("Prompt Studio", "Analytics")]);

    let (status, _) = post_json(
      state,
      "/api/tools/vote",
      vec![],
      serde_json::json!({ "tool_title": "   " }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Signup ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn signup_then_duplicate_email() {
    let (state, _dir) = make_state(vec![]);

    let (status, body) = post_json(
      state.clone(),
      "/api/signup",
      vec![],
      serde_json::json!({ "name": "Ada", "email": "ada@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registered"], true);

    let (status, body) = post_json(
      state,
      "/api/signup",
      vec![],
      serde_json::json!({ "name": "Ada", "email": "ada@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["registered"], false);
  }

  #[tokio::test]
  async fn signup_rejects_invalid_email() {
    let (state, _dir) = make_state(vec![]);

    let (status, _) = post_json(
      state,
      "/api/signup",
      vec![],
      serde_json::json!({ "name": "Ada", "email": "not-an-email" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }
}
