//! Handlers for the hotness vote endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/tools/vote` | Body: [`VoteBody`]; one vote per visitor per tool |
//! | `GET`  | `/api/tally` | Full hotness tally map |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};

use toolboard_core::{
  identity::VisitorHints,
  source::{CatalogSource, SnapshotStore},
  vote::{HotnessTally, NewVote},
};

use crate::{AppState, error::ApiError};

/// Session token header accepted as a fallback to the body field.
const SESSION_HEADER: &str = "x-session-id";

// ─── Cast ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VoteBody {
  pub tool_title:    String,
  /// Opaque per-session token minted by the front end; feeds the derived
  /// visitor identifier when no trusted proxy header is present.
  pub session_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
  /// False when this visitor had already voted for the tool, or when the
  /// remote log is temporarily unreachable.
  pub counted: bool,
  pub hotness: u64,
  pub message: String,
}

fn hints_from(headers: &HeaderMap, body_token: Option<String>) -> VisitorHints {
  let header_str = |name: header::HeaderName| {
    headers
      .get(name)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned)
  };

  VisitorHints {
    forwarded_for: header_str(header::HeaderName::from_static("x-forwarded-for")),
    session_token: body_token
      .or_else(|| header_str(header::HeaderName::from_static(SESSION_HEADER))),
    user_agent:    header_str(header::USER_AGENT),
  }
}

/// `POST /api/tools/vote`
///
/// A duplicate vote and an unreachable vote log both come back as a normal
/// response with `counted: false` — neither is a failure from the UI's point
/// of view.
pub async fn cast<S, P>(
  State(state): State<AppState<S, P>>,
  headers: HeaderMap,
  Json(body): Json<VoteBody>,
) -> Result<Json<VoteResponse>, ApiError>
where
  S: CatalogSource + 'static,
  P: SnapshotStore + 'static,
{
  let tool_title = body.tool_title.trim().to_owned();
  if tool_title.is_empty() {
    return Err(ApiError::BadRequest("tool_title is required".into()));
  }

  let catalog = state.catalog.get_catalog(false).await;
  if !catalog.iter().any(|r| r.title == tool_title) {
    return Err(ApiError::NotFound(format!("no tool titled {tool_title:?}")));
  }

  let hints = hints_from(&headers, body.session_token);
  let visitor_id = state.resolver.resolve(&hints);

  let vote = NewVote {
    tool_title: tool_title.clone(),
    visitor_id,
    user_agent: hints.user_agent.clone(),
    session_id: hints.session_token.clone(),
  };

  let (counted, message) = match state.ledger.record_vote(vote).await {
    Ok(true) => (true, "vote counted".to_owned()),
    Ok(false) => (false, "you already voted for this tool".to_owned()),
    Err(e) => {
      tracing::warn!(error = %e, tool = %tool_title, "vote append failed");
      (false, "voting is temporarily unavailable".to_owned())
    }
  };

  let hotness = state.tally_or_empty().await.count_for(&tool_title);
  Ok(Json(VoteResponse {
    counted,
    hotness,
    message,
  }))
}

// ─── Tally ───────────────────────────────────────────────────────────────────

/// `GET /api/tally` — degrades to an empty map when the vote log is
/// unreachable.
pub async fn tally<S, P>(
  State(state): State<AppState<S, P>>,
) -> Json<HotnessTally>
where
  S: CatalogSource + 'static,
  P: SnapshotStore + 'static,
{
  Json(state.tally_or_empty().await)
}
