//! Async HTTP client for the remote sheet service.
//!
//! The catalog spreadsheet is addressed by URL; its first worksheet holds
//! the tool rows and a second worksheet named `Hotness` holds the vote log,
//! created with headers on first use. All calls are synchronous
//! request/response with the client's default timeout; a slow remote blocks
//! only the calling session.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use serde_json::{Value, json};

use toolboard_core::{
  source::CatalogSource,
  tool::{RawToolRow, parse_date_added},
  vote::{NewVote, VoteRecord},
};

use crate::{Error, Result, credentials::ServiceCredentials};

// ─── Worksheet layout ────────────────────────────────────────────────────────

/// The tool rows live in the first worksheet, addressed by position.
const TOOLS_WORKSHEET: &str = "1";
/// The vote log worksheet, auto-created when absent.
const VOTES_WORKSHEET: &str = "Hotness";

/// Vote log header row, in column order.
const VOTE_COLUMNS: &[&str] =
  &["Tool_Title", "IP_Address", "Timestamp", "User_Agent", "Session_ID"];

/// Wire format for vote timestamps.
const VOTE_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// A worksheet row as returned by the service: column header → cell value.
type Row = HashMap<String, Value>;

// ─── Cell helpers ────────────────────────────────────────────────────────────

/// A cell as a string; numeric cells are stringified, everything else is
/// treated as empty.
fn cell_string(row: &Row, column: &str) -> Option<String> {
  match row.get(column)? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn cell_opt(row: &Row, column: &str) -> Option<String> {
  cell_string(row, column).filter(|s| !s.trim().is_empty())
}

/// Map a raw worksheet row onto the expected catalog columns.
pub(crate) fn tool_row_from_cells(row: &Row) -> RawToolRow {
  RawToolRow {
    title:             cell_string(row, "Title"),
    summary:           cell_string(row, "Summary"),
    source_url:        cell_string(row, "Source_URL"),
    author:            cell_string(row, "Author/Company"),
    domain:            cell_string(row, "Domain"),
    integration_steps: cell_string(row, "Integration_Steps"),
    date_added:        cell_string(row, "Date_Added"),
  }
}

/// Map a `Hotness` worksheet row onto a [`VoteRecord`]. An unparseable
/// timestamp is repaired with the current time rather than rejected.
pub(crate) fn vote_from_cells(row: &Row) -> VoteRecord {
  let timestamp = cell_string(row, "Timestamp")
    .as_deref()
    .and_then(parse_date_added)
    .unwrap_or_else(Utc::now);

  VoteRecord {
    tool_title: cell_string(row, "Tool_Title").unwrap_or_default(),
    visitor_id: cell_string(row, "IP_Address").unwrap_or_default(),
    timestamp,
    user_agent: cell_opt(row, "User_Agent"),
    session_id: cell_opt(row, "Session_ID"),
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async HTTP client for one catalog spreadsheet.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SheetsClient {
  client:      reqwest::Client,
  base_url:    String,
  credentials: ServiceCredentials,
}

impl SheetsClient {
  pub fn new(catalog_url: &str, credentials: ServiceCredentials) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;

    Ok(Self {
      client,
      base_url: catalog_url.trim_end_matches('/').to_owned(),
      credentials,
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{path}", self.base_url)
  }

  fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    req.bearer_auth(&self.credentials.token)
  }

  async fn api_error(resp: reqwest::Response) -> Error {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    Error::Api { status, message }
  }

  /// `GET /worksheets/{name}/rows` — `None` when the worksheet is absent.
  async fn fetch_rows(&self, worksheet: &str) -> Result<Option<Vec<Row>>> {
    let resp = self
      .authed(self.client.get(self.url(&format!("/worksheets/{worksheet}/rows"))))
      .send()
      .await?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(Self::api_error(resp).await);
    }
    Ok(Some(resp.json().await?))
  }

  /// `POST /worksheets` — create a worksheet with a header row.
  async fn create_worksheet(&self, title: &str, headers: &[&str]) -> Result<()> {
    let resp = self
      .authed(self.client.post(self.url("/worksheets")))
      .json(&json!({ "title": title, "headers": headers }))
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Self::api_error(resp).await);
    }
    Ok(())
  }

  /// `POST /worksheets/{name}/rows` — append one row.
  async fn append_row(&self, worksheet: &str, row: &Value) -> Result<reqwest::StatusCode> {
    let resp = self
      .authed(self.client.post(self.url(&format!("/worksheets/{worksheet}/rows"))))
      .json(row)
      .send()
      .await?;

    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
      return Ok(status);
    }
    if !status.is_success() {
      return Err(Self::api_error(resp).await);
    }
    Ok(status)
  }

  fn vote_row(vote: &VoteRecord) -> Value {
    json!({
      "Tool_Title": vote.tool_title,
      "IP_Address": vote.visitor_id,
      "Timestamp":  vote.timestamp.format(VOTE_TIMESTAMP_FORMAT).to_string(),
      "User_Agent": vote.user_agent.as_deref().unwrap_or(""),
      "Session_ID": vote.session_id.as_deref().unwrap_or(""),
    })
  }
}

// ─── CatalogSource impl ──────────────────────────────────────────────────────

impl CatalogSource for SheetsClient {
  type Error = Error;

  async fn fetch_tools(&self) -> Result<Vec<RawToolRow>> {
    // A missing tools worksheet is served as an empty catalog rather than an
    // error; the cache layer handles the degraded case uniformly.
    let rows = self.fetch_rows(TOOLS_WORKSHEET).await?.unwrap_or_default();
    Ok(rows.iter().map(tool_row_from_cells).collect())
  }

  async fn fetch_votes(&self) -> Result<Vec<VoteRecord>> {
    match self.fetch_rows(VOTES_WORKSHEET).await? {
      Some(rows) => Ok(rows.iter().map(vote_from_cells).collect()),
      None => {
        tracing::info!("creating missing {VOTES_WORKSHEET} worksheet");
        self.create_worksheet(VOTES_WORKSHEET, VOTE_COLUMNS).await?;
        Ok(Vec::new())
      }
    }
  }

  async fn append_vote(&self, vote: NewVote) -> Result<VoteRecord> {
    let record = VoteRecord {
      tool_title: vote.tool_title,
      visitor_id: vote.visitor_id,
      timestamp:  Utc::now(),
      user_agent: vote.user_agent,
      session_id: vote.session_id,
    };

    let row = Self::vote_row(&record);
    if self.append_row(VOTES_WORKSHEET, &row).await? == reqwest::StatusCode::NOT_FOUND {
      // First vote ever: the worksheet does not exist yet.
      self.create_worksheet(VOTES_WORKSHEET, VOTE_COLUMNS).await?;
      if self.append_row(VOTES_WORKSHEET, &row).await? == reqwest::StatusCode::NOT_FOUND {
        return Err(Error::Api {
          status:  404,
          message: format!("{VOTES_WORKSHEET} worksheet vanished after creation"),
        });
      }
    }
    Ok(record)
  }
}
