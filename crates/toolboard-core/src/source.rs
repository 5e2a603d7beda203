//! The `CatalogSource` and `SnapshotStore` traits, plus in-memory
//! implementations.
//!
//! `CatalogSource` is implemented by remote backends (e.g.
//! `toolboard-sheets`). Higher layers depend on this abstraction, not on any
//! concrete backend. All methods return `Send` futures so the traits can be
//! used in multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;
use std::sync::{
  Mutex,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use chrono::Utc;

use crate::{
  Error,
  tool::{RawToolRow, ToolRecord},
  vote::{NewVote, VoteRecord},
};

// ─── CatalogSource ───────────────────────────────────────────────────────────

/// Abstraction over the remote tool catalog and its vote log.
///
/// Reads return the full row set; there is no incremental sync or row-level
/// update tracking. Vote appends bypass every cache and land directly in the
/// remote log.
pub trait CatalogSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch all catalog rows, uncleaned.
  fn fetch_tools(
    &self,
  ) -> impl Future<Output = Result<Vec<RawToolRow>, Self::Error>> + Send + '_;

  /// Fetch the full vote log.
  fn fetch_votes(
    &self,
  ) -> impl Future<Output = Result<Vec<VoteRecord>, Self::Error>> + Send + '_;

  /// Append a vote with the current timestamp and return the stored record.
  fn append_vote(
    &self,
    vote: NewVote,
  ) -> impl Future<Output = Result<VoteRecord, Self::Error>> + Send + '_;
}

/// Sharing one source between the catalog cache and the vote ledger.
impl<S: CatalogSource> CatalogSource for std::sync::Arc<S> {
  type Error = S::Error;

  async fn fetch_tools(&self) -> Result<Vec<RawToolRow>, Self::Error> {
    (**self).fetch_tools().await
  }

  async fn fetch_votes(&self) -> Result<Vec<VoteRecord>, Self::Error> {
    (**self).fetch_votes().await
  }

  async fn append_vote(&self, vote: NewVote) -> Result<VoteRecord, Self::Error> {
    (**self).append_vote(vote).await
  }
}

// ─── SnapshotStore ───────────────────────────────────────────────────────────

/// Persistence for the last successfully cleaned catalog, used only as a
/// fallback when the remote source is unreachable. Saves overwrite; snapshots
/// are never merged.
pub trait SnapshotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the last snapshot, or `None` when none has been written yet.
  fn load(&self) -> Result<Option<Vec<ToolRecord>>, Self::Error>;

  /// Overwrite the snapshot with `records`.
  fn save(&self, records: &[ToolRecord]) -> Result<(), Self::Error>;
}

// ─── In-memory implementations ───────────────────────────────────────────────

/// An in-memory [`CatalogSource`] — useful for testing.
///
/// Remote calls can be counted and made to fail on demand, which is how the
/// cache-idempotence and degraded-fetch properties are exercised.
#[derive(Default)]
pub struct StaticSource {
  tools:        Mutex<Vec<RawToolRow>>,
  votes:        Mutex<Vec<VoteRecord>>,
  unavailable:  AtomicBool,
  tool_fetches: AtomicUsize,
  vote_fetches: AtomicUsize,
}

impl StaticSource {
  pub fn new(tools: Vec<RawToolRow>) -> Self {
    Self {
      tools: Mutex::new(tools),
      ..Default::default()
    }
  }

  /// Make every subsequent remote call fail (or succeed again).
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }

  /// How many times `fetch_tools` has hit the "remote".
  pub fn tool_fetches(&self) -> usize {
    self.tool_fetches.load(Ordering::SeqCst)
  }

  /// How many times `fetch_votes` has hit the "remote".
  pub fn vote_fetches(&self) -> usize {
    self.vote_fetches.load(Ordering::SeqCst)
  }

  fn check_available(&self) -> Result<(), Error> {
    if self.unavailable.load(Ordering::SeqCst) {
      Err(Error::SourceUnavailable("static source marked down".into()))
    } else {
      Ok(())
    }
  }
}

impl CatalogSource for StaticSource {
  type Error = Error;

  async fn fetch_tools(&self) -> Result<Vec<RawToolRow>, Error> {
    self.tool_fetches.fetch_add(1, Ordering::SeqCst);
    self.check_available()?;
    Ok(self.tools.lock().unwrap().clone())
  }

  async fn fetch_votes(&self) -> Result<Vec<VoteRecord>, Error> {
    self.vote_fetches.fetch_add(1, Ordering::SeqCst);
    self.check_available()?;
    Ok(self.votes.lock().unwrap().clone())
  }

  async fn append_vote(&self, vote: NewVote) -> Result<VoteRecord, Error> {
    self.check_available()?;
    let record = VoteRecord {
      tool_title: vote.tool_title,
      visitor_id: vote.visitor_id,
      timestamp:  Utc::now(),
      user_agent: vote.user_agent,
      session_id: vote.session_id,
    };
    self.votes.lock().unwrap().push(record.clone());
    Ok(record)
  }
}

/// An in-memory [`SnapshotStore`] — useful for testing.
#[derive(Default)]
pub struct MemorySnapshot {
  records: Mutex<Option<Vec<ToolRecord>>>,
}

impl MemorySnapshot {
  pub fn new() -> Self {
    Self::default()
  }
}

impl SnapshotStore for MemorySnapshot {
  type Error = Error;

  fn load(&self) -> Result<Option<Vec<ToolRecord>>, Error> {
    Ok(self.records.lock().unwrap().clone())
  }

  fn save(&self, records: &[ToolRecord]) -> Result<(), Error> {
    *self.records.lock().unwrap() = Some(records.to_vec());
    Ok(())
  }
}
