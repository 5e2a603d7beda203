//! The vote ledger: deduplicated "hotness" votes over the remote vote log.
//!
//! Votes are a lightweight interest signal, not a billing-grade ledger. The
//! check-then-append write is not atomic: two concurrent votes from the same
//! visitor inside the cache window can both pass the check and land twice.
//! That race is accepted; the short caches exist to stay inside remote API
//! rate limits, not for correctness.

use std::time::Duration;

use crate::{
  cache::TtlCell,
  source::CatalogSource,
  vote::{HotnessTally, NewVote, VoteRecord},
};

/// Default TTL for the cached vote set backing `has_voted`.
pub const VOTE_STATUS_TTL: Duration = Duration::from_secs(60);
/// Default TTL for the cached tally.
pub const TALLY_TTL: Duration = Duration::from_secs(300);

// ─── VoteLedger ──────────────────────────────────────────────────────────────

/// Append-only vote log with per-visitor deduplication and a derived tally.
pub struct VoteLedger<S> {
  source: S,
  votes:  TtlCell<Vec<VoteRecord>>,
  tally:  TtlCell<HotnessTally>,
}

impl<S: CatalogSource> VoteLedger<S> {
  pub fn new(source: S, vote_status_ttl: Duration, tally_ttl: Duration) -> Self {
    Self {
      source,
      votes: TtlCell::new(vote_status_ttl),
      tally: TtlCell::new(tally_ttl),
    }
  }

  /// The full vote set, via the short-lived cache.
  async fn vote_set(&self) -> Result<Vec<VoteRecord>, S::Error> {
    if let Some(votes) = self.votes.get() {
      return Ok(votes);
    }
    let votes = self.source.fetch_votes().await?;
    self.votes.put(votes.clone());
    Ok(votes)
  }

  /// True iff a vote by `visitor_id` for `tool_title` exists in the log.
  ///
  /// Served from the cached vote set, so a vote appended elsewhere can take
  /// up to the vote-status TTL to become visible here.
  pub async fn has_voted(
    &self,
    tool_title: &str,
    visitor_id: &str,
  ) -> Result<bool, S::Error> {
    let votes = self.vote_set().await?;
    Ok(
      votes
        .iter()
        .any(|v| v.tool_title == tool_title && v.visitor_id == visitor_id),
    )
  }

  /// Append `vote` unless this visitor already voted for this tool.
  ///
  /// Returns `false` (writing nothing) on a duplicate — an expected user
  /// action, not a failure. A successful append invalidates both the
  /// vote-status and tally caches so subsequent reads see the new vote.
  pub async fn record_vote(&self, vote: NewVote) -> Result<bool, S::Error> {
    if self.has_voted(&vote.tool_title, &vote.visitor_id).await? {
      return Ok(false);
    }

    self.source.append_vote(vote).await?;
    self.votes.invalidate();
    self.tally.invalidate();
    Ok(true)
  }

  /// Per-tool vote counts, recomputed by scanning the full vote log and
  /// cached with the tally TTL.
  pub async fn get_tally(&self) -> Result<HotnessTally, S::Error> {
    if let Some(tally) = self.tally.get() {
      return Ok(tally);
    }
    let votes = self.source.fetch_votes().await?;
    let tally = HotnessTally::from_votes(&votes);
    self.tally.put(tally.clone());
    Ok(tally)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
