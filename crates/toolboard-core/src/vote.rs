//! Vote records and the derived hotness tally.
//!
//! Votes are append-only; nothing in the system updates or deletes them.
//! The tally is recomputed from the full vote set and never stored.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── VoteRecord ──────────────────────────────────────────────────────────────

/// One "hotness" click, as stored in the remote vote log.
///
/// At most one record should exist per (tool title, visitor id) pair. The
/// pair is enforced by a check-then-append in [`crate::ledger::VoteLedger`],
/// which leaves a race window — an occasional duplicate row is tolerated and
/// only inflates the tally by one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRecord {
  pub tool_title: String,
  pub visitor_id: String,
  pub timestamp:  DateTime<Utc>,
  pub user_agent: Option<String>,
  pub session_id: Option<String>,
}

/// Input to [`crate::source::CatalogSource::append_vote`].
/// The timestamp is assigned at append time; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewVote {
  pub tool_title: String,
  pub visitor_id: String,
  pub user_agent: Option<String>,
  pub session_id: Option<String>,
}

impl NewVote {
  pub fn new(tool_title: impl Into<String>, visitor_id: impl Into<String>) -> Self {
    Self {
      tool_title: tool_title.into(),
      visitor_id: visitor_id.into(),
      user_agent: None,
      session_id: None,
    }
  }
}

// ─── HotnessTally ────────────────────────────────────────────────────────────

/// Per-tool vote counts, derived from the full vote set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotnessTally(pub HashMap<String, u64>);

impl HotnessTally {
  /// Recompute counts by scanning `votes`.
  pub fn from_votes(votes: &[VoteRecord]) -> Self {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for vote in votes {
      *counts.entry(vote.tool_title.clone()).or_default() += 1;
    }
    Self(counts)
  }

  /// The count for `title`; zero when the tool has never been voted for.
  pub fn count_for(&self, title: &str) -> u64 {
    self.0.get(title).copied().unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn vote(tool: &str, visitor: &str) -> VoteRecord {
    VoteRecord {
      tool_title: tool.to_owned(),
      visitor_id: visitor.to_owned(),
      timestamp:  Utc::now(),
      user_agent: None,
      session_id: None,
    }
  }

  #[test]
  fn tally_counts_per_tool() {
    let votes = vec![vote("A", "v1"), vote("A", "v2"), vote("B", "v1")];
    let tally = HotnessTally::from_votes(&votes);

    assert_eq!(tally.count_for("A"), 2);
    assert_eq!(tally.count_for("B"), 1);
    assert_eq!(tally.count_for("C"), 0);
  }

  #[test]
  fn empty_vote_set_yields_empty_tally() {
    assert!(HotnessTally::from_votes(&[]).is_empty());
  }
}
