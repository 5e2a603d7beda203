//! Time-boxed caching around catalog reads.
//!
//! Caches here exist to stay within remote API rate limits, not for
//! correctness. Cells are shared across sessions and populated
//! last-writer-wins; concurrent refreshes racing on a cell is accepted.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::{
  source::{CatalogSource, SnapshotStore},
  tool::{ToolRecord, clean_rows},
};

// ─── TtlCell ─────────────────────────────────────────────────────────────────

/// A single cached value with a time-to-live.
///
/// An explicit, passed-in cache object keyed by what it holds — not an
/// ambient global. `get` returns a clone while the value is younger than the
/// TTL; `put` restarts the clock.
pub struct TtlCell<T> {
  ttl:  Duration,
  slot: Mutex<Option<(Instant, T)>>,
}

impl<T: Clone> TtlCell<T> {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      slot: Mutex::new(None),
    }
  }

  /// The cached value, if one exists and has not expired.
  pub fn get(&self) -> Option<T> {
    let slot = self.slot.lock().unwrap();
    match slot.as_ref() {
      Some((stored_at, value)) if stored_at.elapsed() < self.ttl => {
        Some(value.clone())
      }
      _ => None,
    }
  }

  pub fn put(&self, value: T) {
    *self.slot.lock().unwrap() = Some((Instant::now(), value));
  }

  pub fn invalidate(&self) {
    *self.slot.lock().unwrap() = None;
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }
}

// ─── CatalogCache ────────────────────────────────────────────────────────────

/// Read-through cache over a [`CatalogSource`], with an on-disk snapshot as
/// the unreachable-remote fallback.
///
/// Failure is never fatal to the caller: fetch errors are logged and degrade
/// to the last snapshot, or to an empty catalog when none exists.
pub struct CatalogCache<S, P> {
  source:   S,
  snapshot: P,
  cell:     TtlCell<Vec<ToolRecord>>,
}

impl<S, P> CatalogCache<S, P>
where
  S: CatalogSource,
  P: SnapshotStore,
{
  pub fn new(source: S, snapshot: P, ttl: Duration) -> Self {
    Self {
      source,
      snapshot,
      cell: TtlCell::new(ttl),
    }
  }

  /// Return the cleaned catalog.
  ///
  /// A non-expired cached result is returned without contacting the remote
  /// unless `force_refresh` is set. Every successful fresh fetch overwrites
  /// the snapshot.
  pub async fn get_catalog(&self, force_refresh: bool) -> Vec<ToolRecord> {
    if !force_refresh {
      if let Some(cached) = self.cell.get() {
        return cached;
      }
    }

    match self.source.fetch_tools().await {
      Ok(rows) => {
        let cleaned = clean_rows(rows, Utc::now());
        if let Err(e) = self.snapshot.save(&cleaned) {
          tracing::warn!(error = %e, "failed to write catalog snapshot");
        }
        self.cell.put(cleaned.clone());
        cleaned
      }
      Err(e) => {
        tracing::warn!(error = %e, "catalog fetch failed, falling back to snapshot");
        match self.snapshot.load() {
          Ok(Some(records)) => records,
          Ok(None) => Vec::new(),
          Err(e) => {
            tracing::warn!(error = %e, "snapshot load failed, serving empty catalog");
            Vec::new()
          }
        }
      }
    }
  }

  /// Drop the cached catalog; the next read fetches fresh.
  pub fn invalidate(&self) {
    self.cell.invalidate();
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
