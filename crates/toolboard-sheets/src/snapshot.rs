//! On-disk CSV snapshot of the last successfully cleaned catalog.
//!
//! Used only as the unreachable-remote fallback. Every save overwrites the
//! whole file; snapshots are never merged.

use std::path::PathBuf;

use toolboard_core::{source::SnapshotStore, tool::ToolRecord};

use crate::{Error, Result};

/// CSV-file implementation of [`SnapshotStore`].
pub struct CsvSnapshot {
  path: PathBuf,
}

impl CsvSnapshot {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl SnapshotStore for CsvSnapshot {
  type Error = Error;

  fn load(&self) -> Result<Option<Vec<ToolRecord>>> {
    if !self.path.exists() {
      return Ok(None);
    }

    let mut reader = csv::Reader::from_path(&self.path)?;
    let records = reader
      .deserialize()
      .collect::<std::result::Result<Vec<ToolRecord>, _>>()?;
    Ok(Some(records))
  }

  fn save(&self, records: &[ToolRecord]) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(&self.path)?;
    for record in records {
      writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
  }
}
