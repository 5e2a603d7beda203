//! The append-only email signup book.
//!
//! Signups live in a local CSV; duplicate emails are rejected by a linear
//! scan over the existing rows. A duplicate is an expected user action and
//! is reported as an outcome, never as an error.

use std::fs::OpenOptions;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Wire format for the `Signup_Date` column.
const SIGNUP_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// One row of the signup CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRecord {
  #[serde(rename = "Name")]
  pub name:        String,
  #[serde(rename = "Email")]
  pub email:       String,
  #[serde(rename = "LinkedIn")]
  pub linkedin:    String,
  #[serde(rename = "Signup_Date")]
  pub signup_date: String,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
  Registered,
  DuplicateEmail,
}

/// Append-only CSV of email signups.
pub struct SignupBook {
  path: PathBuf,
}

impl SignupBook {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// All existing signups; an absent file reads as empty.
  pub fn entries(&self) -> Result<Vec<SignupRecord>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(&self.path)?;
    let records = reader
      .deserialize()
      .collect::<std::result::Result<Vec<SignupRecord>, _>>()?;
    Ok(records)
  }

  /// Register `email`, rejecting duplicates by linear scan.
  pub fn register(
    &self,
    name: &str,
    email: &str,
    linkedin: Option<&str>,
  ) -> Result<SignupOutcome> {
    let email = email.trim();
    let existing = self.entries()?;
    if existing.iter().any(|r| r.email.trim() == email) {
      return Ok(SignupOutcome::DuplicateEmail);
    }

    let record = SignupRecord {
      name:        name.trim().to_owned(),
      email:       email.to_owned(),
      linkedin:    linkedin.unwrap_or("").trim().to_owned(),
      signup_date: Utc::now().format(SIGNUP_DATE_FORMAT).to_string(),
    };

    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    // Headers are written only when the file is first created.
    let is_new = !self.path.exists();
    let file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)?;
    let mut writer = csv::WriterBuilder::new()
      .has_headers(is_new)
      .from_writer(file);
    writer.serialize(&record)?;
    writer.flush()?;

    Ok(SignupOutcome::Registered)
  }
}
