//! Service-account credential resolution.
//!
//! Credentials are looked up in priority order: the platform secret file,
//! then the configured local file, then an environment variable holding the
//! JSON inline. A miss on all three is a blocking setup error — the server
//! refuses to start without spreadsheet access.

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Environment variable naming a mounted secret file (hosting platforms
/// expose secrets this way).
pub const CREDENTIALS_FILE_ENV: &str = "TOOLBOARD_CREDENTIALS_FILE";
/// Environment variable holding the credential JSON inline.
pub const CREDENTIALS_JSON_ENV: &str = "TOOLBOARD_CREDENTIALS_JSON";

/// API scopes the credential must grant: spreadsheet read/write and
/// file-storage access.
pub const REQUIRED_SCOPES: &[&str] = &[
  "https://www.googleapis.com/auth/spreadsheets",
  "https://www.googleapis.com/auth/drive",
];

/// A service-account-style credential for the sheet service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceCredentials {
  pub client_email: String,
  /// Bearer token presented on every request.
  pub token:        String,
  #[serde(default)]
  pub scopes:       Vec<String>,
}

impl ServiceCredentials {
  fn from_json(json: &str, origin: &str) -> Result<Self> {
    let creds: Self = serde_json::from_str(json)
      .map_err(|e| Error::Credentials(format!("invalid credential JSON from {origin}: {e}")))?;
    if creds.token.trim().is_empty() {
      return Err(Error::Credentials(format!(
        "credential from {origin} has an empty token"
      )));
    }
    Ok(creds)
  }

  fn from_file(path: &Path) -> Result<Self> {
    let json = std::fs::read_to_string(path).map_err(|e| {
      Error::Credentials(format!("cannot read credential file {}: {e}", path.display()))
    })?;
    Self::from_json(&json, &path.display().to_string())
  }

  /// Resolve credentials in priority order; see the module docs.
  pub fn resolve(local_path: &Path) -> Result<Self> {
    if let Ok(secret_path) = std::env::var(CREDENTIALS_FILE_ENV) {
      return Self::from_file(Path::new(&secret_path));
    }

    if local_path.exists() {
      return Self::from_file(local_path);
    }

    if let Ok(json) = std::env::var(CREDENTIALS_JSON_ENV) {
      return Self::from_json(&json, CREDENTIALS_JSON_ENV);
    }

    Err(Error::Credentials(format!(
      "sheet service setup required. Provide credentials one of three ways: \
       (1) point {CREDENTIALS_FILE_ENV} at a mounted secret file; \
       (2) place a credential file at {}; \
       (3) set {CREDENTIALS_JSON_ENV} to the credential JSON inline. \
       The credential must grant scopes: {}",
      local_path.display(),
      REQUIRED_SCOPES.join(", "),
    )))
  }
}
