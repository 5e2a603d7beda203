//! Handler for `POST /api/signup`.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use toolboard_core::source::{CatalogSource, SnapshotStore};
use toolboard_sheets::SignupOutcome;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub name:     String,
  pub email:    String,
  pub linkedin: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
  pub registered: bool,
  pub message:    String,
}

/// `POST /api/signup` — a duplicate email is an expected user action and
/// comes back as `registered: false` with a plain message.
pub async fn register<S, P>(
  State(state): State<AppState<S, P>>,
  Json(body): Json<SignupBody>,
) -> Result<Json<SignupResponse>, ApiError>
where
  S: CatalogSource + 'static,
  P: SnapshotStore + 'static,
{
  let name = body.name.trim();
  let email = body.email.trim();
  if name.is_empty() {
    return Err(ApiError::BadRequest("name is required".into()));
  }
  if email.is_empty() || !email.contains('@') {
    return Err(ApiError::BadRequest("a valid email is required".into()));
  }

  let outcome = state
    .signups
    .register(name, email, body.linkedin.as_deref())
    .map_err(|e| ApiError::Backend(Box::new(e)))?;

  let (registered, message) = match outcome {
    SignupOutcome::Registered => (true, "successfully registered for updates".to_owned()),
    SignupOutcome::DuplicateEmail => (false, "email already registered".to_owned()),
  };

  Ok(Json(SignupResponse {
    registered,
    message,
  }))
}
