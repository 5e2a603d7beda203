//! Best-effort visitor identification for vote deduplication.
//!
//! The resolved identifier is a heuristic, not a security boundary: it does
//! not guarantee uniqueness per human or device, and it is not intended to
//! resist deliberate evasion. Clearing session state, rotating IPs, or
//! switching browsers all yield new identifiers. The vote deduplication
//! built on top of it provides casual throttling only, never an integrity
//! guarantee.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

// ─── Request hints ───────────────────────────────────────────────────────────

/// The request facts an [`IdentityResolver`] may draw on, extracted from
/// transport headers by the API layer.
#[derive(Debug, Clone, Default)]
pub struct VisitorHints {
  /// Raw forwarded-address header value from a trusted reverse proxy, e.g.
  /// `"203.0.113.9, 10.0.0.2"`.
  pub forwarded_for: Option<String>,
  /// Opaque per-session token minted by the client.
  pub session_token: Option<String>,
  pub user_agent:    Option<String>,
}

// ─── Resolver trait ──────────────────────────────────────────────────────────

/// Derives a visitor identifier that is stable for the duration of one
/// browser session. One implementation per deployment context.
pub trait IdentityResolver: Send + Sync {
  fn resolve(&self, hints: &VisitorHints) -> String;
}

// ─── Derived fallback ────────────────────────────────────────────────────────

/// Hashes the session token together with a coarse time bucket (the current
/// hour), so the identifier is stable within a session/hour but is not a
/// durable cross-session identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivedResolver;

impl DerivedResolver {
  pub fn resolve_at(&self, hints: &VisitorHints, now: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(hints.session_token.as_deref().unwrap_or("anonymous"));
    hasher.update(b"|");
    hasher.update(hints.user_agent.as_deref().unwrap_or(""));
    hasher.update(b"|");
    hasher.update(now.format("%Y-%m-%d-%H").to_string());

    let digest = hasher.finalize();
    hex::encode(&digest[..8])
  }
}

impl IdentityResolver for DerivedResolver {
  fn resolve(&self, hints: &VisitorHints) -> String {
    self.resolve_at(hints, Utc::now())
  }
}

// ─── Trusted proxy ───────────────────────────────────────────────────────────

/// Prefers the forwarded-address header set by a trusted reverse proxy,
/// falling back to [`DerivedResolver`] when the header is absent or empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedProxyResolver {
  fallback: DerivedResolver,
}

impl TrustedProxyResolver {
  /// The first entry of a comma-separated forwarded list is the client.
  fn client_address(forwarded: &str) -> Option<&str> {
    forwarded
      .split(',')
      .map(str::trim)
      .find(|part| !part.is_empty())
  }
}

impl IdentityResolver for TrustedProxyResolver {
  fn resolve(&self, hints: &VisitorHints) -> String {
    if let Some(addr) = hints
      .forwarded_for
      .as_deref()
      .and_then(Self::client_address)
    {
      return addr.to_owned();
    }
    self.fallback.resolve(hints)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn hints(session: &str) -> VisitorHints {
    VisitorHints {
      session_token: Some(session.to_owned()),
      ..Default::default()
    }
  }

  #[test]
  fn derived_id_is_stable_within_an_hour() {
    let r = DerivedResolver;
    let t1 = Utc.with_ymd_and_hms(2025, 6, 1, 14, 5, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2025, 6, 1, 14, 55, 0).unwrap();

    assert_eq!(r.resolve_at(&hints("s1"), t1), r.resolve_at(&hints("s1"), t2));
  }

  #[test]
  fn derived_id_rotates_across_hours() {
    let r = DerivedResolver;
    let t1 = Utc.with_ymd_and_hms(2025, 6, 1, 14, 59, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2025, 6, 1, 15, 0, 0).unwrap();

    assert_ne!(r.resolve_at(&hints("s1"), t1), r.resolve_at(&hints("s1"), t2));
  }

  #[test]
  fn derived_id_differs_per_session_token() {
    let r = DerivedResolver;
    let t = Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap();

    assert_ne!(r.resolve_at(&hints("s1"), t), r.resolve_at(&hints("s2"), t));
  }

  #[test]
  fn proxy_resolver_takes_first_forwarded_entry() {
    let r = TrustedProxyResolver::default();
    let h = VisitorHints {
      forwarded_for: Some("203.0.113.9, 10.0.0.2".into()),
      ..Default::default()
    };

    assert_eq!(r.resolve(&h), "203.0.113.9");
  }

  #[test]
  fn proxy_resolver_falls_back_when_header_empty() {
    let r = TrustedProxyResolver::default();
    let h = VisitorHints {
      forwarded_for: Some("  ".into()),
      session_token: Some("s1".into()),
      ..Default::default()
    };

    // Falls through to the derived hash, which is hex.
    let id = r.resolve(&h);
    assert_eq!(id.len(), 16);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
  }
}
