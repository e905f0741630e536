use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::domain::UserId;

/// Cookie carrying the session credential on the HTTP surface.
pub const SESSION_COOKIE: &str = "session";

/// Claims recovered from a verified session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub subject: UserId,
    pub email: String,
}

/// A freshly issued credential together with its verified claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub credential: String,
    pub claims: SessionClaims,
}

/// Every authentication failure collapses to this one variant: callers
/// must not be able to tell a missing credential from an invalid, expired,
/// or revoked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthenticated,
}

/// Boundary to the external identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Exchange a short-lived proof-of-identity token for a session
    /// credential valid for `ttl`.
    fn create_session(&self, id_token: &str, ttl: Duration) -> Result<IssuedSession, AuthError>;

    /// Verify a session credential back to its claims. Verification is
    /// revocation-checked: a credential revoked after issuance fails even
    /// if its signature and expiry would otherwise pass.
    fn verify_session(&self, credential: &str) -> Result<SessionClaims, AuthError>;
}

/// Verify an optional bearer credential, mapping absence and invalidity to
/// the same failure.
pub fn verify_bearer<P: IdentityProvider + ?Sized>(
    provider: &P,
    credential: Option<&str>,
) -> Result<SessionClaims, AuthError> {
    match credential {
        Some(value) if !value.is_empty() => provider.verify_session(value),
        _ => Err(AuthError::Unauthenticated),
    }
}
