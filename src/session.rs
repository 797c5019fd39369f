//! Per-installation user identity.
//!
//! The identity scopes bookmarks and chat history on the server. It is
//! created on first launch, persisted in the local state store and never
//! rotated automatically; `techflow --reset-session` replaces it. The value
//! is resolved once at startup and passed explicitly to every call that
//! needs it.

use crate::storage::{Database, DatabaseError};
use rand::Rng;
use std::fmt;
use thiserror::Error;

/// Local state key holding the identity.
pub const USER_ID_KEY: &str = "techflow_user_id";

const PREFIX: &str = "user_";
const RANDOM_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Could not access the session store: {0}")]
    Store(#[from] DatabaseError),
}

/// Opaque user identifier of the form `user_<9 base36>_<base36 millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionIdentity(String);

impl SessionIdentity {
    /// Fresh identity from the thread RNG and the wall clock.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Self::generate_with(&mut rand::thread_rng(), millis)
    }

    /// Deterministic variant of [`generate`](Self::generate).
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, unix_millis: u64) -> Self {
        let random: String = (0..RANDOM_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("{PREFIX}{random}_{}", to_base36(unix_millis)))
    }

    /// Wrap a stored value, rejecting anything that does not look like an
    /// identity this client would have produced.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let rest = raw.strip_prefix(PREFIX)?;
        let valid = !rest.is_empty()
            && rest
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        valid.then(|| Self(raw.to_string()))
    }

    /// Wrap a value read back from the local state store. Any non-empty
    /// value is kept, including ones this client would not generate, so a
    /// stored identity is never replaced behind the user's back.
    pub fn from_stored(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (!raw.is_empty()).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Load the stored identity, creating and persisting one if absent or
    /// blank.
    pub async fn resolve(db: &Database) -> Result<Self, SessionError> {
        if let Some(stored) = db.get_value(USER_ID_KEY).await? {
            if let Some(identity) = Self::from_stored(&stored) {
                if Self::parse(identity.as_str()).is_none() {
                    tracing::debug!(user_id = %identity, "Keeping stored identity of foreign shape");
                }
                return Ok(identity);
            }
            tracing::warn!("Stored session identity is blank; generating a new one");
        }
        let identity = Self::generate();
        db.set_value(USER_ID_KEY, identity.as_str()).await?;
        tracing::info!(user_id = %identity, "Created session identity");
        Ok(identity)
    }

    /// Replace the stored identity with a new one.
    pub async fn reset(db: &Database) -> Result<Self, SessionError> {
        let identity = Self::generate();
        db.set_value(USER_ID_KEY, identity.as_str()).await?;
        tracing::info!(user_id = %identity, "Session identity reset");
        Ok(identity)
    }

    /// Forget the stored identity; the next [`resolve`](Self::resolve)
    /// creates a new one.
    pub async fn clear(db: &Database) -> Result<bool, SessionError> {
        Ok(db.remove_value(USER_ID_KEY).await?)
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn generated_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = SessionIdentity::generate_with(&mut rng, 1_700_000_000_000);
        let s = id.as_str();
        assert!(s.starts_with("user_"));
        let parts: Vec<&str> = s.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 9);
        assert!(parts[1].chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
        assert_eq!(parts[2], "loyw3v28");
        assert_eq!(SessionIdentity::parse(s), Some(id.clone()));
    }

    #[test]
    fn parse_rejects_foreign_values() {
        assert_eq!(SessionIdentity::parse(""), None);
        assert_eq!(SessionIdentity::parse("user_"), None);
        assert_eq!(SessionIdentity::parse("admin"), None);
        assert_eq!(SessionIdentity::parse("user_AB CD"), None);
        assert!(SessionIdentity::parse("user_k3j4h5g6f").is_some());
    }

    #[tokio::test]
    async fn resolve_is_stable() {
        let db = Database::open(":memory:").await.unwrap();
        let first = SessionIdentity::resolve(&db).await.unwrap();
        let second = SessionIdentity::resolve(&db).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            db.get_value(USER_ID_KEY).await.unwrap().as_deref(),
            Some(first.as_str())
        );
    }

    #[tokio::test]
    async fn resolve_keeps_foreign_value() {
        let db = Database::open(":memory:").await.unwrap();
        db.set_value(USER_ID_KEY, "user_LegacyID42").await.unwrap();
        let id = SessionIdentity::resolve(&db).await.unwrap();
        assert_eq!(id.as_str(), "user_LegacyID42");
        assert_eq!(
            db.get_value(USER_ID_KEY).await.unwrap().as_deref(),
            Some("user_LegacyID42")
        );
    }

    #[tokio::test]
    async fn resolve_replaces_blank_value() {
        let db = Database::open(":memory:").await.unwrap();
        db.set_value(USER_ID_KEY, "   ").await.unwrap();
        let id = SessionIdentity::resolve(&db).await.unwrap();
        assert!(SessionIdentity::parse(id.as_str()).is_some());
    }

    #[test]
    fn from_stored_accepts_any_non_empty_value() {
        assert_eq!(SessionIdentity::from_stored(""), None);
        assert_eq!(SessionIdentity::from_stored("  "), None);
        assert_eq!(
            SessionIdentity::from_stored(" admin ").map(|id| id.to_string()),
            Some("admin".to_string())
        );
    }

    #[tokio::test]
    async fn reset_and_clear() {
        let db = Database::open(":memory:").await.unwrap();
        let first = SessionIdentity::resolve(&db).await.unwrap();
        let reset = SessionIdentity::reset(&db).await.unwrap();
        assert_ne!(first, reset);
        assert_eq!(SessionIdentity::resolve(&db).await.unwrap(), reset);

        assert!(SessionIdentity::clear(&db).await.unwrap());
        assert_eq!(db.get_value(USER_ID_KEY).await.unwrap(), None);
    }
}
