//! Integration tests for the local state store: session identity lifecycle
//! and persisted UI preferences.
//!
//! Each test creates its own in-memory SQLite database for isolation.

use pretty_assertions::assert_eq;
use techflow::app::{CATEGORY_PREF_KEY, THEME_PREF_KEY};
use techflow::session::{SessionIdentity, USER_ID_KEY};
use techflow::storage::Database;

async fn test_db() -> Database {
    Database::open(":memory:").await.unwrap()
}

// ============================================================================
// Session identity
// ============================================================================

#[tokio::test]
async fn test_identity_is_created_once_and_reused() {
    let db = test_db().await;

    let first = SessionIdentity::resolve(&db).await.unwrap();
    let second = SessionIdentity::resolve(&db).await.unwrap();
    assert_eq!(first, second);
    assert!(first.as_str().starts_with("user_"));

    let stored = db.get_value(USER_ID_KEY).await.unwrap();
    assert_eq!(stored.as_deref(), Some(first.as_str()));
}

#[tokio::test]
async fn test_reset_replaces_identity() {
    let db = test_db().await;
    let original = SessionIdentity::resolve(&db).await.unwrap();

    let reset = SessionIdentity::reset(&db).await.unwrap();
    assert_ne!(original, reset);
    assert_eq!(SessionIdentity::resolve(&db).await.unwrap(), reset);
}

#[tokio::test]
async fn test_clear_forgets_identity() {
    let db = test_db().await;
    let original = SessionIdentity::resolve(&db).await.unwrap();

    assert!(SessionIdentity::clear(&db).await.unwrap());
    assert!(!SessionIdentity::clear(&db).await.unwrap());

    let next = SessionIdentity::resolve(&db).await.unwrap();
    assert_ne!(original, next);
}

#[tokio::test]
async fn test_stored_identity_of_any_shape_is_reused() {
    let db = test_db().await;
    db.set_value(USER_ID_KEY, "user_Mixed_Case_Id").await.unwrap();

    let identity = SessionIdentity::resolve(&db).await.unwrap();
    assert_eq!(identity.as_str(), "user_Mixed_Case_Id");
    assert_eq!(SessionIdentity::resolve(&db).await.unwrap(), identity);
}

#[tokio::test]
async fn test_blank_stored_identity_is_replaced() {
    let db = test_db().await;
    db.set_value(USER_ID_KEY, "").await.unwrap();

    let identity = SessionIdentity::resolve(&db).await.unwrap();
    assert!(SessionIdentity::parse(identity.as_str()).is_some());
    assert_eq!(
        db.get_value(USER_ID_KEY).await.unwrap().as_deref(),
        Some(identity.as_str())
    );
}

// ============================================================================
// Preferences
// ============================================================================

#[tokio::test]
async fn test_preferences_round_trip_and_list_by_prefix() {
    let db = test_db().await;
    db.set_value(THEME_PREF_KEY, "light").await.unwrap();
    db.set_value(CATEGORY_PREF_KEY, "Learning").await.unwrap();
    db.set_value(CATEGORY_PREF_KEY, "Design").await.unwrap();

    assert_eq!(
        db.get_value(CATEGORY_PREF_KEY).await.unwrap().as_deref(),
        Some("Design")
    );

    let prefs: Vec<(String, String)> = db
        .values_by_prefix("ui.")
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.key, e.value))
        .collect();
    assert_eq!(
        prefs,
        vec![
            ("ui.category".to_string(), "Design".to_string()),
            ("ui.theme".to_string(), "light".to_string()),
        ]
    );
}
