use super::schema::Database;
use super::types::{DatabaseError, StateEntry};

impl Database {
    // ========================================================================
    // Key/Value Operations
    // ========================================================================

    /// Read one value.
    ///
    /// Keys use a dotted convention for UI state (`ui.theme`,
    /// `ui.category`); the session identity lives under `techflow_user_id`.
    pub async fn get_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM local_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Insert or replace a value, bumping `updated_at`.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO local_state (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a key. Returns whether a row was removed.
    pub async fn remove_value(&self, key: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM local_state WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All entries whose key starts with `prefix`, ordered by key.
    ///
    /// `%` and `_` in the prefix are matched literally.
    pub async fn values_by_prefix(&self, prefix: &str) -> Result<Vec<StateEntry>, DatabaseError> {
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("{}%", escaped);
        let rows: Vec<StateEntry> = sqlx::query_as(
            "SELECT key, value, updated_at FROM local_state WHERE key LIKE ? ESCAPE '\\' ORDER BY key",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::Database;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn missing_key_reads_none() {
        let db = test_db().await;
        assert_eq!(db.get_value("ui.theme").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get() {
        let db = test_db().await;
        db.set_value("ui.theme", "dark").await.unwrap();
        assert_eq!(db.get_value("ui.theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn set_upserts() {
        let db = test_db().await;
        db.set_value("ui.category", "Design").await.unwrap();
        db.set_value("ui.category", "Science").await.unwrap();
        assert_eq!(
            db.get_value("ui.category").await.unwrap().as_deref(),
            Some("Science")
        );
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let db = test_db().await;
        db.set_value("techflow_user_id", "user_abc").await.unwrap();
        assert!(db.remove_value("techflow_user_id").await.unwrap());
        assert!(!db.remove_value("techflow_user_id").await.unwrap());
        assert_eq!(db.get_value("techflow_user_id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn prefix_lookup_is_ordered_and_literal() {
        let db = test_db().await;
        db.set_value("ui.theme", "light").await.unwrap();
        db.set_value("ui.category", "Design").await.unwrap();
        db.set_value("uix", "nope").await.unwrap();
        db.set_value("techflow_user_id", "user_abc").await.unwrap();

        let entries = db.values_by_prefix("ui.").await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["ui.category", "ui.theme"]);

        // `_` must not act as a single-character wildcard.
        let entries = db.values_by_prefix("techflow_").await.unwrap();
        assert_eq!(entries.len(), 1);
        db.set_value("techflowXuser", "x").await.unwrap();
        assert_eq!(db.values_by_prefix("techflow_").await.unwrap().len(), 1);
    }
}
