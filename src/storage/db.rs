use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use super::types::{NewsEntry, Source, StorageError};

/// Shared SQLite handle, opened once at startup and cloned into workers.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a database connection and run migrations.
    pub async fn open(path: &str) -> Result<Self, StorageError> {
        let url = format!("sqlite:{}?mode=rwc", path);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS source (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                url TEXT UNIQUE NOT NULL,
                created_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS item (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                url TEXT NOT NULL,
                summary TEXT NOT NULL,
                published_at INTEGER
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ========================================================================
    // Source Operations
    // ========================================================================

    /// All sources, oldest subscription first.
    pub async fn get_sources(&self) -> Result<Vec<Source>, StorageError> {
        let sources = sqlx::query_as::<_, Source>(
            "SELECT id, name, url FROM source ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sources)
    }

    pub async fn get_source_by_id(&self, id: i64) -> Result<Source, StorageError> {
        sqlx::query_as::<_, Source>("SELECT id, name, url FROM source WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("Site not found for id: {}", id)))
    }

    /// Used for duplicate checks before adding a source: `NotFound` is the
    /// expected answer for a new url.
    pub async fn get_source_by_url(&self, url: &str) -> Result<Source, StorageError> {
        sqlx::query_as::<_, Source>("SELECT id, name, url FROM source WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("Site not found for url: {}", url)))
    }

    pub async fn add_source(&self, name: &str, url: &str) -> Result<i64, StorageError> {
        let now = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT OR REPLACE INTO source (name, url, created_at)
            VALUES (?, ?, ?)
        "#,
        )
        .bind(name)
        .bind(url)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn delete_source(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM source WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!(
                "Site not found for id: {}",
                id
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Bookmark Operations
    // ========================================================================

    /// All bookmarked items, in bookmarking order.
    pub async fn get_bookmarks(&self) -> Result<Vec<NewsEntry>, StorageError> {
        let mut entries = sqlx::query_as::<_, NewsEntry>(
            r#"
            SELECT id, title, author, url, summary, published_at
            FROM item
            ORDER BY id ASC
        "#,
        )
        .fetch_all(&self.pool)
        .await?;
        for entry in &mut entries {
            entry.bookmarked = true;
        }
        Ok(entries)
    }

    /// Persists a transient entry as a bookmark, returning the assigned id.
    pub async fn add_bookmark(&self, entry: &NewsEntry) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO item (title, author, url, summary, published_at)
            VALUES (?, ?, ?, ?, ?)
        "#,
        )
        .bind(&entry.title)
        .bind(&entry.author)
        .bind(&entry.url)
        .bind(&entry.summary)
        .bind(entry.published_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn delete_bookmark(&self, id: i64) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM item WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!(
                "Event not found for id: {}",
                id
            )));
        }
        Ok(())
    }
}
