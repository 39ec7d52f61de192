use sqlx::FromRow;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Persistence errors. `NotFound` is a distinct kind so callers can
/// recover locally where an absent record is an expected outcome
/// (duplicate-source checks, deletes of vanished rows).
#[derive(Debug, Error)]
pub enum StorageError {
    /// Lookup by id or url matched no record.
    #[error("{0}")]
    NotFound(String),

    /// Generic database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A subscribed feed endpoint.
#[derive(Debug, Clone, FromRow)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub url: String,
}

/// One item retrieved from a feed.
///
/// Transient instances are produced fresh on every fetch with `id == 0`;
/// a persisted bookmark copy carries the store-assigned id. Two entries are
/// the same story iff their urls are equal.
///
/// `bookmarked` is a display decoration maintained by the view layer, never
/// persisted.
#[derive(Debug, Clone, FromRow)]
pub struct NewsEntry {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub url: String,
    pub summary: String,
    pub published_at: Option<i64>,
    #[sqlx(skip)]
    pub bookmarked: bool,
}

impl NewsEntry {
    /// Story identity: URL equality.
    pub fn same_story(&self, other: &NewsEntry) -> bool {
        self.url == other.url
    }
}
