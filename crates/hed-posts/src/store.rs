//! SQLite-backed post store.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::{LegacyPost, NewPost, Post, PostError, PostUpdate};

const CREATE_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        images TEXT NOT NULL DEFAULT '[]',
        created_at INTEGER NOT NULL,
        updated_at INTEGER
    )
";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS posts_created_at ON posts (created_at DESC, id DESC)";

const COLUMNS: &str = "id, title, body, images, created_at, updated_at";

/// Raw `posts` row. Images are a JSON array, timestamps epoch milliseconds.
#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    body: String,
    images: String,
    created_at: i64,
    updated_at: Option<i64>,
}

impl PostRow {
    fn into_post(self) -> Result<Post, PostError> {
        let id = self.id;
        let corrupt = |message: String| PostError::Corrupt { id, message };

        let images = serde_json::from_str(&self.images)
            .map_err(|e| corrupt(format!("images column: {e}")))?;
        let created_at = from_millis(self.created_at)
            .ok_or_else(|| corrupt(format!("created_at out of range: {}", self.created_at)))?;
        let updated_at = match self.updated_at {
            Some(ms) => Some(
                from_millis(ms).ok_or_else(|| corrupt(format!("updated_at out of range: {ms}")))?,
            ),
            None => None,
        };

        Ok(Post {
            id,
            title: self.title,
            body: self.body,
            images,
            created_at,
            updated_at,
        })
    }
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Post store over a SQLite connection pool.
///
/// Every write is a single statement and input is validated first, so a
/// failed call leaves the table untouched.
#[derive(Clone, Debug)]
pub struct PostStore {
    pool: SqlitePool,
}

impl PostStore {
    /// Open the database file at `path`, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Database` if the file cannot be opened.
    pub async fn connect(path: &Path) -> Result<Self, PostError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        tracing::debug!(path = %path.display(), "Opened post database");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since each
    /// SQLite memory connection is its own database.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Database` if the connection fails.
    pub async fn in_memory() -> Result<Self, PostError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self { pool })
    }

    /// Create the `posts` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Database` on failure.
    pub async fn migrate(&self) -> Result<(), PostError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert a new post.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Validation` for a blank title or body.
    pub async fn create(&self, post: NewPost) -> Result<Post, PostError> {
        post.validate()?;
        self.insert(post, Utc::now()).await
    }

    /// Fetch a post by id.
    ///
    /// # Errors
    ///
    /// Returns `PostError::NotFound` if no post has this id.
    pub async fn get(&self, id: i64) -> Result<Post, PostError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {COLUMNS} FROM posts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(PostError::NotFound(id))?;

        row.into_post()
    }

    /// All posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Database` or `PostError::Corrupt` on failure.
    pub async fn list(&self) -> Result<Vec<Post>, PostError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PostRow::into_post).collect()
    }

    /// Apply a partial update and stamp `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Validation` for a blank title and
    /// `PostError::NotFound` if no post has this id.
    pub async fn update(&self, id: i64, update: PostUpdate) -> Result<Post, PostError> {
        update.validate()?;
        let images = update
            .images
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts
             SET title = COALESCE(?, title),
                 body = COALESCE(?, body),
                 images = COALESCE(?, images),
                 updated_at = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        ))
        .bind(update.title)
        .bind(update.body)
        .bind(images)
        .bind(Utc::now().timestamp_millis())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(PostError::NotFound(id))?;

        tracing::debug!(id, "Updated post");
        row.into_post()
    }

    /// Delete a post.
    ///
    /// # Errors
    ///
    /// Returns `PostError::NotFound` if no post has this id.
    pub async fn delete(&self, id: i64) -> Result<(), PostError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PostError::NotFound(id));
        }
        tracing::debug!(id, "Deleted post");
        Ok(())
    }

    /// Normalize a legacy record and insert it, keeping its creation time.
    ///
    /// The store assigns a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `PostError::Validation` if the record has a blank title or
    /// body, or an unreadable timestamp.
    pub async fn import_legacy(&self, legacy: &LegacyPost) -> Result<Post, PostError> {
        let created_at = legacy.created_at(Utc::now())?;
        let post = legacy.to_new_post();
        post.validate()?;
        self.insert(post, created_at).await
    }

    async fn insert(&self, post: NewPost, created_at: DateTime<Utc>) -> Result<Post, PostError> {
        let images = serde_json::to_string(&post.images)?;

        let row = sqlx::query_as::<_, PostRow>(&format!(
            "INSERT INTO posts (title, body, images, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING {COLUMNS}"
        ))
        .bind(post.title)
        .bind(post.body)
        .bind(images)
        .bind(created_at.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = row.id, "Created post");
        row.into_post()
    }
}
