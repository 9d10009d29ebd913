/// Post storage error.
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    /// No post with this id.
    #[error("Post not found: {0}")]
    NotFound(i64),
    /// Input rejected before any write.
    #[error("Invalid post: {0}")]
    Validation(String),
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Stored row could not be decoded.
    #[error("Corrupt post {id}: {message}")]
    Corrupt {
        /// Row id.
        id: i64,
        /// What failed to decode.
        message: String,
    },
    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
