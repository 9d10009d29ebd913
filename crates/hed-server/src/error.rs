//! Error types for the HTTP server.

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use hed_posts::PostError;
use serde_json::json;

use crate::uploads::UploadError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Post store error.
    #[error(transparent)]
    Posts(#[from] PostError),

    /// Upload rejected or failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Request is malformed.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or wrong credentials.
    #[error("Authentication required")]
    Unauthorized {
        /// Realm for the `WWW-Authenticate` challenge.
        realm: String,
    },

    /// Authorization header could not be decoded.
    #[error("Invalid credentials format")]
    MalformedCredentials,

    /// Unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Posts(PostError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Post not found", "id": id}),
            ),
            Self::Posts(PostError::Validation(message)) | Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, json!({"error": message}))
            }
            Self::Upload(e) => (upload_status(e), json!({"error": e.to_string()})),
            Self::Unauthorized { realm } => {
                return unauthorized(realm);
            }
            Self::MalformedCredentials => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid credentials format"}),
            ),
            Self::Posts(e) => {
                tracing::error!(error = %e, "Post store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": e.to_string()}),
                )
            }
            Self::Internal(message) => {
                tracing::error!(error = %message, "Internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": message}),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

fn upload_status(error: &UploadError) -> StatusCode {
    match error {
        UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        UploadError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        UploadError::Empty => StatusCode::BAD_REQUEST,
        UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 401 response with a Basic challenge for `realm`.
pub(crate) fn unauthorized(realm: &str) -> Response {
    let challenge = HeaderValue::from_str(&format!("Basic realm=\"{realm}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("Basic"));

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, challenge)],
        axum::Json(json!({"error": "Authentication required"})),
    )
        .into_response()
}
