//! Image upload endpoint.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Serialize)]
pub(crate) struct UploadResponse {
    url: String,
}

/// Handle POST /api/upload.
///
/// The body is the raw image; its type comes from `Content-Type`.
pub(crate) async fn upload_image(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, ServerError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let host = Arc::clone(&state.images);
    let url = tokio::task::spawn_blocking(move || host.upload(&body, &content_type))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .inspect_err(|e| tracing::warn!(error = %e, "Rejected upload"))?;

    Ok(Json(UploadResponse { url }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;

    use crate::testing::{TestApp, UPLOAD_LIMIT, read_body, read_json};

    fn upload_request(content_type: &str, body: Vec<u8>) -> Request<Body> {
        Request::post("/api/upload")
            .header(header::AUTHORIZATION, TestApp::auth())
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_and_serve() {
        let app = TestApp::new().await;

        let response = app.send(upload_request("image/png", b"fake png".to_vec())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let url = read_json(response).await["url"].as_str().unwrap().to_owned();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let name = url.trim_start_matches("/uploads/");
        assert!(app.uploads.path().join(name).exists());

        let response = app.get(&url, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_body(response).await, b"fake png");
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let app = TestApp::new().await;

        let response = app
            .send(upload_request("image/png", vec![1; UPLOAD_LIMIT + 1]))
            .await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_upload_non_image() {
        let app = TestApp::new().await;

        let response = app.send(upload_request("text/html", b"<p>".to_vec())).await;

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(read_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_upload_empty() {
        let app = TestApp::new().await;
        let response = app.send(upload_request("image/png", Vec::new())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_requires_auth() {
        let app = TestApp::new().await;
        let request = Request::post("/api/upload")
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from("x"))
            .unwrap();
        assert_eq!(app.send(request).await.status(), StatusCode::UNAUTHORIZED);
    }
}
