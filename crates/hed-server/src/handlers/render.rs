//! Live preview and editor endpoints.
//!
//! Both are stateless transforms over the request body; nothing is stored.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use hed_markup::{Editable, ImageTable, RenderOptions, render_with};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// Request for POST /api/render.
#[derive(Deserialize)]
pub(crate) struct RenderRequest {
    text: String,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    gallery: bool,
}

#[derive(Serialize)]
pub(crate) struct RenderResponse {
    html: String,
}

/// Request for POST /api/editor/insert-image.
#[derive(Deserialize)]
pub(crate) struct InsertImageRequest {
    text: String,
    #[serde(default)]
    images: Vec<String>,
    /// Cursor position in characters.
    cursor: usize,
    url: String,
}

#[derive(Serialize)]
pub(crate) struct InsertImageResponse {
    text: String,
    images: Vec<String>,
    cursor: usize,
}

/// Handle POST /api/render.
pub(crate) async fn render_preview(
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<RenderResponse>, ServerError> {
    let Json(request) = payload?;
    let html = render_with(
        &request.text,
        &ImageTable::ordered(request.images),
        RenderOptions {
            gallery: request.gallery,
        },
    );
    Ok(Json(RenderResponse { html }))
}

/// Handle POST /api/editor/insert-image.
pub(crate) async fn insert_image(
    payload: Result<Json<InsertImageRequest>, JsonRejection>,
) -> Result<Json<InsertImageResponse>, ServerError> {
    let Json(request) = payload?;
    let mut editable = Editable::new(request.text, request.images);
    let cursor = editable.insert_image(request.cursor, request.url);
    Ok(Json(InsertImageResponse {
        text: editable.text,
        images: editable.images,
        cursor,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::testing::{TestApp, read_json};

    #[tokio::test]
    async fn test_render_preview() {
        let app = TestApp::new().await;

        let response = app
            .json(
                Method::POST,
                "/api/render",
                &json!({"text": "### Title\n[Image]", "images": ["u"]}),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(
            json["html"],
            r#"<h3>Title</h3><div class="post-image"><img src="u" alt="Content image" loading="lazy"></div>"#
        );
    }

    #[tokio::test]
    async fn test_insert_image() {
        let app = TestApp::new().await;

        let response = app
            .json(
                Method::POST,
                "/api/editor/insert-image",
                &json!({"text": "[Image]\nabc", "images": ["a"], "cursor": 11, "url": "b"}),
            )
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["text"], "[Image]\nabc\n[Image]\n");
        assert_eq!(json["images"], json!(["a", "b"]));
        assert_eq!(json["cursor"], 20);
    }

    #[tokio::test]
    async fn test_render_missing_text_is_bad_request() {
        let app = TestApp::new().await;

        let response = app
            .json(Method::POST, "/api/render", &json!({"images": []}))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("text"));
    }
}
