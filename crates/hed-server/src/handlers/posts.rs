//! Posts API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use hed_markup::{Editable, RenderOptions};
use hed_posts::{NewPost, Post, PostUpdate};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// List entry: the post plus its rendered preview.
#[derive(Serialize)]
struct PostSummary {
    #[serde(flatten)]
    post: Post,
    preview: String,
}

/// Response for GET /api/posts/{id}.
#[derive(Serialize)]
struct PostDetail {
    #[serde(flatten)]
    post: Post,
    html: String,
}

#[derive(Deserialize, Default)]
pub(crate) struct DetailQuery {
    /// Append unclaimed images as a gallery.
    #[serde(default)]
    gallery: bool,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    message: &'static str,
}

/// Handle GET /api/posts.
pub(crate) async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let posts = state.posts.list().await?;
    let summaries: Vec<PostSummary> = posts
        .into_iter()
        .map(|post| PostSummary {
            preview: post.preview(),
            post,
        })
        .collect();
    Ok(Json(summaries))
}

/// Handle POST /api/posts.
pub(crate) async fn create_post(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Json(new_post) = payload?;
    let post = state.posts.create(new_post).await?;
    tracing::info!(id = post.id, title = %post.title, "Created post");
    Ok((StatusCode::CREATED, Json(post)))
}

/// Handle GET /api/posts/{id}.
pub(crate) async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<DetailQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let post = state.posts.get(id).await?;
    let html = post.render(RenderOptions {
        gallery: query.gallery,
    });
    Ok(Json(PostDetail { post, html }))
}

/// Handle PUT|PATCH /api/posts/{id}.
pub(crate) async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<PostUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Json(update) = payload?;
    let post = state.posts.update(id, update).await?;
    tracing::info!(id, "Updated post");
    Ok(Json(post))
}

/// Handle DELETE /api/posts/{id}.
pub(crate) async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServerError> {
    state.posts.delete(id).await?;
    tracing::info!(id, "Deleted post");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Post deleted successfully",
    }))
}

/// Handle GET /api/posts/{id}/editable.
pub(crate) async fn get_editable(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Editable>, ServerError> {
    let post = state.posts.get(id).await?;
    Ok(Json(post.editable()))
}
