//! Helpers for driving the router in tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, header};
use axum::response::Response;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use hed_posts::PostStore;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::app::create_router;
use crate::auth::Credentials;
use crate::state::{AppState, SiteInfo};
use crate::uploads::FsImageHost;

pub(crate) const UPLOAD_LIMIT: usize = 1024;

/// Router over an in-memory store and a temporary uploads directory.
pub(crate) struct TestApp {
    router: Router,
    pub(crate) posts: PostStore,
    pub(crate) uploads: TempDir,
}

impl TestApp {
    pub(crate) async fn new() -> Self {
        let posts = PostStore::in_memory().await.unwrap();
        posts.migrate().await.unwrap();
        let uploads = tempfile::tempdir().unwrap();

        let state = Arc::new(AppState {
            posts: posts.clone(),
            images: Arc::new(FsImageHost::new(uploads.path(), "/uploads", UPLOAD_LIMIT)),
            credentials: Credentials::new("admin", "secret", "Health Equity Dashboard"),
            site: SiteInfo {
                title: "Health Equity Dashboard".to_owned(),
                subtitle: "Monthly Insights".to_owned(),
            },
            uploads_dir: Some(uploads.path().to_path_buf()),
        });

        Self {
            router: create_router(state),
            posts,
            uploads,
        }
    }

    /// `Authorization` value for the test credential.
    pub(crate) fn auth() -> String {
        basic("admin:secret")
    }

    pub(crate) async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub(crate) async fn get(&self, uri: &str, auth: Option<&str>) -> Response {
        let mut builder = Request::get(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Authenticated JSON request.
    pub(crate) async fn json(&self, method: Method, uri: &str, body: &serde_json::Value) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, Self::auth())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

pub(crate) fn basic(raw: &str) -> String {
    format!("Basic {}", BASE64_STANDARD.encode(raw))
}

pub(crate) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub(crate) async fn read_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&read_body(response).await).unwrap()
}
