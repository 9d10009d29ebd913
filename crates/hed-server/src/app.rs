//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// `/api/config` and `/api/login` are public; every other API route sits
/// behind the Basic credential check.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    // Leave room for one byte past the limit so oversized uploads reach the
    // handler and get a JSON error.
    let upload_limit = state.max_upload_bytes().saturating_add(1);

    let protected = Router::new()
        .route(
            "/api/posts",
            get(handlers::posts::list_posts).post(handlers::posts::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::posts::get_post)
                .put(handlers::posts::update_post)
                .patch(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route(
            "/api/posts/{id}/editable",
            get(handlers::posts::get_editable),
        )
        .route(
            "/api/upload",
            post(handlers::upload::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/render", post(handlers::render::render_preview))
        .route(
            "/api/editor/insert-image",
            post(handlers::render::insert_image),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    let public = Router::new()
        .route("/api/config", get(handlers::config::get_config))
        .route(
            "/api/login",
            get(handlers::login::login).post(handlers::login::login),
        );

    let mut router = public.merge(protected);

    if let Some(dir) = &state.uploads_dir {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    let router = router
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    security::with_security_headers(router)
}
