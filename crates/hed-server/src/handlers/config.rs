//! Configuration API endpoint.
//!
//! Returns client-side configuration for the frontend.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Response for GET /api/config.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigResponse {
    site_title: String,
    site_subtitle: String,
    /// Upload size limit, for client-side checks.
    max_upload_bytes: usize,
}

/// Handle GET /api/config.
pub(crate) async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        site_title: state.site.title.clone(),
        site_subtitle: state.site.subtitle.clone(),
        max_upload_bytes: state.max_upload_bytes(),
    })
}
