//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use hed_posts::PostStore;

use crate::auth::Credentials;
use crate::uploads::ImageHost;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Post store (cheap to clone, wraps a connection pool).
    pub(crate) posts: PostStore,
    /// Upload backend.
    pub(crate) images: Arc<dyn ImageHost>,
    /// Admin credential for protected routes.
    pub(crate) credentials: Credentials,
    /// Titles reported by `/api/config`.
    pub(crate) site: SiteInfo,
    /// Directory served at `/uploads` (`None` disables the route).
    pub(crate) uploads_dir: Option<PathBuf>,
}

/// Site titles.
#[derive(Clone, Debug)]
pub(crate) struct SiteInfo {
    pub(crate) title: String,
    pub(crate) subtitle: String,
}

impl AppState {
    /// Largest accepted upload in bytes.
    pub(crate) fn max_upload_bytes(&self) -> usize {
        self.images.max_bytes()
    }
}
