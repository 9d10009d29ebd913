//! HTTP server for the Health Equity Dashboard.
//!
//! Serves a JSON API over axum:
//! - Posts CRUD with server-side rendering of the post markup
//! - Image uploads, stored content-addressed on disk and served at `/uploads`
//! - Live preview and editor helpers for the edit form
//!
//! Everything except `/api/config` and `/api/login` requires the admin
//! credential as HTTP Basic auth.
//!
//! # Quick Start
//!
//! ```ignore
//! use hed_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         password: "secret".to_owned(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Client ──HTTP──► axum router (hed-server)
//!                      │
//!                      ├─► /api/login, /api/config (public)
//!                      │
//!                      ├─► Basic auth gate
//!                      │       ├─► /api/posts ──► PostStore (SQLite) + hed-markup
//!                      │       ├─► /api/upload ──► ImageHost (filesystem)
//!                      │       └─► /api/render, /api/editor ──► hed-markup
//!                      │
//!                      └─► /uploads (tower-http ServeDir)
//! ```

mod app;
mod auth;
mod error;
mod handlers;
mod middleware;
mod state;
mod uploads;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use hed_posts::PostStore;
use state::{AppState, SiteInfo};

pub use auth::Credentials;
pub use error::ServerError;
pub use uploads::{FsImageHost, ImageHost, UploadError};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// SQLite database file.
    pub database: PathBuf,
    /// Admin username.
    pub username: String,
    /// Admin password.
    pub password: String,
    /// Basic auth realm.
    pub realm: String,
    /// Directory for uploaded images.
    pub uploads_dir: PathBuf,
    /// Public URL prefix for uploaded images.
    pub uploads_base_url: String,
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: usize,
    /// Site title.
    pub site_title: String,
    /// Site subtitle.
    pub site_subtitle: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            database: PathBuf::from("hed.db"),
            username: "admin".to_owned(),
            password: String::new(),
            realm: "Health Equity Dashboard".to_owned(),
            uploads_dir: PathBuf::from("uploads"),
            uploads_base_url: "/uploads".to_owned(),
            max_upload_bytes: hed_config::DEFAULT_MAX_UPLOAD_BYTES,
            site_title: "Health Equity Dashboard".to_owned(),
            site_subtitle: "Monthly Insights".to_owned(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the server fails
/// to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let posts = PostStore::connect(&config.database).await?;
    posts.migrate().await?;

    let images = FsImageHost::new(
        config.uploads_dir.clone(),
        config.uploads_base_url.clone(),
        config.max_upload_bytes,
    );

    let state = Arc::new(AppState {
        posts,
        images: Arc::new(images),
        credentials: Credentials::new(config.username, config.password, config.realm),
        site: SiteInfo {
            title: config.site_title,
            subtitle: config.site_subtitle,
        },
        uploads_dir: Some(config.uploads_dir),
    });

    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, database = %config.database.display(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from the loaded configuration.
///
/// Credentials are copied as-is; check them with
/// [`hed_config::Config::require_auth`] first.
#[must_use]
pub fn server_config_from_config(config: &hed_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        database: config.database_resolved.path.clone(),
        username: config.auth.username.clone(),
        password: config.auth.password.clone(),
        realm: config.auth.realm.clone(),
        uploads_dir: config.uploads_resolved.dir.clone(),
        uploads_base_url: config.uploads_resolved.base_url.clone(),
        max_upload_bytes: config.uploads_resolved.max_bytes,
        site_title: config.site.title.clone(),
        site_subtitle: config.site.subtitle.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_server_config_from_config() {
        let mut config = hed_config::Config::default_with_base(Path::new("/srv"));
        config.auth.password = "pw".to_owned();

        let server = server_config_from_config(&config);

        assert_eq!(server.port, 7979);
        assert_eq!(server.database, PathBuf::from("/srv/hed.db"));
        assert_eq!(server.uploads_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(server.password, "pw");
        assert_eq!(server.max_upload_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_default_matches_config_default() {
        let server = ServerConfig::default();
        let config = hed_config::Config::default_with_base(Path::new("."));
        assert_eq!(server.port, config.server.port);
        assert_eq!(server.realm, config.auth.realm);
    }
}
