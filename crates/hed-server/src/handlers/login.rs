//! Login endpoint.
//!
//! Lets the client verify a credential before storing it for later calls.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::auth::AuthOutcome;
use crate::state::AppState;

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    message: &'static str,
}

/// Handle GET|POST /api/login.
pub(crate) async fn login(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match state.credentials.check_headers(&headers) {
        AuthOutcome::Granted => Json(LoginResponse {
            success: true,
            message: "Authentication successful",
        })
        .into_response(),
        AuthOutcome::Denied => {
            tracing::warn!("Rejected login attempt");
            (
                StatusCode::UNAUTHORIZED,
                [(
                    header::WWW_AUTHENTICATE,
                    format!("Basic realm=\"{}\"", state.credentials.realm()),
                )],
            )
                .into_response()
        }
        AuthOutcome::Malformed => (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse {
                success: false,
                message: "Invalid credentials format",
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;

    use crate::testing::{TestApp, basic, read_body, read_json};

    #[tokio::test]
    async fn test_login_success() {
        let app = TestApp::new().await;

        let response = app.get("/api/login", Some(&TestApp::auth())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Authentication successful");
    }

    #[tokio::test]
    async fn test_login_post() {
        let app = TestApp::new().await;
        let request = Request::post("/api/login")
            .header(header::AUTHORIZATION, TestApp::auth())
            .body(Body::empty())
            .unwrap();

        assert_eq!(app.send(request).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = TestApp::new().await;

        let response = app.get("/api/login", Some(&basic("admin:wrong"))).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"Health Equity Dashboard\""
        );
        assert!(read_body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_login_missing_header() {
        let app = TestApp::new().await;
        let response = app.get("/api/login", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_login_malformed() {
        let app = TestApp::new().await;

        let response = app.get("/api/login", Some("Basic %%%")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid credentials format");
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let app = TestApp::new().await;
        let response = app.get("/api/login", None).await;
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }
}
