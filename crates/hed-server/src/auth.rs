//! Shared-secret login gate using HTTP Basic credentials.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::error::ServerError;
use crate::state::AppState;

/// Outcome of checking an `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthOutcome {
    /// Credentials match.
    Granted,
    /// Header missing or credentials wrong.
    Denied,
    /// Header present but not decodable Basic credentials.
    Malformed,
}

/// The configured admin credential.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
    realm: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("realm", &self.realm)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Create credentials for `realm`.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            realm: realm.into(),
        }
    }

    /// Realm announced in the Basic challenge.
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Check a raw `Authorization` header value.
    #[must_use]
    pub fn authenticate(&self, header_value: &str) -> bool {
        self.check(Some(header_value)) == AuthOutcome::Granted
    }

    /// Check the `Authorization` header of a request.
    pub(crate) fn check_headers(&self, headers: &HeaderMap) -> AuthOutcome {
        match headers.get(header::AUTHORIZATION).map(|v| v.to_str()) {
            None => AuthOutcome::Denied,
            Some(Ok(value)) => self.check(Some(value)),
            Some(Err(_)) => AuthOutcome::Malformed,
        }
    }

    fn check(&self, header_value: Option<&str>) -> AuthOutcome {
        let Some(value) = header_value else {
            return AuthOutcome::Denied;
        };
        let Some((scheme, encoded)) = value.trim().split_once(' ') else {
            return AuthOutcome::Malformed;
        };
        if !scheme.eq_ignore_ascii_case("basic") {
            return AuthOutcome::Malformed;
        }
        let Ok(decoded) = BASE64_STANDARD.decode(encoded.trim()) else {
            return AuthOutcome::Malformed;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return AuthOutcome::Malformed;
        };
        let Some((username, password)) = decoded.split_once(':') else {
            return AuthOutcome::Denied;
        };

        // Both comparisons always run.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if user_ok & pass_ok {
            AuthOutcome::Granted
        } else {
            AuthOutcome::Denied
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Reject requests without the admin credential.
pub(crate) async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match state.credentials.check_headers(request.headers()) {
        AuthOutcome::Granted => next.run(request).await,
        AuthOutcome::Denied => {
            tracing::warn!(path = %request.uri().path(), "Rejected unauthenticated request");
            ServerError::Unauthorized {
                realm: state.credentials.realm().to_owned(),
            }
            .into_response()
        }
        AuthOutcome::Malformed => ServerError::MalformedCredentials.into_response(),
    }
}
