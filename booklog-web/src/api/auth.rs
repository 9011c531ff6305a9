//! Session resolution and the path-user ownership guard
//!
//! The session cookie carries a bare bearer token that is looked up in the
//! `user_sessions` table; an absent or unknown token makes the request
//! anonymous rather than failing it. `OwnedScope` is the request-scoped
//! guard for book routes: it resolves the `:username` path segment and
//! requires the authenticated session to be that same user before any
//! handler body runs.

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use booklog_common::db::models::{SessionUser, UserMin};
use booklog_common::Error;
use std::collections::HashMap;

use crate::api::HandlerError;
use crate::db::users;
use crate::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "booklog_session";

/// The session attached to a request; `user` is `None` when anonymous.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = HandlerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, HandlerError> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Session::default());
        };

        // an unknown token is an anonymous request, not an error
        let user = users::session_user(&state.db, &token).await?;
        Ok(Session { user })
    }
}

/// The resolved identities a book route runs under.
///
/// An authenticated session for a different user is rejected as NotFound, so
/// foreign collections cannot be probed; anonymous requests are sent to the
/// login form instead.
#[derive(Debug, Clone)]
pub struct OwnedScope {
    pub path_user: UserMin,
    pub session: SessionUser,
}

#[async_trait]
impl FromRequestParts<AppState> for OwnedScope {
    type Rejection = HandlerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, HandlerError> {
        let session = Session::from_request_parts(parts, state).await?;
        let Some(session) = session.user else {
            return Err(HandlerError::AuthRequired);
        };

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| Error::NotFound("user".to_string()))?;
        let username = params
            .get("username")
            .ok_or_else(|| Error::NotFound("user".to_string()))?;

        let path_user = users::find_user_by_username(&state.db, username).await?;

        if session.user_id != path_user.id {
            return Err(Error::NotFound(format!("user {}", username)).into());
        }

        Ok(OwnedScope { path_user, session })
    }
}

/// Extract the session token from the Cookie header, if present.
fn session_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            if let Some((name, token)) = pair.trim().split_once('=') {
                if name == SESSION_COOKIE && !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

/// `Set-Cookie` value opening a session.
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// `Set-Cookie` value dropping the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
