//! Login and logout handlers

use axum::extract::{Form, State};
use axum::http::{header::SET_COOKIE, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::api::auth::{clear_session_cookie, session_cookie, Session};
use crate::api::{render, HandlerError};
use crate::db::users;
use crate::views::LoginTemplate;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /login
pub async fn login_form() -> Result<Response, HandlerError> {
    render(
        StatusCode::OK,
        LoginTemplate {
            username: String::new(),
            errors: Vec::new(),
        },
    )
}

/// POST /login/handle
///
/// A failed login re-renders the form with one generic message; unknown
/// usernames and wrong passwords are not distinguished.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, HandlerError> {
    match users::verify_login(&state.db, &form.username, &form.password).await? {
        Some(user) => {
            let token = users::create_session(&state.db, user.id).await?;
            let redirect = Redirect::to(&format!("/users/{}/books", user.username));
            Ok(([(SET_COOKIE, session_cookie(&token))], redirect).into_response())
        }
        None => render(
            StatusCode::UNPROCESSABLE_ENTITY,
            LoginTemplate {
                username: form.username,
                errors: vec!["incorrect username or password".to_string()],
            },
        ),
    }
}

/// POST /logout
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, HandlerError> {
    if let Some(user) = session.user {
        users::delete_session(&state.db, &user.session_id).await?;
    }

    let redirect = Redirect::to("/login");
    Ok(([(SET_COOKIE, clear_session_cookie())], redirect).into_response())
}
