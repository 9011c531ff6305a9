//! New-account registration

use axum::extract::{Form, State};
use axum::http::{header::SET_COOKIE, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use booklog_common::Error;
use serde::Deserialize;

use crate::api::auth::session_cookie;
use crate::api::{render, HandlerError};
use crate::db::users;
use crate::views::RegistrationNewTemplate;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
}

/// GET /user_registration/new
pub async fn new_form() -> Result<Response, HandlerError> {
    render(
        StatusCode::OK,
        RegistrationNewTemplate {
            username: String::new(),
            errors: Vec::new(),
        },
    )
}

/// POST /user_registration
///
/// A successful registration opens a session immediately and lands on the
/// new user's (empty) book list.
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<RegistrationForm>,
) -> Result<Response, HandlerError> {
    match users::register_user(&state.db, &form.username, &form.password).await {
        Ok(user) => {
            let token = users::create_session(&state.db, user.id).await?;
            let redirect = Redirect::to(&format!("/users/{}/books", user.username));
            Ok(([(SET_COOKIE, session_cookie(&token))], redirect).into_response())
        }
        Err(Error::Validation(errors)) => render(
            StatusCode::UNPROCESSABLE_ENTITY,
            RegistrationNewTemplate {
                username: form.username,
                errors: crate::views::error_messages(&errors),
            },
        ),
        Err(err) => Err(err.into()),
    }
}
