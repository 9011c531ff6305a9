//! HTTP handlers for booklog-web
//!
//! Handlers stay thin: they wire form input into the book repository and the
//! CSV pipeline, then pick a response. Classification lives in
//! `HandlerError::into_response` — validation failures re-render the
//! submitted form (the handlers catch those themselves), NotFound renders
//! the not-found page, anything else is a generic internal failure.

pub mod auth;
pub mod books;
pub mod health;
pub mod registration;
pub mod session;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use booklog_common::Error;
use tracing::error;

use crate::views::NotFoundTemplate;
use self::auth::Session;

/// GET /
///
/// Entry point: your own books when logged in, the login form otherwise.
pub async fn root(session: Session) -> Redirect {
    match session.user {
        Some(user) => Redirect::to(&format!("/users/{}/books", user.username)),
        None => Redirect::to("/login"),
    }
}

/// Error type returned by handlers and extractors.
pub enum HandlerError {
    /// An error from the repository, pipeline, or store.
    Core(Error),
    /// Template rendering failed.
    Render(askama::Error),
    /// Anonymous request to a user-scoped page; send to the login form.
    AuthRequired,
}

impl From<Error> for HandlerError {
    fn from(err: Error) -> Self {
        HandlerError::Core(err)
    }
}

impl From<askama::Error> for HandlerError {
    fn from(err: askama::Error) -> Self {
        HandlerError::Render(err)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::AuthRequired => Redirect::to("/login").into_response(),
            HandlerError::Core(Error::NotFound(_)) => not_found_page(),
            HandlerError::Core(Error::Validation(errors)) => {
                // fallback only: handlers re-render the offending form themselves
                (StatusCode::UNPROCESSABLE_ENTITY, errors.to_string()).into_response()
            }
            HandlerError::Core(err) => {
                error!("request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            HandlerError::Render(err) => {
                error!("template rendering failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// The not-found page. Ownership mismatches land here too, so a foreign
/// user's records are indistinguishable from absent ones.
pub fn not_found_page() -> Response {
    match (NotFoundTemplate {}).render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(err) => {
            error!("template rendering failed: {}", err);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

/// Render a template as an HTML response with the given status.
pub(crate) fn render<T: Template>(status: StatusCode, template: T) -> Result<Response, HandlerError> {
    let html = template.render()?;
    Ok((status, Html(html)).into_response())
}
