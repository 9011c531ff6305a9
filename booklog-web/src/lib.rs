//! booklog-web library - the reading-log web application
//!
//! Request flow: the router resolves an authenticated session and the
//! path-scoped user (api::auth), hands both to thin handlers (api::books),
//! which drive the owner-scoped book repository (db::books) and the CSV
//! pipeline (csv), and render through the askama view layer (views).

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod csv;
pub mod db;
pub mod views;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::root))
        .route("/user_registration/new", get(api::registration::new_form))
        .route("/user_registration", post(api::registration::create))
        .route("/login", get(api::session::login_form))
        .route("/login/handle", post(api::session::login))
        .route("/logout", post(api::session::logout))
        .route(
            "/users/:username/books",
            get(api::books::index).post(api::books::create),
        )
        .route("/users/:username/books/new", get(api::books::new_form))
        .route("/users/:username/books.csv", get(api::books::export_csv))
        .route(
            "/users/:username/books/import_csv/form",
            get(api::books::import_csv_form),
        )
        .route(
            "/users/:username/books/import_csv",
            post(api::books::import_csv),
        )
        .route(
            "/users/:username/books/:id",
            get(api::books::show).post(api::books::update),
        )
        .route("/users/:username/books/:id/edit", get(api::books::edit_form))
        .route(
            "/users/:username/books/:id/confirm_delete",
            get(api::books::confirm_delete),
        )
        .route("/users/:username/books/:id/delete", post(api::books::delete))
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
