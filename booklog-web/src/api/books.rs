//! Book page handlers
//!
//! Every route here runs under an `OwnedScope`, so the handler bodies only
//! ever see a path user that matches the authenticated session. Validation
//! failures re-render the submitted form with 422 and the accumulated field
//! errors; successful mutations redirect with 303.

use axum::extract::{Form, Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use booklog_common::{dates, Error};

use crate::api::auth::OwnedScope;
use crate::api::{render, HandlerError};
use crate::csv;
use crate::db::books::{self, BookInput};
use crate::views::{
    error_messages, group_books_by_year, BookConfirmDeleteTemplate, BookEditTemplate,
    BookImportCsvFormTemplate, BookIndexTemplate, BookNewTemplate, BookShowTemplate,
};
use crate::AppState;

fn books_path(username: &str) -> String {
    format!("/users/{}/books", username)
}

fn book_path(username: &str, id: i64) -> String {
    format!("/users/{}/books/{}", username, id)
}

/// GET /users/:username/books
pub async fn index(
    State(state): State<AppState>,
    scope: OwnedScope,
) -> Result<Response, HandlerError> {
    let books = books::list_books_for_user(&state.db, scope.path_user.id).await?;

    render(
        StatusCode::OK,
        BookIndexTemplate {
            username: scope.path_user.username,
            years: group_books_by_year(books),
        },
    )
}

/// GET /users/:username/books/new
pub async fn new_form(scope: OwnedScope) -> Result<Response, HandlerError> {
    render(
        StatusCode::OK,
        BookNewTemplate {
            username: scope.path_user.username,
            fields: BookInput::default(),
            errors: Vec::new(),
        },
    )
}

/// POST /users/:username/books
pub async fn create(
    State(state): State<AppState>,
    scope: OwnedScope,
    Form(input): Form<BookInput>,
) -> Result<Response, HandlerError> {
    match books::create_book(&state.db, scope.path_user.id, &input).await {
        Ok(book) => {
            Ok(Redirect::to(&book_path(&scope.path_user.username, book.id)).into_response())
        }
        Err(Error::Validation(errors)) => render(
            StatusCode::UNPROCESSABLE_ENTITY,
            BookNewTemplate {
                username: scope.path_user.username,
                fields: input,
                errors: error_messages(&errors),
            },
        ),
        Err(err) => Err(err.into()),
    }
}

/// GET /users/:username/books/:id
pub async fn show(
    State(state): State<AppState>,
    scope: OwnedScope,
    Path((_, book_id)): Path<(String, i64)>,
) -> Result<Response, HandlerError> {
    let book = books::get_owned_book(&state.db, book_id, scope.path_user.id).await?;

    render(
        StatusCode::OK,
        BookShowTemplate {
            username: scope.path_user.username,
            book,
        },
    )
}

/// GET /users/:username/books/:id/edit
///
/// The prefilled finish date is always ISO, whatever form it was entered in.
pub async fn edit_form(
    State(state): State<AppState>,
    scope: OwnedScope,
    Path((_, book_id)): Path<(String, i64)>,
) -> Result<Response, HandlerError> {
    let book = books::get_owned_book(&state.db, book_id, scope.path_user.id).await?;

    let fields = BookInput {
        title: book.title,
        author: book.author,
        finish_date: dates::format_finish_date(book.finish_date),
        media: book.media,
    };

    render(
        StatusCode::OK,
        BookEditTemplate {
            username: scope.path_user.username,
            book_id,
            fields,
            errors: Vec::new(),
        },
    )
}

/// POST /users/:username/books/:id
pub async fn update(
    State(state): State<AppState>,
    scope: OwnedScope,
    Path((_, book_id)): Path<(String, i64)>,
    Form(input): Form<BookInput>,
) -> Result<Response, HandlerError> {
    match books::update_book(&state.db, book_id, scope.path_user.id, &input).await {
        Ok(()) => Ok(Redirect::to(&book_path(&scope.path_user.username, book_id)).into_response()),
        Err(Error::Validation(errors)) => render(
            StatusCode::UNPROCESSABLE_ENTITY,
            BookEditTemplate {
                username: scope.path_user.username,
                book_id,
                fields: input,
                errors: error_messages(&errors),
            },
        ),
        Err(err) => Err(err.into()),
    }
}

/// GET /users/:username/books/:id/confirm_delete
pub async fn confirm_delete(
    State(state): State<AppState>,
    scope: OwnedScope,
    Path((_, book_id)): Path<(String, i64)>,
) -> Result<Response, HandlerError> {
    let book = books::get_owned_book(&state.db, book_id, scope.path_user.id).await?;

    render(
        StatusCode::OK,
        BookConfirmDeleteTemplate {
            username: scope.path_user.username,
            book,
        },
    )
}

/// POST /users/:username/books/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    scope: OwnedScope,
    Path((_, book_id)): Path<(String, i64)>,
) -> Result<Response, HandlerError> {
    books::delete_book(&state.db, book_id, scope.path_user.id).await?;

    Ok(Redirect::to(&books_path(&scope.path_user.username)).into_response())
}

/// GET /users/:username/books/import_csv/form
pub async fn import_csv_form(scope: OwnedScope) -> Result<Response, HandlerError> {
    render(
        StatusCode::OK,
        BookImportCsvFormTemplate {
            username: scope.path_user.username,
            errors: Vec::new(),
        },
    )
}

/// POST /users/:username/books/import_csv
///
/// Rows inserted before a failing row stay persisted; the re-rendered form
/// reports which row broke so the user can fix the file and re-upload the
/// remainder.
pub async fn import_csv(
    State(state): State<AppState>,
    scope: OwnedScope,
    mut multipart: Multipart,
) -> Result<Response, HandlerError> {
    let mut file: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Format(format!("invalid upload: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::Format(format!("invalid upload: {}", e)))?;
            file = Some(bytes.to_vec());
            break;
        }
    }

    let Some(file) = file else {
        return render(
            StatusCode::UNPROCESSABLE_ENTITY,
            BookImportCsvFormTemplate {
                username: scope.path_user.username,
                errors: vec!["no file was uploaded".to_string()],
            },
        );
    };

    match csv::import_books_from_csv(&state.db, scope.path_user.id, &file).await {
        Ok(_) => Ok(Redirect::to(&books_path(&scope.path_user.username)).into_response()),
        Err(err @ (Error::Format(_) | Error::CsvRow { .. } | Error::Validation(_))) => render(
            StatusCode::UNPROCESSABLE_ENTITY,
            BookImportCsvFormTemplate {
                username: scope.path_user.username,
                errors: vec![err.to_string()],
            },
        ),
        Err(err) => Err(err.into()),
    }
}

/// GET /users/:username/books.csv
pub async fn export_csv(
    State(state): State<AppState>,
    scope: OwnedScope,
) -> Result<Response, HandlerError> {
    let body = csv::export_books_to_csv(&state.db, scope.path_user.id).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=booklog-{}.csv",
                scope.path_user.username
            ),
        ),
    ];
    Ok((headers, body).into_response())
}
