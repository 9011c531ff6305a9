//! View layer
//!
//! One askama template struct per page. Handlers construct these and never
//! format HTML themselves. `group_books_by_year` builds the year-bucketed
//! index model from the ascending listing in a single pass, so the listing
//! order doubles as the grouping order.

use askama::Template;
use booklog_common::db::models::Book;
use booklog_common::ValidationErrors;
use chrono::Datelike;

use crate::db::books::BookInput;

/// One year's worth of books on the index page.
pub struct YearBookList {
    pub year: i32,
    pub books: Vec<Book>,
}

/// Bucket an ascending-by-finish-date listing into per-year groups.
///
/// Consecutive entries sharing a year land in the same bucket; the input is
/// never re-sorted, so order within and across buckets is the listing order.
pub fn group_books_by_year(books: Vec<Book>) -> Vec<YearBookList> {
    let mut years: Vec<YearBookList> = Vec::new();
    for book in books {
        let year = book.finish_date.year();
        match years.last_mut() {
            Some(bucket) if bucket.year == year => bucket.books.push(book),
            _ => years.push(YearBookList {
                year,
                books: vec![book],
            }),
        }
    }
    years
}

/// Flatten accumulated field errors into display lines, preserving the
/// field-check order.
pub fn error_messages(errors: &ValidationErrors) -> Vec<String> {
    errors
        .iter()
        .flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| format!("{} {}", field, message))
        })
        .collect()
}

#[derive(Template)]
#[template(path = "book_index.html")]
pub struct BookIndexTemplate {
    pub username: String,
    pub years: Vec<YearBookList>,
}

#[derive(Template)]
#[template(path = "book_new.html")]
pub struct BookNewTemplate {
    pub username: String,
    pub fields: BookInput,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "book_edit.html")]
pub struct BookEditTemplate {
    pub username: String,
    pub book_id: i64,
    pub fields: BookInput,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "book_show.html")]
pub struct BookShowTemplate {
    pub username: String,
    pub book: Book,
}

#[derive(Template)]
#[template(path = "book_confirm_delete.html")]
pub struct BookConfirmDeleteTemplate {
    pub username: String,
    pub book: Book,
}

#[derive(Template)]
#[template(path = "book_import_csv_form.html")]
pub struct BookImportCsvFormTemplate {
    pub username: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "user_registration_new.html")]
pub struct RegistrationNewTemplate {
    pub username: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {}
