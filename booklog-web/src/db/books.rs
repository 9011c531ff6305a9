//! Book repository
//!
//! Every operation is scoped by an explicit owner id; none infers the owner
//! from ambient state. Mutations match on `id AND user_id` so a wrong id and
//! a book owned by someone else produce the same `NotFound`.

use booklog_common::db::models::Book;
use booklog_common::{dates, Error, Result, Validator};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// The four mutable book fields as submitted by a form or a CSV row.
///
/// `finish_date` stays a string until validation; the parsed date never
/// leaves this module unvalidated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    #[serde(rename = "finishDate")]
    pub finish_date: String,
    pub media: String,
}

/// Run the field checks for create/update and parse the finish date.
///
/// Presence is checked in display order (title, author, finishDate, media);
/// a non-blank but unparseable date is folded into the same container under
/// `finishDate`.
fn parse_book_input(input: &BookInput) -> Result<NaiveDate> {
    let mut v = Validator::new();
    v.presence("title", &input.title);
    v.presence("author", &input.author);
    v.presence("finishDate", &input.finish_date);
    v.presence("media", &input.media);

    let date = dates::parse_finish_date(input.finish_date.trim());
    if date.is_none() && !input.finish_date.trim().is_empty() {
        v.add("finishDate", "is not a date");
    }

    match v.errors() {
        Some(errors) => Err(Error::Validation(errors)),
        // a blank date already failed presence, so date is Some here
        None => date.ok_or_else(|| Error::Format("finish date did not parse".to_string())),
    }
}

/// Validate and insert a new book for `owner_id`, returning the stored row
/// with its assigned id.
pub async fn create_book(db: &SqlitePool, owner_id: i64, input: &BookInput) -> Result<Book> {
    let finish_date = parse_book_input(input)?;

    let result = sqlx::query(
        "INSERT INTO books (user_id, title, author, finish_date, media) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(owner_id)
    .bind(&input.title)
    .bind(&input.author)
    .bind(finish_date)
    .bind(&input.media)
    .execute(db)
    .await?;

    Ok(Book {
        id: result.last_insert_rowid(),
        user_id: owner_id,
        title: input.title.clone(),
        author: input.author.clone(),
        finish_date,
        media: input.media.clone(),
    })
}

/// Fetch a book by id alone.
///
/// Ownership is NOT checked here; callers compare `book.user_id` against the
/// requesting identity (or use `get_owned_book`) and report a mismatch as
/// `NotFound`.
pub async fn get_book(db: &SqlitePool, book_id: i64) -> Result<Book> {
    let row = sqlx::query(
        "SELECT id, user_id, title, author, finish_date, media FROM books WHERE id = ?",
    )
    .bind(book_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| Error::NotFound(format!("book {}", book_id)))?;

    Ok(book_from_row(&row))
}

/// Fetch a book and require it to belong to `owner_id`.
///
/// A book owned by someone else is reported exactly like a missing one.
pub async fn get_owned_book(db: &SqlitePool, book_id: i64, owner_id: i64) -> Result<Book> {
    let book = get_book(db, book_id).await?;
    if book.user_id != owner_id {
        return Err(Error::NotFound(format!("book {}", book_id)));
    }
    Ok(book)
}

/// Validate and replace the four mutable fields of an owned book.
pub async fn update_book(
    db: &SqlitePool,
    book_id: i64,
    owner_id: i64,
    input: &BookInput,
) -> Result<()> {
    let finish_date = parse_book_input(input)?;

    let result = sqlx::query(
        "UPDATE books SET title = ?, author = ?, finish_date = ?, media = ?, \
         updated_at = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?",
    )
    .bind(&input.title)
    .bind(&input.author)
    .bind(finish_date)
    .bind(&input.media)
    .bind(book_id)
    .bind(owner_id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("book {}", book_id)));
    }

    Ok(())
}

/// Delete an owned book.
pub async fn delete_book(db: &SqlitePool, book_id: i64, owner_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM books WHERE id = ? AND user_id = ?")
        .bind(book_id)
        .bind(owner_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("book {}", book_id)));
    }

    Ok(())
}

/// All books for one user, ascending by finish date. The index view groups
/// consecutive entries by year, so the order doubles as the grouping order.
pub async fn list_books_for_user(db: &SqlitePool, owner_id: i64) -> Result<Vec<Book>> {
    let rows = sqlx::query(
        "SELECT id, user_id, title, author, finish_date, media FROM books \
         WHERE user_id = ? ORDER BY finish_date ASC, id ASC",
    )
    .bind(owner_id)
    .fetch_all(db)
    .await?;

    Ok(rows.iter().map(book_from_row).collect())
}

/// All books for one user, descending by finish date - the export order
/// (most recent first), intentionally the reverse of the display listing.
pub async fn list_books_for_export(db: &SqlitePool, owner_id: i64) -> Result<Vec<Book>> {
    let rows = sqlx::query(
        "SELECT id, user_id, title, author, finish_date, media FROM books \
         WHERE user_id = ? ORDER BY finish_date DESC, id DESC",
    )
    .bind(owner_id)
    .fetch_all(db)
    .await?;

    Ok(rows.iter().map(book_from_row).collect())
}

fn book_from_row(row: &SqliteRow) -> Book {
    Book {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        author: row.get("author"),
        finish_date: row.get("finish_date"),
        media: row.get("media"),
    }
}
