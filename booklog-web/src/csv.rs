//! CSV import/export pipeline
//!
//! Import reads the whole file before touching the store, so format problems
//! (too few rows, too few columns, ragged records) surface before any insert.
//! Row inserts are NOT wrapped in a transaction: when a row fails, the rows
//! before it stay persisted. Partial import on row failure is the documented
//! contract, and the returned error names the 1-indexed data row that broke.
//!
//! Export emits most-recent-first (the reverse of the display listing) with
//! finish dates normalized to ISO regardless of how they were entered.

use booklog_common::{dates, Error, Result};
use csv::{ReaderBuilder, StringRecord, Writer};
use sqlx::SqlitePool;

use crate::db::books::{self, BookInput};

/// Import books from a CSV document into `owner_id`'s collection.
///
/// Expected layout: a header row `title,author,finish_date,media` followed by
/// one row per book. A blank media column defaults to `"book"`. Returns the
/// number of rows imported.
pub async fn import_books_from_csv(db: &SqlitePool, owner_id: i64, input: &[u8]) -> Result<usize> {
    let mut reader = ReaderBuilder::new().has_headers(false).from_reader(input);

    let records: Vec<StringRecord> = reader
        .records()
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::Format(format!("malformed CSV: {}", e)))?;

    if records.len() < 2 {
        return Err(Error::Format("CSV must have at least 2 rows".to_string()));
    }

    if records[0].len() < 4 {
        return Err(Error::Format("CSV must have at least 4 columns".to_string()));
    }

    let mut imported = 0;
    for (i, record) in records[1..].iter().enumerate() {
        let media = match record.get(3).unwrap_or("") {
            "" => "book",
            media => media,
        };
        let input = BookInput {
            title: record.get(0).unwrap_or("").to_string(),
            author: record.get(1).unwrap_or("").to_string(),
            finish_date: record.get(2).unwrap_or("").to_string(),
            media: media.to_string(),
        };

        books::create_book(db, owner_id, &input)
            .await
            .map_err(|e| e.at_csv_row(i + 1))?;
        imported += 1;
    }

    Ok(imported)
}

/// Serialize `owner_id`'s collection as a downloadable CSV document.
pub async fn export_books_to_csv(db: &SqlitePool, owner_id: i64) -> Result<Vec<u8>> {
    let books = books::list_books_for_export(db, owner_id).await?;

    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(["title", "author", "finish_date", "media"])
        .map_err(|e| Error::Format(format!("CSV encoding failed: {}", e)))?;

    for book in &books {
        let finish_date = dates::format_finish_date(book.finish_date);
        writer
            .write_record([
                book.title.as_str(),
                book.author.as_str(),
                finish_date.as_str(),
                book.media.as_str(),
            ])
            .map_err(|e| Error::Format(format!("CSV encoding failed: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| Error::Format(format!("CSV encoding failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklog_common::db::init::create_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        pool
    }

    async fn seed_user(pool: &SqlitePool, username: &str) -> i64 {
        sqlx::query("INSERT INTO users (username, password_hash, password_salt) VALUES (?, '', '')")
            .bind(username)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn count_books(pool: &SqlitePool, owner_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE user_id = ?")
            .bind(owner_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_import_then_export_normalizes_dates() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;

        let input = "title,author,finish_date,media\n\
                     Dune,Frank Herbert,2020-01-15,book\n\
                     Piranesi,Susanna Clarke,1/15/2020,audiobook\n";
        let imported = import_books_from_csv(&pool, alice, input.as_bytes())
            .await
            .unwrap();
        assert_eq!(imported, 2);

        let out = export_books_to_csv(&pool, alice).await.unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "title,author,finish_date,media");
        // both dates exported in ISO form
        assert_eq!(lines[1], "Dune,Frank Herbert,2020-01-15,book");
        assert_eq!(lines[2], "Piranesi,Susanna Clarke,2020-01-15,audiobook");
    }

    #[tokio::test]
    async fn test_import_defaults_blank_media_to_book() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;

        let input = "title,author,finish_date,media\nDune,Frank Herbert,2020-01-15,\n";
        import_books_from_csv(&pool, alice, input.as_bytes())
            .await
            .unwrap();

        let media: String = sqlx::query_scalar("SELECT media FROM books WHERE user_id = ?")
            .bind(alice)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(media, "book");
    }

    #[tokio::test]
    async fn test_import_rejects_header_only_file() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;

        let err = import_books_from_csv(&pool, alice, b"title,author,finish_date,media\n")
            .await
            .unwrap_err();
        match err {
            Error::Format(msg) => assert_eq!(msg, "CSV must have at least 2 rows"),
            other => panic!("expected format error, got {:?}", other),
        }
        assert_eq!(count_books(&pool, alice).await, 0);
    }

    #[tokio::test]
    async fn test_import_rejects_narrow_header_before_any_row() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;

        let input = "title,author,finish_date\nDune,Frank Herbert,2020-01-15\n";
        let err = import_books_from_csv(&pool, alice, input.as_bytes())
            .await
            .unwrap_err();
        match err {
            Error::Format(msg) => assert_eq!(msg, "CSV must have at least 4 columns"),
            other => panic!("expected format error, got {:?}", other),
        }
        assert_eq!(count_books(&pool, alice).await, 0);
    }

    #[tokio::test]
    async fn test_import_rejects_ragged_rows_before_any_insert() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;

        let input = "title,author,finish_date,media\n\
                     Dune,Frank Herbert,2020-01-15,book\n\
                     Piranesi,Susanna Clarke,2020-02-01\n";
        let err = import_books_from_csv(&pool, alice, input.as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        // the well-formed first row was not inserted either
        assert_eq!(count_books(&pool, alice).await, 0);
    }

    #[tokio::test]
    async fn test_import_partial_failure_keeps_earlier_rows_and_names_row() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;

        let input = "title,author,finish_date,media\n\
                     Dune,Frank Herbert,2020-01-15,book\n\
                     ,Susanna Clarke,2020-02-01,book\n\
                     Exhalation,Ted Chiang,2020-03-01,book\n";
        let err = import_books_from_csv(&pool, alice, input.as_bytes())
            .await
            .unwrap_err();

        assert!(err.to_string().starts_with("row 2: "));
        match &err {
            Error::CsvRow { row, source } => {
                assert_eq!(*row, 2);
                assert!(matches!(**source, Error::Validation(_)));
            }
            other => panic!("expected row-decorated error, got {:?}", other),
        }
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.get("title").unwrap(), &["cannot be blank"]);

        // row 1 stays persisted, row 3 was never attempted
        assert_eq!(count_books(&pool, alice).await, 1);
        let title: String = sqlx::query_scalar("SELECT title FROM books WHERE user_id = ?")
            .bind(alice)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(title, "Dune");
    }

    #[tokio::test]
    async fn test_export_is_most_recent_first() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;

        let input = "title,author,finish_date,media\n\
                     A,Author,2019-06-01,book\n\
                     B,Author,2020-01-01,book\n\
                     C,Author,2019-12-31,book\n";
        import_books_from_csv(&pool, alice, input.as_bytes())
            .await
            .unwrap();

        let out = export_books_to_csv(&pool, alice).await.unwrap();
        let out = String::from_utf8(out).unwrap();
        let dates: Vec<&str> = out
            .lines()
            .skip(1)
            .map(|line| line.split(',').nth(2).unwrap())
            .collect();
        assert_eq!(dates, vec!["2020-01-01", "2019-12-31", "2019-06-01"]);
    }

    #[tokio::test]
    async fn test_export_empty_collection_is_header_only() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;

        let out = export_books_to_csv(&pool, alice).await.unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "title,author,finish_date,media\n");
    }

    #[tokio::test]
    async fn test_export_is_scoped_to_owner() {
        let pool = test_pool().await;
        let alice = seed_user(&pool, "alice").await;
        let bob = seed_user(&pool, "bob").await;

        let input = "title,author,finish_date,media\nDune,Frank Herbert,2020-01-15,book\n";
        import_books_from_csv(&pool, alice, input.as_bytes())
            .await
            .unwrap();

        let out = export_books_to_csv(&pool, bob).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
