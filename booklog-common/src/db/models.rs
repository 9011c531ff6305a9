//! Database models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single reading-log entry.
///
/// Every book belongs to exactly one user; `user_id` never changes after
/// creation. The four remaining fields are replaced wholesale on edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub author: String,
    pub finish_date: NaiveDate,
    pub media: String,
}

/// Minimal user projection used for path scoping and CSV filenames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMin {
    pub id: i64,
    pub username: String,
}

/// A resolved login session joined to its user row.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub session_id: String,
    pub user_id: i64,
    pub username: String,
}
