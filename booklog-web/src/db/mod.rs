//! Database access layer for booklog-web

pub mod books;
pub mod users;
