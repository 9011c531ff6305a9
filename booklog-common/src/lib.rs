//! # Booklog Common Library
//!
//! Shared code for the booklog web application:
//! - Error taxonomy and crate-wide `Result`
//! - Field validation (accumulating, insertion-ordered)
//! - Finish-date parsing and formatting
//! - Configuration loading
//! - Database initialization and shared row models

pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod validate;

pub use error::{Error, Result};
pub use validate::{ValidationErrors, Validator};
