//! Accumulating field validation
//!
//! A `Validator` collects field-level errors during form parsing and never
//! fails early: every check runs, callers decide whether the accumulated
//! result is fatal. Fields keep the order in which they were first checked,
//! which is also the order they are rendered in.

use std::fmt;

/// Field name → error messages, insertion-ordered.
///
/// An empty container means "no errors"; only a non-empty mapping signals
/// failure. `Validator::errors` returns `None` for the empty case so the
/// distinction cannot be missed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Messages recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, msgs)| msgs.as_slice())
    }

    /// Fields and their messages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, msgs)| (name.as_str(), msgs.as_slice()))
    }

    fn push(&mut self, field: &str, message: String) {
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, msgs)) => msgs.push(message),
            None => self.entries.push((field.to_string(), vec![message])),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{} {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Accumulates validation errors during form parsing.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `"cannot be blank"` for `field` when the value trims to empty.
    pub fn presence(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "cannot be blank");
        }
    }

    /// Record a minimum-length error unless the value is blank (presence
    /// covers that case).
    pub fn min_length(&mut self, field: &str, value: &str, min: usize) {
        let trimmed = value.trim();
        if !trimmed.is_empty() && trimmed.chars().count() < min {
            self.add(field, &format!("must be at least {} characters", min));
        }
    }

    /// Append an arbitrary error message to a field.
    pub fn add(&mut self, field: &str, message: &str) {
        self.errors.push(field, message.to_string());
    }

    /// Consume the validator; `None` when nothing accumulated.
    pub fn errors(self) -> Option<ValidationErrors> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_errors_is_none() {
        let mut v = Validator::new();
        v.presence("title", "The Dispossessed");
        v.presence("author", "Ursula K. Le Guin");
        assert!(v.errors().is_none());
    }

    #[test]
    fn test_presence_trims_whitespace() {
        let mut v = Validator::new();
        v.presence("title", "   ");
        let errors = v.errors().unwrap();
        assert_eq!(errors.get("title").unwrap(), &["cannot be blank"]);
    }

    #[test]
    fn test_fields_keep_check_order() {
        let mut v = Validator::new();
        v.presence("title", "");
        v.presence("author", "");
        v.presence("media", "");
        let errors = v.errors().unwrap();
        let fields: Vec<&str> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["title", "author", "media"]);
    }

    #[test]
    fn test_multiple_messages_per_field() {
        let mut v = Validator::new();
        v.add("finishDate", "cannot be blank");
        v.add("finishDate", "is not a date");
        let errors = v.errors().unwrap();
        assert_eq!(
            errors.get("finishDate").unwrap(),
            &["cannot be blank", "is not a date"]
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_min_length_skips_blank_values() {
        let mut v = Validator::new();
        v.min_length("password", "", 8);
        assert!(v.errors().is_none());

        let mut v = Validator::new();
        v.min_length("password", "short", 8);
        let errors = v.errors().unwrap();
        assert_eq!(
            errors.get("password").unwrap(),
            &["must be at least 8 characters"]
        );
    }

    #[test]
    fn test_display_joins_field_and_message() {
        let mut v = Validator::new();
        v.presence("title", "");
        v.add("finishDate", "is not a date");
        let errors = v.errors().unwrap();
        assert_eq!(
            errors.to_string(),
            "title cannot be blank, finishDate is not a date"
        );
    }
}
