//! Request validation errors.
//!
//! Validation collects every problem with a request instead of stopping at the
//! first one, so the proxy can report all offending fields in one response.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single invalid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears in the query string.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
    /// Machine-readable category (`value_error`, `missing`, `conflict`).
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl FieldError {
    pub fn value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: "value_error",
        }
    }

    pub fn missing(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: "missing",
        }
    }

    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: "conflict",
        }
    }
}

/// One or more invalid fields in a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub details: Vec<FieldError>,
}

impl ValidationError {
    #[must_use]
    pub fn new(details: Vec<FieldError>) -> Self {
        Self { details }
    }

    #[must_use]
    pub fn single(detail: FieldError) -> Self {
        Self {
            details: vec![detail],
        }
    }

    /// Whether any detail refers to `field`.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.details.iter().any(|d| d.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("validation failed")?;
        for (idx, detail) in self.details.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            write!(f, "{sep}{} ({})", detail.message, detail.field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_field() {
        let err = ValidationError::new(vec![
            FieldError::value("date", "bad date"),
            FieldError::missing("end_date", "end required"),
        ]);

        assert_eq!(
            err.to_string(),
            "validation failed: bad date (date); end required (end_date)"
        );
        assert!(err.mentions("end_date"));
        assert!(!err.mentions("count"));
    }

    #[test]
    fn serializes_kind_as_type() {
        let json = serde_json::to_value(FieldError::conflict("date", "x")).unwrap();
        assert_eq!(json["type"], "conflict");
        assert_eq!(json["field"], "date");
    }
}
