//! Input checks the insurance functions require before any call is built.
//!
//! These are the presentation-independent rules: identifiers and amounts
//! must be positive, and free-text fields must have content. Anything
//! deeper (does the pool exist, is the claim still open) is decided on-chain.

use thiserror::Error;

/// Errors returned when caller input fails a local check.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a positive integer, got {value}")]
    NotPositive { field: &'static str, value: i128 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

/// Require `value > 0`.
pub fn require_positive(field: &'static str, value: i128) -> Result<i128, ValidationError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive { field, value })
    }
}

/// Require `value` to contain something other than whitespace.
///
/// Returns the value unchanged; trimming is only used for the check.
pub fn require_text<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_accepts_one() {
        assert_eq!(require_positive("premium", 1), Ok(1));
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert_eq!(
            require_positive("premium", 0),
            Err(ValidationError::NotPositive {
                field: "premium",
                value: 0
            })
        );
        assert!(require_positive("coverage", -5).is_err());
    }

    #[test]
    fn text_rejects_whitespace() {
        assert_eq!(
            require_text("name", "  \t\n"),
            Err(ValidationError::Empty { field: "name" })
        );
        assert!(require_text("name", "").is_err());
    }

    #[test]
    fn text_is_returned_untrimmed() {
        assert_eq!(require_text("description", " flood "), Ok(" flood "));
    }

    #[test]
    fn messages_name_the_field() {
        let e = require_positive("pool_id", -1).unwrap_err();
        assert_eq!(e.to_string(), "pool_id must be a positive integer, got -1");
    }
}
