//! Allow-list validation for identifiers embedded in generated SQL.
//!
//! Table and column names cannot travel as bind parameters, so they are
//! validated here before any statement is built. Data values are never
//! validated this way; they must be bound, not interpolated.

use crate::errors::{Result, SplitError};

const MAX_IDENTIFIER_LEN: usize = 63;

/// Validates a table or column name against the allow-list
/// (`[A-Za-z_][A-Za-z0-9_]*`, at most 63 bytes).
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_IDENTIFIER_LEN {
        return Err(SplitError::Schema(format!(
            "invalid identifier '{name}': must be 1-{MAX_IDENTIFIER_LEN} bytes"
        )));
    }
    let mut chars = name.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_') {
        return Err(SplitError::Schema(format!(
            "invalid identifier '{name}': must start with a letter or underscore"
        )));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SplitError::Schema(format!(
            "invalid identifier '{name}': only letters, digits and underscores are allowed"
        )));
    }
    Ok(())
}

/// Validates and double-quotes an identifier for use in a statement.
pub fn quote_identifier(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{name}\""))
}

/// Validates a bulk-load CSV delimiter: one printable ASCII character
/// that cannot break out of the quoted literal it lands in.
pub fn validate_delimiter(delimiter: &str) -> Result<char> {
    let mut chars = delimiter.chars();
    let c = chars
        .next()
        .ok_or_else(|| SplitError::Validation("delimiter must not be empty".to_string()))?;
    if chars.next().is_some() {
        return Err(SplitError::Validation(
            "delimiter must be a single character".to_string(),
        ));
    }
    if !c.is_ascii() || c.is_ascii_control() || matches!(c, '\'' | '"' | '\\') {
        return Err(SplitError::Validation(format!(
            "unsupported delimiter {c:?}"
        )));
    }
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_identifiers() {
        assert!(validate_identifier("iris").is_ok());
        assert!(validate_identifier("_internal").is_ok());
        assert!(validate_identifier("sepal_length_2").is_ok());
    }

    #[test]
    fn test_rejects_injection_attempts() {
        assert!(validate_identifier("t; DROP TABLE users").is_err());
        assert!(validate_identifier("a\"b").is_err());
        assert!(validate_identifier("1starts_with_digit").is_err());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier(&"x".repeat(64)).is_err());
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("species").unwrap(), "\"species\"");
        assert!(quote_identifier("bad name").is_err());
    }

    #[test]
    fn test_delimiter_allow_list() {
        assert_eq!(validate_delimiter(",").unwrap(), ',');
        assert_eq!(validate_delimiter(";").unwrap(), ';');
        assert!(validate_delimiter("").is_err());
        assert!(validate_delimiter(",,").is_err());
        assert!(validate_delimiter("'").is_err());
        assert!(validate_delimiter("\\").is_err());
        assert!(validate_delimiter("\n").is_err());
    }
}
