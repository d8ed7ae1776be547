//! SQL identifier quoting and validation
//!
//! Table names come from configuration, so they are validated once when the
//! store is created and always quoted when interpolated into SQL.

use std::sync::LazyLock;

use regex::Regex;

/// PostgreSQL identifiers longer than this are silently truncated
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Reserved keywords rejected as table names
pub const RESERVED_WORDS: &[&str] = &[
    "ALL", "AND", "ANY", "ARRAY", "AS", "ASC", "CASE", "CAST", "CHECK", "COLUMN", "CONSTRAINT",
    "CREATE", "DEFAULT", "DESC", "DISTINCT", "ELSE", "END", "EXCEPT", "FALSE", "FETCH", "FOR",
    "FOREIGN", "FROM", "GRANT", "GROUP", "HAVING", "IN", "INTERSECT", "INTO", "JOIN", "LIMIT",
    "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER", "PRIMARY", "REFERENCES", "SELECT", "TABLE",
    "THEN", "TO", "TRUE", "UNION", "UNIQUE", "USER", "USING", "WHEN", "WHERE", "WITH",
];

static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*$").expect("identifier pattern is a valid regex")
});

/// Quote a SQL identifier, doubling any embedded quotes
///
/// ```
/// use member_query::sql::quote_identifier;
///
/// assert_eq!(quote_identifier("members"), "\"members\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Validate a configurable table name
///
/// Must start with a lowercase letter, contain only lowercase letters,
/// digits and underscores, fit in a PostgreSQL identifier, and not be a
/// reserved word.
///
/// ```
/// use member_query::sql::validate_identifier;
///
/// assert!(validate_identifier("members").is_ok());
/// assert!(validate_identifier("select").is_err());
/// ```
pub fn validate_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Identifier cannot be empty".to_string());
    }

    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(format!(
            "Identifier '{}' is longer than {} characters",
            name, MAX_IDENTIFIER_LEN
        ));
    }

    if !IDENTIFIER_PATTERN.is_match(name) {
        return Err(format!(
            "Identifier '{}' is invalid. Must start with a lowercase letter and contain only lowercase letters, numbers, and underscores.",
            name
        ));
    }

    if RESERVED_WORDS.contains(&name.to_uppercase().as_str()) {
        return Err(format!(
            "Identifier '{}' is a reserved keyword and cannot be used.",
            name
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("teams"), "\"teams\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
        assert_eq!(quote_identifier(""), "\"\"");
    }

    #[test]
    fn test_validate_identifier_valid() {
        assert!(validate_identifier("members").is_ok());
        assert!(validate_identifier("test_ab12_members").is_ok());
        assert!(validate_identifier("t1").is_ok());
    }

    #[test]
    fn test_validate_identifier_empty() {
        let result = validate_identifier("");
        assert!(result.unwrap_err().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_identifier_bad_characters() {
        assert!(validate_identifier("1members").is_err());
        assert!(validate_identifier("_members").is_err());
        assert!(validate_identifier("Members").is_err());
        assert!(validate_identifier("my-members").is_err());
        assert!(validate_identifier("public.members").is_err());
        assert!(validate_identifier("members; drop").is_err());
    }

    #[test]
    fn test_validate_identifier_too_long() {
        let name = "m".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(validate_identifier(&name).unwrap_err().contains("longer than"));
        assert!(validate_identifier(&"m".repeat(MAX_IDENTIFIER_LEN)).is_ok());
    }

    #[test]
    fn test_validate_identifier_reserved() {
        for word in ["select", "user", "order", "group", "table"] {
            let result = validate_identifier(word);
            assert!(result.unwrap_err().contains("reserved keyword"));
        }
    }
}
