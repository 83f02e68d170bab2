//! Identifier patterns shared by the clause constructors.
//!
//! Column references, field names and aliases are emitted into SQL verbatim,
//! so these patterns are the injection boundary for those channels.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RuleError, RuleResult};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

static DOTTED_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("valid dotted regex"));

/// `[A-Za-z_][A-Za-z0-9_]*`: aliases, function names, parameter names.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// `[A-Za-z_][A-Za-z0-9_.]*`: plain or qualified column names (`t.amount`).
pub fn is_dotted_identifier(s: &str) -> bool {
    DOTTED_IDENTIFIER.is_match(s)
}

/// Column reference accepted as a function argument: a dotted name, `*`, or `t.*`.
pub fn is_column_reference(s: &str) -> bool {
    if s == "*" {
        return true;
    }
    match s.strip_suffix(".*") {
        Some(qualifier) => is_dotted_identifier(qualifier),
        None => is_dotted_identifier(s),
    }
}

/// Check an optional alias.
pub fn check_alias(alias: Option<&str>) -> RuleResult<()> {
    match alias {
        Some(a) if !is_identifier(a) => Err(RuleError::structural(format!("Invalid alias: {}", a))),
        _ => Ok(()),
    }
}

/// Check a table name (schema-qualified names are allowed).
pub fn check_table_name(name: &str) -> RuleResult<()> {
    if name.trim().is_empty() {
        return Err(RuleError::structural("Table name cannot be empty"));
    }
    if !is_dotted_identifier(name) {
        return Err(RuleError::structural(format!("Invalid table name: {}", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("user_id"));
        assert!(is_identifier("_tmp1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("my alias"));
        assert!(!is_identifier("t.id"));
    }

    #[test]
    fn test_dotted_identifiers() {
        assert!(is_dotted_identifier("t.amount"));
        assert!(is_dotted_identifier("public.users.id"));
        assert!(!is_dotted_identifier("amount; DROP TABLE users"));
        assert!(!is_dotted_identifier("SUM(amount)"));
    }

    #[test]
    fn test_column_references() {
        assert!(is_column_reference("*"));
        assert!(is_column_reference("o.*"));
        assert!(is_column_reference("o.id"));
        assert!(!is_column_reference("PURCHASE order"));
        assert!(!is_column_reference(".*"));
    }

    #[test]
    fn test_check_alias() {
        assert!(check_alias(None).is_ok());
        assert!(check_alias(Some("total")).is_ok());
        assert!(check_alias(Some("my alias")).is_err());
    }

    #[test]
    fn test_check_table_name() {
        assert!(check_table_name("public.users").is_ok());
        assert_eq!(
            check_table_name("   ").unwrap_err(),
            RuleError::structural("Table name cannot be empty")
        );
        assert!(check_table_name("users; DROP TABLE x").is_err());
    }
}
