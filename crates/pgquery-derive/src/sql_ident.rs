use std::collections::HashSet;

use proc_macro2::Span;
use syn::{Error, LitStr, Result};

pub(crate) fn is_valid_sql_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn parse_sql_ident(lit: &LitStr, what: &str) -> Result<String> {
    check_sql_ident(lit.value().trim(), lit.span(), what)
}

pub(crate) fn check_sql_ident(s: &str, span: Span, what: &str) -> Result<String> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::new(span, format!("{what} must not be empty")));
    }
    if !is_valid_sql_ident(s) {
        return Err(Error::new(
            span,
            format!("{what} must be a valid SQL identifier (expected [A-Za-z_][A-Za-z0-9_]*)"),
        ));
    }
    Ok(s.to_string())
}

/// Reject two fields mapped to the same column.
pub(crate) fn check_unique_columns<'a>(
    columns: impl IntoIterator<Item = (&'a str, Span)>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for (column, span) in columns {
        if !seen.insert(column) {
            return Err(Error::new(
                span,
                format!("column '{column}' is mapped by more than one field"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_sql_ident() {
        assert!(is_valid_sql_ident("manager_id"));
        assert!(is_valid_sql_ident("_tmp1"));
        assert!(!is_valid_sql_ident("1st"));
        assert!(!is_valid_sql_ident("drop table"));
        assert!(!is_valid_sql_ident(""));
    }

    #[test]
    fn test_check_unique_columns() {
        let span = Span::call_site();
        assert!(check_unique_columns([("id", span), ("name", span)]).is_ok());
        assert!(check_unique_columns([("id", span), ("id", span)]).is_err());
    }
}
