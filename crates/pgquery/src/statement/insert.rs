//! INSERT statement builder.

use super::{Binding, Statement};
use crate::db::Db;
use crate::queries::Queries;
use crate::value::Value;

/// Builds `INSERT INTO table (columns) VALUES ($1, ...)`.
///
/// Every entry of the predicate set contributes its column name and first
/// operand, whatever its operator or role. Entries without operands are
/// skipped so columns and placeholders stay aligned.
#[derive(Debug, Clone, Default)]
pub struct InsertStatement {
    binding: Binding,
}

impl Statement for InsertStatement {
    fn with(&self, db: &Db) -> Self {
        Self {
            binding: Binding::bind(db, "insert"),
        }
    }

    fn build(&self, table: &str, _columns: &[&str], queries: &Queries) -> (String, Vec<Value>) {
        let mut cols = Vec::new();
        let mut placeholders = Vec::new();
        let mut params = Vec::new();

        for (column, query) in queries {
            let Some(value) = query.values().first() else {
                continue;
            };
            params.push(value.clone());
            cols.push(column.name());
            placeholders.push(format!("${}", params.len()));
        }

        if cols.is_empty() {
            return (String::new(), Vec::new());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", ")
        );
        self.binding.trace(&sql, &params);
        (sql, params)
    }
}
