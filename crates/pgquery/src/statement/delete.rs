//! DELETE statement builder.

use super::{Binding, Statement};
use crate::db::Db;
use crate::queries::Queries;
use crate::value::Value;

/// Builds `DELETE FROM table [WHERE ...]`.
///
/// An empty predicate set deletes every row; this builder does not guard
/// against it.
#[derive(Debug, Clone, Default)]
pub struct DeleteStatement {
    binding: Binding,
}

impl Statement for DeleteStatement {
    fn with(&self, db: &Db) -> Self {
        Self {
            binding: Binding::bind(db, "delete"),
        }
    }

    fn build(&self, table: &str, _columns: &[&str], queries: &Queries) -> (String, Vec<Value>) {
        let (where_sql, params) = queries.where_clause();

        let mut sql = format!("DELETE FROM {}", table);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        self.binding.trace(&sql, &params);
        (sql, params)
    }
}
