//! UPDATE statement builder.

use super::{Binding, Statement};
use crate::db::Db;
use crate::queries::Queries;
use crate::value::Value;

/// Builds `UPDATE table SET a = $2 WHERE c = $1`.
///
/// Filters come first in the parameter list and assignments continue the
/// numbering. Without a filter, or without any assignment, the builder
/// returns an empty statement and no parameters.
#[derive(Debug, Clone, Default)]
pub struct UpdateStatement {
    binding: Binding,
}

impl Statement for UpdateStatement {
    fn with(&self, db: &Db) -> Self {
        Self {
            binding: Binding::bind(db, "update"),
        }
    }

    fn build(&self, table: &str, _columns: &[&str], queries: &Queries) -> (String, Vec<Value>) {
        let (where_sql, mut params) = queries.where_clause();
        if where_sql.is_empty() {
            tracing::debug!(table, "refusing to build UPDATE without a filter");
            return (String::new(), Vec::new());
        }

        let mut assignments = Vec::new();
        for (column, query) in queries.assignments() {
            let Some(value) = query.values().first() else {
                continue;
            };
            params.push(value.clone());
            assignments.push(format!("{} = ${}", column.name(), params.len()));
        }

        if assignments.is_empty() {
            tracing::debug!(table, "refusing to build UPDATE without assignments");
            return (String::new(), Vec::new());
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            table,
            assignments.join(", "),
            where_sql
        );
        self.binding.trace(&sql, &params);
        (sql, params)
    }
}
