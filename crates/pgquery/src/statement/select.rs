//! SELECT statement builder.

use super::{Binding, Statement};
use crate::db::Db;
use crate::queries::Queries;
use crate::value::Value;

/// Builds `SELECT columns FROM table [WHERE ...]`.
///
/// An empty column list selects `*`.
#[derive(Debug, Clone, Default)]
pub struct SelectStatement {
    binding: Binding,
}

impl Statement for SelectStatement {
    fn with(&self, db: &Db) -> Self {
        Self {
            binding: Binding::bind(db, "select"),
        }
    }

    fn build(&self, table: &str, columns: &[&str], queries: &Queries) -> (String, Vec<Value>) {
        let columns = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        let (where_sql, params) = queries.where_clause();

        let mut sql = format!("SELECT {} FROM {}", columns, table);
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        self.binding.trace(&sql, &params);
        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;

    #[test]
    fn test_select_with_where() {
        let queries = Queries::new().add("id", ["abcd1235"]);
        let (sql, params) =
            SelectStatement::default().build("person", &["id", "name", "age"], &queries);
        assert_eq!(sql, "SELECT id, name, age FROM person WHERE id = $1");
        assert_eq!(params, vec![Value::from("abcd1235")]);
    }

    #[test]
    fn test_select_all() {
        let (sql, params) =
            SelectStatement::default().build("person", &["id", "name", "age"], &Queries::new());
        assert_eq!(sql, "SELECT id, name, age FROM person");
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_star_without_columns() {
        let queries = Queries::new().add_with("age", Operator::LesserOrEqual, [30]);
        let (sql, _) = SelectStatement::default().build("person", &[], &queries);
        assert_eq!(sql, "SELECT * FROM person WHERE age <= $1");
    }
}
