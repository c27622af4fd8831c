//! Statement builders turning a table, a column list and [`Queries`] into SQL.
//!
//! Every builder emits `$n` placeholders and returns the parameters in
//! placeholder order:
//!
//! ```ignore
//! use pgquery::{Operator, Queries, SelectStatement, Statement};
//!
//! let queries = Queries::new()
//!     .add("id", ["abcd1235"])
//!     .add_with("age", Operator::Greater, [18]);
//! let (sql, params) = SelectStatement::default().build("person", &["id", "name", "age"], &queries);
//! assert_eq!(sql, "SELECT id, name, age FROM person WHERE id = $1 AND age > $2");
//! ```
//!
//! Builders never fail. Malformed predicates are dropped, and UPDATE refuses
//! to build (returns an empty statement) without a filter.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::DeleteStatement;
pub use insert::InsertStatement;
pub use select::SelectStatement;
pub use update::UpdateStatement;

use crate::db::Db;
use crate::queries::Queries;
use crate::value::Value;
use tracing::Span;

/// Something that can be built into a statement string with its parameters.
pub trait Statement: Sized {
    /// Bind the builder to a database handle; SQL traces are emitted under its span.
    fn with(&self, db: &Db) -> Self;

    /// Build the SQL text and its positional parameters.
    fn build(&self, table: &str, columns: &[&str], queries: &Queries) -> (String, Vec<Value>);
}

/// Tracing context shared by the builders.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    span: Span,
}

impl Default for Binding {
    fn default() -> Self {
        Self { span: Span::none() }
    }
}

impl Binding {
    pub(crate) fn bind(db: &Db, kind: &'static str) -> Self {
        Self {
            span: tracing::debug_span!(parent: db.span(), "statement", kind),
        }
    }

    pub(crate) fn trace(&self, sql: &str, params: &[Value]) {
        self.span.in_scope(|| {
            tracing::trace!(
                target: "pgquery.sql",
                sql = %sql,
                param_count = params.len(),
                "built statement"
            );
        });
    }
}
