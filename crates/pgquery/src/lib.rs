//! # pgquery
//!
//! Predicate sets and SQL statement builders for PostgreSQL, with a small
//! struct-to-table mapping layer on top.
//!
//! ## Features
//!
//! - **Predicate sets**: `Queries` collects column filters and assignments,
//!   built by hand or parsed from a URL query string
//! - **Statement builders**: SELECT / INSERT / UPDATE / DELETE with `$n`
//!   placeholders and parameters in placeholder order
//! - **Safe defaults**: UPDATE refuses to build without a filter
//! - **Record mapping**: `#[derive(Record)]` maps a struct to a table
//! - **Tracing**: every built statement and execution is logged under the
//!   database handle's span
//!
//! ## Statements
//!
//! ```ignore
//! use pgquery::{Operator, Queries, SelectStatement, Statement, UpdateStatement};
//!
//! // From a request URL: ?id=abcd1235&name=Doe
//! let queries = Queries::from_query_str("id=abcd1235&name=Doe");
//! let (sql, params) = SelectStatement::default().build("person", &["id", "name"], &queries);
//! // SELECT id, name FROM person WHERE id = $1 AND name = $2
//!
//! let queries = Queries::new()
//!     .add_with("age", Operator::Between, [18, 65])
//!     .set("retired", false);
//! let (sql, params) = UpdateStatement::default().build("person", &[], &queries);
//! // UPDATE person SET retired = $3 WHERE age BETWEEN $1 AND $2
//! ```
//!
//! ## Records
//!
//! ```ignore
//! use pgquery::{Db, DbConfig, Queries, Record};
//!
//! #[derive(Debug, Default, Record)]
//! struct Person {
//!     #[sql(key)]
//!     id: String,
//!     name: String,
//! }
//!
//! let db = Db::connect(&DbConfig::from_env()?)?;
//! db.create_table::<Person>().await?;
//! let person: Person = db.find(&Queries::new().add("id", ["abcd1235"])).await?;
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod operator;
pub mod pool;
pub mod prelude;
pub mod queries;
pub mod record;
pub mod row;
pub mod statement;
pub mod value;

pub use config::DbConfig;
pub use db::Db;
pub use error::{OrmError, OrmResult};
pub use operator::Operator;
pub use pool::{create_pool, create_pool_with_config};
pub use queries::{Column, Queries, Query, Role};
pub use record::{ColumnDef, Record, Reference};
pub use row::{FromRow, RowExt, SqlType};
pub use statement::{
    DeleteStatement, InsertStatement, SelectStatement, Statement, UpdateStatement,
};
pub use value::{FromValue, Value, ValueError};

#[cfg(feature = "derive")]
pub use pgquery_derive::Record;

// Re-exported for generated code
pub use tokio_postgres;
pub use url;
