//! Row mapping traits and utilities

use crate::error::{OrmError, OrmResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tokio_postgres::Row;
use uuid::Uuid;

/// Trait that maps Rust field types to PostgreSQL column types.
///
/// Used by `#[derive(Record)]` when generating `CREATE TABLE` statements.
/// A field whose type has no implementation must carry `#[sql(type = "...")]`.
pub trait SqlType {
    /// Column type used in `CREATE TABLE`
    const SQL_TYPE: &'static str;
}

macro_rules! impl_sql_type {
    ($($ty:ty => $sql:literal),* $(,)?) => {
        $(
            impl SqlType for $ty {
                const SQL_TYPE: &'static str = $sql;
            }
        )*
    };
}

impl_sql_type! {
    String => "VARCHAR(80)",
    &str => "VARCHAR(80)",
    bool => "BOOL",
    i16 => "SMALLINT",
    i32 => "INT",
    i64 => "BIGINT",
    f32 => "FLOAT4",
    f64 => "FLOAT8",
    Vec<u8> => "BYTEA",
    Uuid => "UUID",
    DateTime<Utc> => "TIMESTAMPTZ",
    NaiveDateTime => "TIMESTAMP",
    NaiveDate => "DATE",
    serde_json::Value => "JSONB",
}

// Option<T> delegates to inner type
impl<T: SqlType> SqlType for Option<T> {
    const SQL_TYPE: &'static str = T::SQL_TYPE;
}

/// Trait for converting a database row into a Rust struct.
///
/// Usually implemented by `#[derive(Record)]`.
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> OrmResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning OrmError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| OrmError::decode(column, e.to_string()))
    }
}
