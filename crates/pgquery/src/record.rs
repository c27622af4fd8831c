//! Mapping structs to tables.
//!
//! A [`Record`] is a struct mapped to one table, normally through
//! `#[derive(Record)]`. The trait carries the table schema, turns a record
//! into assignment [`Queries`] and rebuilds records from rows. [`Db`] gains
//! table-level operations for any record type:
//!
//! ```ignore
//! use pgquery::{Db, Queries, Record};
//!
//! #[derive(Debug, Default, Record)]
//! struct Person {
//!     #[sql(key)]
//!     id: String,
//!     #[sql(index)]
//!     name: String,
//!     age: i32,
//! }
//!
//! db.create_table::<Person>().await?;
//! db.insert(&Person { id: "abcd1235".into(), name: "Doe".into(), age: 18 }).await?;
//! let adults: Vec<Person> = db.find_all(&Queries::new().add("age", [18])).await?;
//! ```

use crate::db::Db;
use crate::error::{OrmError, OrmResult};
use crate::queries::Queries;
use crate::row::FromRow;
use crate::statement::{
    DeleteStatement, InsertStatement, SelectStatement, Statement, UpdateStatement,
};
use crate::value::Value;
use tokio_postgres::Row;

/// A struct mapped to a single table.
pub trait Record: FromRow {
    /// Table name.
    const TABLE: &'static str;

    /// Selected columns, in field order.
    fn columns() -> &'static [&'static str];

    /// Column definitions used by `CREATE TABLE`.
    fn schema() -> Vec<ColumnDef>;

    /// Primary key column, if any.
    fn key_column() -> Option<&'static str>;

    /// Column type of the primary key, if any.
    fn key_sql_type() -> Option<&'static str>;

    /// Primary key value, `Value::Null` for keyless records.
    fn key_value(&self) -> Value;

    /// Build a record holding only its key, other fields defaulted.
    fn with_key(key: Value) -> OrmResult<Self>;

    /// Every column of the record as an assignment entry.
    fn to_queries(&self) -> Queries;
}

/// A field referencing another record through its key.
///
/// Implemented for `Option<T>`. A record referencing its own table uses
/// `Option<Box<T>>`, which works because `Box<T>` is itself a record.
pub trait Reference: Sized {
    type Target: Record;

    fn target(&self) -> Option<&Self::Target>;

    fn from_target(target: Option<Self::Target>) -> Self;
}

impl<T: Record> Reference for Option<T> {
    type Target = T;

    fn target(&self) -> Option<&T> {
        self.as_ref()
    }

    fn from_target(target: Option<T>) -> Self {
        target
    }
}

impl<T: FromRow> FromRow for Box<T> {
    fn from_row(row: &Row) -> OrmResult<Self> {
        T::from_row(row).map(Box::new)
    }
}

impl<T: Record> Record for Box<T> {
    const TABLE: &'static str = T::TABLE;

    fn columns() -> &'static [&'static str] {
        T::columns()
    }

    fn schema() -> Vec<ColumnDef> {
        T::schema()
    }

    fn key_column() -> Option<&'static str> {
        T::key_column()
    }

    fn key_sql_type() -> Option<&'static str> {
        T::key_sql_type()
    }

    fn key_value(&self) -> Value {
        (**self).key_value()
    }

    fn with_key(key: Value) -> OrmResult<Self> {
        T::with_key(key).map(Box::new)
    }

    fn to_queries(&self) -> Queries {
        (**self).to_queries()
    }
}

/// Key of the referenced record, NULL when there is none.
pub fn reference_key<R: Reference>(field: &R) -> Value {
    field.target().map_or(Value::Null, Record::key_value)
}

/// Rebuild a reference from a stored key.
pub fn load_reference<R: Reference>(key: Value) -> OrmResult<R> {
    if key.is_null() {
        return Ok(R::from_target(None));
    }
    <R::Target as Record>::with_key(key).map(|target| R::from_target(Some(target)))
}

/// One column of a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    /// `None` when a reference could not be resolved to a key type.
    pub sql_type: Option<&'static str>,
    pub primary_key: bool,
    pub index: bool,
    /// Referenced `(table, column)`.
    pub references: Option<(&'static str, &'static str)>,
}

impl ColumnDef {
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self {
            name,
            sql_type: Some(sql_type),
            primary_key: false,
            index: false,
            references: None,
        }
    }

    /// A column holding the key of `T`, typed after that key.
    ///
    /// `key` must name the primary key of `T`; otherwise the type stays
    /// unresolved unless overridden with [`ColumnDef::sql_type`].
    pub fn foreign<T: Record>(name: &'static str, key: &'static str) -> Self {
        let sql_type = match T::key_column() {
            Some(column) if column.eq_ignore_ascii_case(key) => T::key_sql_type(),
            _ => None,
        };
        Self {
            name,
            sql_type,
            primary_key: false,
            index: false,
            references: Some((T::TABLE, key)),
        }
    }

    pub const fn sql_type(mut self, sql_type: &'static str) -> Self {
        self.sql_type = Some(sql_type);
        self
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn index(mut self) -> Self {
        self.index = true;
        self
    }

    /// Render as it appears inside `CREATE TABLE (...)`.
    pub fn definition(&self) -> OrmResult<String> {
        let sql_type = self.sql_type.ok_or_else(|| OrmError::UnsupportedType {
            column: self.name.to_string(),
            ty: match self.references {
                Some((table, column)) => format!("reference to {table}({column}) is not a key"),
                None => "unknown".to_string(),
            },
        })?;

        let mut definition = format!("{} {}", self.name, sql_type);
        if self.primary_key {
            definition.push_str(" PRIMARY KEY");
        }
        if let Some((table, column)) = self.references {
            definition.push_str(&format!(" REFERENCES {table}({column})"));
        }
        Ok(definition)
    }
}

/// `CREATE TABLE` statement for `R`.
pub fn create_table_sql<R: Record>() -> OrmResult<String> {
    let definitions = R::schema()
        .iter()
        .map(ColumnDef::definition)
        .collect::<OrmResult<Vec<_>>>()?;
    Ok(format!(
        "CREATE TABLE {} ({})",
        R::TABLE,
        definitions.join(", ")
    ))
}

/// One `CREATE INDEX` statement per indexed column of `R`.
pub fn create_index_sql<R: Record>() -> Vec<String> {
    R::schema()
        .iter()
        .filter(|column| column.index)
        .map(|column| {
            format!(
                "CREATE INDEX {table}_{column}_idx ON {table} ({column})",
                table = R::TABLE,
                column = column.name
            )
        })
        .collect()
}

pub fn drop_table_sql<R: Record>() -> String {
    format!("DROP TABLE {}", R::TABLE)
}

impl Db {
    /// Create the table of `R` and its indexes.
    pub async fn create_table<R: Record>(&self) -> OrmResult<()> {
        let sql = create_table_sql::<R>()?;
        tracing::debug!(parent: self.span(), table = R::TABLE, "creating table");
        self.execute(&sql, &[]).await?;
        for sql in create_index_sql::<R>() {
            self.execute(&sql, &[]).await?;
        }
        Ok(())
    }

    /// Drop the table of `R`.
    pub async fn drop_table<R: Record>(&self) -> OrmResult<()> {
        tracing::debug!(parent: self.span(), table = R::TABLE, "dropping table");
        self.execute(&drop_table_sql::<R>(), &[]).await?;
        Ok(())
    }

    /// Insert one record.
    pub async fn insert<R: Record>(&self, record: &R) -> OrmResult<u64> {
        let (sql, params) =
            InsertStatement::default()
                .with(self)
                .build(R::TABLE, &[], &record.to_queries());
        if sql.is_empty() {
            return Err(OrmError::EmptyStatement("INSERT"));
        }
        self.execute(&sql, &params).await
    }

    /// All records matching the filters.
    pub async fn find_all<R: Record>(&self, queries: &Queries) -> OrmResult<Vec<R>> {
        let (sql, params) =
            SelectStatement::default()
                .with(self)
                .build(R::TABLE, R::columns(), queries);
        let rows = self.query(&sql, &params).await?;
        tracing::debug!(parent: self.span(), table = R::TABLE, found = rows.len(), "find_all");
        rows.iter().map(R::from_row).collect()
    }

    /// The first record matching the filters.
    pub async fn find<R: Record>(&self, queries: &Queries) -> OrmResult<R> {
        self.find_all(queries)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| OrmError::not_found(format!("no {} row matches", R::TABLE)))
    }

    /// Apply the assignments in `queries` to every matching row.
    ///
    /// Fails with [`OrmError::EmptyStatement`] when `queries` holds no filter
    /// or no assignment.
    pub async fn update_all<R: Record>(&self, queries: &Queries) -> OrmResult<u64> {
        let (sql, params) =
            UpdateStatement::default()
                .with(self)
                .build(R::TABLE, R::columns(), queries);
        if sql.is_empty() {
            return Err(OrmError::EmptyStatement("UPDATE"));
        }
        self.execute(&sql, &params).await
    }

    /// Write every column of `record` to the row sharing its key.
    pub async fn update<R: Record>(&self, record: &R) -> OrmResult<u64> {
        let key = R::key_column().ok_or_else(|| {
            OrmError::Other(format!("{} has no key column to update by", R::TABLE))
        })?;
        let queries = record.to_queries().add(key, [record.key_value()]);
        self.update_all::<R>(&queries).await
    }

    /// Delete every matching row. Without filters the whole table is emptied.
    pub async fn delete_all<R: Record>(&self, queries: &Queries) -> OrmResult<u64> {
        let (sql, params) =
            DeleteStatement::default()
                .with(self)
                .build(R::TABLE, R::columns(), queries);
        self.execute(&sql, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::RowExt;

    #[derive(Debug, Default, PartialEq)]
    struct Manager {
        id: i64,
        name: String,
    }

    impl FromRow for Manager {
        fn from_row(row: &Row) -> OrmResult<Self> {
            Ok(Self {
                id: row.try_get_column("id")?,
                name: row.try_get_column("name")?,
            })
        }
    }

    impl Record for Manager {
        const TABLE: &'static str = "manager";

        fn columns() -> &'static [&'static str] {
            &["id", "name"]
        }

        fn schema() -> Vec<ColumnDef> {
            vec![
                ColumnDef::new("id", "BIGINT").primary_key(),
                ColumnDef::new("name", "VARCHAR(60)").index(),
            ]
        }

        fn key_column() -> Option<&'static str> {
            Some("id")
        }

        fn key_sql_type() -> Option<&'static str> {
            Some("BIGINT")
        }

        fn key_value(&self) -> Value {
            Value::from(self.id)
        }

        fn with_key(key: Value) -> OrmResult<Self> {
            let id = crate::value::FromValue::from_value(key)
                .map_err(|e| OrmError::decode("id", e.to_string()))?;
            Ok(Self {
                id,
                ..Default::default()
            })
        }

        fn to_queries(&self) -> Queries {
            Queries::new()
                .set("id", self.id)
                .set("name", &self.name)
        }
    }

    #[test]
    fn test_create_table_sql() {
        assert_eq!(
            create_table_sql::<Manager>().unwrap(),
            "CREATE TABLE manager (id BIGINT PRIMARY KEY, name VARCHAR(60))"
        );
        assert_eq!(drop_table_sql::<Manager>(), "DROP TABLE manager");
    }

    #[test]
    fn test_create_index_sql() {
        assert_eq!(
            create_index_sql::<Manager>(),
            vec!["CREATE INDEX manager_name_idx ON manager (name)".to_string()]
        );
    }

    #[test]
    fn test_foreign_column_takes_key_type() {
        let column = ColumnDef::foreign::<Manager>("manager_id", "id");
        assert_eq!(
            column.definition().unwrap(),
            "manager_id BIGINT REFERENCES manager(id)"
        );
    }

    #[test]
    fn test_foreign_column_type_override() {
        let column = ColumnDef::foreign::<Manager>("manager_id", "id").sql_type("INT8");
        assert_eq!(
            column.definition().unwrap(),
            "manager_id INT8 REFERENCES manager(id)"
        );
    }

    #[test]
    fn test_foreign_column_on_non_key_is_unsupported() {
        let err = ColumnDef::foreign::<Manager>("manager_name", "name")
            .definition()
            .unwrap_err();
        assert!(matches!(err, OrmError::UnsupportedType { ref column, .. } if column == "manager_name"));
    }

    #[test]
    fn test_reference_key_and_load() {
        let boss: Option<Manager> = Some(Manager {
            id: 7,
            name: "Doe".into(),
        });
        assert_eq!(reference_key(&boss), Value::Int(7));
        assert_eq!(reference_key(&None::<Manager>), Value::Null);

        let loaded: Option<Manager> = load_reference(Value::Int(7)).unwrap();
        assert_eq!(loaded, Some(Manager { id: 7, name: String::new() }));

        let boxed: Option<Box<Manager>> = load_reference(Value::Null).unwrap();
        assert!(boxed.is_none());
    }

    #[test]
    fn test_load_reference_with_bad_key() {
        let err = load_reference::<Option<Manager>>(Value::Bool(true)).unwrap_err();
        assert!(matches!(err, OrmError::Decode { .. }));
    }

    #[test]
    fn test_to_queries_are_assignments() {
        let manager = Manager {
            id: 1,
            name: "Doe".into(),
        };
        let queries = manager.to_queries();
        assert_eq!(queries.assignments().count(), 2);
        let (sql, params) = InsertStatement::default().build(Manager::TABLE, &[], &queries);
        assert_eq!(sql, "INSERT INTO manager (id, name) VALUES ($1, $2)");
        assert_eq!(params, vec![Value::Int(1), Value::from("Doe")]);
    }
}
