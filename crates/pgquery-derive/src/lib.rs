//! Derive macros for pgquery
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod record;
mod sql_ident;

/// Derive `FromRow` and `Record` for a struct, mapping it to one table.
///
/// # Example
///
/// ```ignore
/// use pgquery::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct Manager {
///     #[sql(key)]
///     id: uuid::Uuid,
///     #[sql(index, type = "varchar(60)")]
///     name: String,
/// }
///
/// #[derive(Debug, Default, Record)]
/// #[sql(table = "employees")]
/// struct Employee {
///     #[sql(key)]
///     id: uuid::Uuid,
///     name: String,
///     #[sql(foreign = "id")]
///     manager: Option<Manager>,
///     #[sql(skip)]
///     scratch: Vec<u8>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[sql(table = "name")]` - Table name (default: struct name in snake_case,
///   so `HomeAddress` maps to `home_address`, not `homeaddress`)
/// - `#[sql(key)]` - Primary key
/// - `#[sql(index)]` - Create an index on the column
/// - `#[sql(skip)]` / `#[sql(ignore)]` - Not mapped; filled with `Default` when loading
/// - `#[sql(column = "name")]` - Map field to a different column name
/// - `#[sql(type = "varchar(60)")]` - Override the column type
/// - `#[sql(foreign = "id")]` - Reference another record by its key; the field
///   must be `Option<T>` or `Option<Box<T>>` and maps to column `<field>_<key>`
///
/// `with_key` fills every field but the key with `Default`, so records used
/// as references need `Default` field types.
#[proc_macro_derive(Record, attributes(sql))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
