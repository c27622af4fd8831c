//! Convenient imports for typical `pgquery` usage.
//!
//! ```ignore
//! use pgquery::prelude::*;
//! ```

pub use crate::{
    Db, DbConfig, FromRow, Operator, OrmError, OrmResult, Queries, Record, RowExt, Statement,
    Value,
};
pub use crate::{DeleteStatement, InsertStatement, SelectStatement, UpdateStatement};
