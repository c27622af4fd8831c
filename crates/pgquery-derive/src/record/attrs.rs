//! Attribute parsing for Record derive macro.
//!
//! Handles struct-level and field-level `#[sql(...)]` attributes.

use heck::ToSnakeCase;
use syn::ext::IdentExt;
use syn::{DeriveInput, LitStr, Result};

use crate::sql_ident::{check_sql_ident, parse_sql_ident};

/// Struct-level `#[sql(table = "...")]`.
#[derive(Default)]
pub(super) struct StructAttrs {
    pub(super) table: Option<String>,
}

impl syn::parse::Parse for StructAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = StructAttrs::default();

        loop {
            if input.is_empty() {
                break;
            }

            let ident = syn::Ident::parse_any(input)?;
            let _: syn::Token![=] = input.parse()?;
            let value: LitStr = input.parse()?;

            match ident.to_string().as_str() {
                "table" => attrs.table = Some(parse_sql_ident(&value, "table")?),
                other => {
                    return Err(syn::Error::new_spanned(
                        &ident,
                        format!("unknown struct attribute `{other}`, expected `table`"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attrs)
    }
}

/// Table name: `#[sql(table = "...")]`, or the struct name in snake_case.
pub(super) fn table_name(input: &DeriveInput) -> Result<String> {
    for attr in &input.attrs {
        if attr.path().is_ident("sql") {
            if let Some(table) = attr.parse_args::<StructAttrs>()?.table {
                return Ok(table);
            }
        }
    }
    let table = input.ident.unraw().to_string().to_snake_case();
    check_sql_ident(&table, input.ident.span(), "table")
}

/// Field-level `#[sql(...)]` options.
#[derive(Default)]
pub(super) struct FieldAttrs {
    pub(super) key: bool,
    pub(super) index: bool,
    pub(super) skip: bool,
    pub(super) column: Option<String>,
    /// Uppercased column type override
    pub(super) sql_type: Option<String>,
    /// Referenced key column, lowercased
    pub(super) foreign: Option<String>,
}

impl syn::parse::Parse for FieldAttrs {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attrs = FieldAttrs::default();

        loop {
            if input.is_empty() {
                break;
            }

            // `type` is a keyword
            let ident = syn::Ident::parse_any(input)?;
            let key = ident.to_string();

            if input.peek(syn::Token![=]) {
                let _: syn::Token![=] = input.parse()?;
                let value: LitStr = input.parse()?;

                match key.as_str() {
                    "column" => attrs.column = Some(parse_sql_ident(&value, "column")?),
                    "type" => {
                        let ty = value.value().trim().to_uppercase();
                        if ty.is_empty() {
                            return Err(syn::Error::new(value.span(), "type must not be empty"));
                        }
                        attrs.sql_type = Some(ty);
                    }
                    "foreign" => {
                        attrs.foreign = Some(parse_sql_ident(&value, "foreign")?.to_lowercase());
                    }
                    _ => {
                        return Err(syn::Error::new_spanned(
                            &ident,
                            format!("unknown field attribute `{key} = ...`"),
                        ));
                    }
                }
            } else {
                match key.as_str() {
                    "key" => attrs.key = true,
                    "index" => attrs.index = true,
                    "skip" | "ignore" => attrs.skip = true,
                    _ => {
                        return Err(syn::Error::new_spanned(
                            &ident,
                            format!("unknown field attribute `{key}`"),
                        ));
                    }
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attrs)
    }
}

impl FieldAttrs {
    /// Collect every `#[sql(...)]` on a field; later attributes win.
    pub(super) fn from_field(field: &syn::Field) -> Result<Self> {
        let mut attrs = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("sql") {
                continue;
            }
            let parsed: FieldAttrs = attr.parse_args()?;
            attrs.key |= parsed.key;
            attrs.index |= parsed.index;
            attrs.skip |= parsed.skip;
            if parsed.column.is_some() {
                attrs.column = parsed.column;
            }
            if parsed.sql_type.is_some() {
                attrs.sql_type = parsed.sql_type;
            }
            if parsed.foreign.is_some() {
                attrs.foreign = parsed.foreign;
            }
        }
        Ok(attrs)
    }
}
