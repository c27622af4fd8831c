//! Record derive macro implementation
//!
//! ## Module Structure
//!
//! - `attrs`: Struct and field attribute parsing

mod attrs;

use attrs::{FieldAttrs, table_name};

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, Result};

use crate::common::syn_types::option_inner;
use crate::sql_ident::check_unique_columns;

/// The `#[sql(key)]` field.
struct KeyField<'a> {
    ident: syn::Ident,
    ty: &'a syn::Type,
    column: String,
    sql_type: TokenStream,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let table = table_name(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut columns: Vec<(String, Span)> = Vec::with_capacity(fields.len());
    let mut schema = Vec::with_capacity(fields.len());
    let mut extracts = Vec::with_capacity(fields.len());
    let mut assignments = Vec::with_capacity(fields.len());
    let mut field_idents = Vec::with_capacity(fields.len());
    let mut key: Option<KeyField> = None;

    for field in fields {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let ty = &field.ty;
        let attrs = FieldAttrs::from_field(field)?;
        field_idents.push(ident.clone());

        if attrs.skip {
            extracts.push(quote! { #ident: ::core::default::Default::default() });
            continue;
        }

        let field_name = ident.unraw().to_string();

        if let Some(foreign_key) = &attrs.foreign {
            if attrs.key {
                return Err(syn::Error::new_spanned(
                    field,
                    "a #[sql(foreign)] field cannot also be the key",
                ));
            }
            if option_inner(ty).is_none() {
                return Err(syn::Error::new_spanned(
                    ty,
                    "#[sql(foreign)] fields must be Option<T> or Option<Box<T>> where T: Record",
                ));
            }

            let column = attrs
                .column
                .clone()
                .unwrap_or_else(|| format!("{field_name}_{foreign_key}"));
            let mut def = quote! {
                ::pgquery::ColumnDef::foreign::<<#ty as ::pgquery::Reference>::Target>(#column, #foreign_key)
            };
            if let Some(sql_type) = &attrs.sql_type {
                def = quote! { #def.sql_type(#sql_type) };
            }
            if attrs.index {
                def = quote! { #def.index() };
            }

            schema.push(def);
            extracts.push(quote! {
                #ident: ::pgquery::record::load_reference(
                    row.try_get_column::<::pgquery::Value>(#column)?
                )?
            });
            assignments.push(quote! {
                .set(#column, ::pgquery::record::reference_key(&self.#ident))
            });
            columns.push((column, field.span()));
            continue;
        }

        let column = attrs.column.clone().unwrap_or(field_name);
        let sql_type = match &attrs.sql_type {
            Some(sql_type) => quote! { #sql_type },
            None => quote! { <#ty as ::pgquery::SqlType>::SQL_TYPE },
        };

        let mut def = quote! { ::pgquery::ColumnDef::new(#column, #sql_type) };
        if attrs.key {
            if key.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked #[sql(key)]",
                ));
            }
            def = quote! { #def.primary_key() };
            key = Some(KeyField {
                ident: ident.clone(),
                ty,
                column: column.clone(),
                sql_type: sql_type.clone(),
            });
        }
        if attrs.index {
            def = quote! { #def.index() };
        }

        schema.push(def);
        extracts.push(quote! { #ident: row.try_get_column(#column)? });
        assignments.push(quote! {
            .set(#column, ::pgquery::Value::from(::core::clone::Clone::clone(&self.#ident)))
        });
        columns.push((column, field.span()));
    }

    check_unique_columns(columns.iter().map(|(column, span)| (column.as_str(), *span)))?;
    let column_names: Vec<&str> = columns.iter().map(|(column, _)| column.as_str()).collect();

    let (key_column, key_sql_type, key_value, with_key) = match &key {
        Some(KeyField {
            ident,
            ty,
            column,
            sql_type,
        }) => {
            let defaults = field_idents
                .iter()
                .filter(|field| *field != ident)
                .map(|field| quote! { #field: ::core::default::Default::default() });
            (
                quote! { ::core::option::Option::Some(#column) },
                quote! { ::core::option::Option::Some(#sql_type) },
                quote! { ::pgquery::Value::from(::core::clone::Clone::clone(&self.#ident)) },
                quote! {
                    let #ident = <#ty as ::pgquery::FromValue>::from_value(key)
                        .map_err(|e| ::pgquery::OrmError::decode(#column, e.to_string()))?;
                    ::core::result::Result::Ok(Self { #ident, #(#defaults),* })
                },
            )
        }
        None => (
            quote! { ::core::option::Option::None },
            quote! { ::core::option::Option::None },
            quote! { ::pgquery::Value::Null },
            quote! {
                let _ = key;
                ::core::result::Result::Err(::pgquery::OrmError::Other(
                    ::std::format!("{} has no key column", #table),
                ))
            },
        ),
    };

    Ok(quote! {
        impl #impl_generics ::pgquery::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &::pgquery::tokio_postgres::Row) -> ::pgquery::OrmResult<Self> {
                #[allow(unused_imports)]
                use ::pgquery::RowExt;
                ::core::result::Result::Ok(Self {
                    #(#extracts),*
                })
            }
        }

        impl #impl_generics ::pgquery::Record for #name #ty_generics #where_clause {
            const TABLE: &'static str = #table;

            fn columns() -> &'static [&'static str] {
                &[#(#column_names),*]
            }

            fn schema() -> ::std::vec::Vec<::pgquery::ColumnDef> {
                ::std::vec![#(#schema),*]
            }

            fn key_column() -> ::core::option::Option<&'static str> {
                #key_column
            }

            fn key_sql_type() -> ::core::option::Option<&'static str> {
                #key_sql_type
            }

            fn key_value(&self) -> ::pgquery::Value {
                #key_value
            }

            fn with_key(key: ::pgquery::Value) -> ::pgquery::OrmResult<Self> {
                #with_key
            }

            fn to_queries(&self) -> ::pgquery::Queries {
                ::pgquery::Queries::new()
                    #(#assignments)*
            }
        }
    })
}
