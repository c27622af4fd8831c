//! Operand values carried by predicates and statement parameters.
//!
//! [`Value`] is the single parameter type handed to tokio-postgres. It encodes
//! against whatever type PostgreSQL inferred for the placeholder, so a value
//! parsed from a URL (always text) can still be compared with an integer,
//! UUID or timestamp column.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::error::Error;
use std::fmt;
use thiserror::Error;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

/// A dynamically typed SQL operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    /// timestamptz
    Time(DateTime<Utc>),
    /// timestamp without time zone
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
    Json(serde_json::Value),
}

/// Encoding/decoding failure between a [`Value`] and a PostgreSQL type.
#[derive(Debug, Error)]
pub enum ValueError {
    #[error("cannot encode {kind} value as postgres type {ty}")]
    Encode { kind: &'static str, ty: Type },

    #[error("cannot decode postgres type {0} into a value")]
    Decode(Type),

    #[error("cannot parse {input:?} as postgres type {ty}")]
    Parse { input: String, ty: Type },

    #[error("cannot convert {kind} value into {target}")]
    Convert {
        kind: &'static str,
        target: &'static str,
    },
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Time(_) => "timestamptz",
            Value::Timestamp(_) => "timestamp",
            Value::Date(_) => "date",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn encode_error(&self, ty: &Type) -> BoxError {
        Box::new(ValueError::Encode {
            kind: self.kind(),
            ty: ty.clone(),
        })
    }
}

fn is_text(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

fn supported(ty: &Type) -> bool {
    is_text(ty)
        || matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::BYTEA
                | Type::UUID
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::JSON
                | Type::JSONB
        )
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "y" | "yes" | "on" | "1" => Some(true),
        "f" | "false" | "n" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

/// Encode a text operand as the placeholder's inferred type.
fn encode_text(input: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    let parse_error = || -> BoxError {
        Box::new(ValueError::Parse {
            input: input.to_string(),
            ty: ty.clone(),
        })
    };
    match *ty {
        Type::BOOL => parse_bool(input).ok_or_else(parse_error)?.to_sql(ty, out),
        Type::INT2 => input.trim().parse::<i16>()?.to_sql(ty, out),
        Type::INT4 => input.trim().parse::<i32>()?.to_sql(ty, out),
        Type::INT8 => input.trim().parse::<i64>()?.to_sql(ty, out),
        Type::FLOAT4 => input.trim().parse::<f32>()?.to_sql(ty, out),
        Type::FLOAT8 => input.trim().parse::<f64>()?.to_sql(ty, out),
        Type::BYTEA => input.as_bytes().to_sql(ty, out),
        Type::UUID => Uuid::parse_str(input.trim())?.to_sql(ty, out),
        Type::TIMESTAMPTZ => DateTime::parse_from_rfc3339(input.trim())?
            .with_timezone(&Utc)
            .to_sql(ty, out),
        Type::TIMESTAMP => parse_timestamp(input.trim())
            .ok_or_else(parse_error)?
            .to_sql(ty, out),
        Type::DATE => NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")?.to_sql(ty, out),
        Type::JSON | Type::JSONB => {
            serde_json::from_str::<serde_json::Value>(input)?.to_sql(ty, out)
        }
        _ => input.to_sql(ty, out),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Text(s) => encode_text(s, ty, out),
            _ if is_text(ty) => self.to_string().to_sql(ty, out),
            Value::Bool(v) => match *ty {
                Type::BOOL => v.to_sql(ty, out),
                _ => Err(self.encode_error(ty)),
            },
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::INT8 => v.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                Type::JSON | Type::JSONB => serde_json::Value::from(*v).to_sql(ty, out),
                _ => Err(self.encode_error(ty)),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => v.to_sql(ty, out),
                Type::JSON | Type::JSONB => serde_json::Value::from(*v).to_sql(ty, out),
                _ => Err(self.encode_error(ty)),
            },
            Value::Bytes(v) => match *ty {
                Type::BYTEA => v.as_slice().to_sql(ty, out),
                _ => Err(self.encode_error(ty)),
            },
            Value::Uuid(v) => match *ty {
                Type::UUID => v.to_sql(ty, out),
                _ => Err(self.encode_error(ty)),
            },
            Value::Time(v) => match *ty {
                Type::TIMESTAMPTZ => v.to_sql(ty, out),
                Type::TIMESTAMP => v.naive_utc().to_sql(ty, out),
                Type::DATE => v.date_naive().to_sql(ty, out),
                _ => Err(self.encode_error(ty)),
            },
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMP => v.to_sql(ty, out),
                Type::TIMESTAMPTZ => v.and_utc().to_sql(ty, out),
                Type::DATE => v.date().to_sql(ty, out),
                _ => Err(self.encode_error(ty)),
            },
            Value::Date(v) => match *ty {
                Type::DATE => v.to_sql(ty, out),
                _ => Err(self.encode_error(ty)),
            },
            Value::Json(v) => match *ty {
                Type::JSON | Type::JSONB => v.to_sql(ty, out),
                _ => Err(self.encode_error(ty)),
            },
        }
    }

    fn accepts(ty: &Type) -> bool {
        supported(ty)
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let value = match *ty {
            Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            Type::BYTEA => Value::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            Type::UUID => Value::Uuid(Uuid::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => Value::Time(DateTime::<Utc>::from_sql(ty, raw)?),
            Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            Type::DATE => Value::Date(NaiveDate::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => Value::Json(serde_json::Value::from_sql(ty, raw)?),
            _ if is_text(ty) => Value::Text(String::from_sql(ty, raw)?),
            _ => return Err(Box::new(ValueError::Decode(ty.clone()))),
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(ty: &Type) -> bool {
        supported(ty)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => {
                f.write_str("\\x")?;
                v.iter().try_for_each(|b| write!(f, "{b:02x}"))
            }
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Time(v) => f.write_str(&v.to_rfc3339()),
            Value::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::Json(v) => write!(f, "{v}"),
        }
    }
}

/// Borrow statement parameters in the shape tokio-postgres expects.
pub fn param_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    &String => Text,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    Uuid => Uuid,
    DateTime<Utc> => Time,
    NaiveDateTime => Timestamp,
    NaiveDate => Date,
    serde_json::Value => Json,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a [`Value`] back into a concrete field type.
///
/// Used to rebuild records from key values, e.g. when loading a foreign
/// reference. Integer narrowing is checked.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

fn convert_error<T>(value: &Value) -> ValueError {
    ValueError::Convert {
        kind: value.kind(),
        target: std::any::type_name::<T>(),
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(convert_error::<$ty>(&other)),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    String => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    DateTime<Utc> => Time,
    NaiveDateTime => Timestamp,
    NaiveDate => Date,
    serde_json::Value => Json,
}

macro_rules! impl_from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ValueError> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(v).map_err(|_| convert_error::<$ty>(&value)),
                        Value::Text(ref s) => s.trim().parse().map_err(|_| convert_error::<$ty>(&value)),
                        other => Err(convert_error::<$ty>(&other)),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i16, i32, i64);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            other => Err(convert_error::<f64>(&other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &Value, ty: &Type) -> Result<Vec<u8>, BoxError> {
        let mut buf = BytesMut::new();
        value.to_sql_checked(ty, &mut buf)?;
        Ok(buf.to_vec())
    }

    #[test]
    fn text_from_urls_coerces_to_the_inferred_type() {
        let eighteen = Value::from("18");
        assert_eq!(encode(&eighteen, &Type::INT4).unwrap(), 18i32.to_be_bytes());
        assert_eq!(encode(&eighteen, &Type::INT8).unwrap(), 18i64.to_be_bytes());
        assert_eq!(encode(&eighteen, &Type::TEXT).unwrap(), b"18");
        assert_eq!(encode(&Value::from("yes"), &Type::BOOL).unwrap(), [1]);

        let id = Uuid::new_v4();
        let encoded = encode(&Value::from(id.to_string()), &Type::UUID).unwrap();
        assert_eq!(encoded, id.as_bytes());
    }

    #[test]
    fn unparsable_text_is_an_encode_error() {
        assert!(encode(&Value::from("eighteen"), &Type::INT4).is_err());
        assert!(encode(&Value::from("maybe"), &Type::BOOL).is_err());
    }

    #[test]
    fn integers_narrow_to_the_column_width() {
        assert_eq!(encode(&Value::Int(7), &Type::INT2).unwrap(), 7i16.to_be_bytes());
        assert!(encode(&Value::Int(i64::MAX), &Type::INT4).is_err());
        assert_eq!(encode(&Value::Int(2), &Type::FLOAT8).unwrap(), 2f64.to_be_bytes());
    }

    #[test]
    fn mismatched_kinds_are_rejected() {
        let err = encode(&Value::Bool(true), &Type::INT4).unwrap_err();
        assert_eq!(err.to_string(), "cannot encode bool value as postgres type int4");
        assert!(encode(&Value::Float(1.5), &Type::UUID).is_err());
    }

    #[test]
    fn null_encodes_as_sql_null() {
        let mut buf = BytesMut::new();
        let is_null = Value::Null.to_sql(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn decodes_what_it_encodes() {
        let raw = encode(&Value::Int(42), &Type::INT4).unwrap();
        assert_eq!(Value::from_sql(&Type::INT4, &raw).unwrap(), Value::Int(42));

        let raw = encode(&Value::from("doe"), &Type::VARCHAR).unwrap();
        assert_eq!(Value::from_sql(&Type::VARCHAR, &raw).unwrap(), Value::from("doe"));

        assert_eq!(Value::from_sql_null(&Type::INT4).unwrap(), Value::Null);
        assert!(Value::from_sql(&Type::POINT, &[]).is_err());
    }

    #[test]
    fn conversions_pick_the_matching_variant() {
        assert_eq!(Value::from(18), Value::Int(18));
        assert_eq!(Value::from(3.5f64), Value::Float(3.5));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
        assert_eq!(Value::from(vec![1u8, 2]).to_string(), "\\x0102");
    }

    #[test]
    fn from_value_checks_kind_and_width() {
        assert_eq!(i32::from_value(Value::Int(7)).unwrap(), 7);
        assert_eq!(i64::from_value(Value::from("12")).unwrap(), 12);
        assert!(i16::from_value(Value::Int(i64::from(i16::MAX) + 1)).is_err());
        assert_eq!(f64::from_value(Value::Int(2)).unwrap(), 2.0);
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<String>::from_value(Value::from("doe")).unwrap(),
            Some("doe".to_string())
        );

        let err = Uuid::from_value(Value::Bool(true)).unwrap_err();
        assert!(err.to_string().starts_with("cannot convert bool value into"));
    }
}
