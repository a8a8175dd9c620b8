use super::Type;
use crate::{Error, Result};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value as Json;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A typed scalar flowing between requests, statements and drivers.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Uuid(Uuid),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(Json),
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type tag of the value, `None` for `Null`.
    pub fn infer_ty(&self) -> Option<Type> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => Type::Bool,
            Value::I16(_) => Type::I16,
            Value::I32(_) => Type::I32,
            Value::I64(_) => Type::I64,
            Value::F32(_) => Type::F32,
            Value::F64(_) => Type::F64,
            Value::String(_) => Type::String,
            Value::Uuid(_) => Type::Uuid,
            Value::Timestamp(_) => Type::Timestamp,
            Value::TimestampTz(_) => Type::TimestampTz,
            Value::Json(_) => Type::Json,
        })
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I16(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Converts request input into a value of type `ty`.
    ///
    /// JSON `null` always binds to [`Value::Null`]. Strings are accepted for
    /// every scalar type and parsed.
    pub fn from_json(json: &Json, ty: Type) -> Result<Value> {
        if json.is_null() {
            return Ok(Value::Null);
        }

        let fail = || Error::type_conversion(json, ty.name());

        let value = match ty {
            Type::Bool => match json {
                Json::Bool(v) => Value::Bool(*v),
                Json::String(v) => Value::Bool(v.parse().map_err(|_| fail())?),
                _ => return Err(fail()),
            },
            Type::I16 | Type::I32 | Type::I64 => {
                let v = match json {
                    Json::Number(n) => n.as_i64().ok_or_else(fail)?,
                    Json::String(s) => s.trim().parse::<i64>().map_err(|_| fail())?,
                    _ => return Err(fail()),
                };
                Value::I64(v).cast(ty).map_err(|_| fail())?
            }
            Type::F32 | Type::F64 => {
                let v = match json {
                    Json::Number(n) => n.as_f64().ok_or_else(fail)?,
                    Json::String(s) => s.trim().parse::<f64>().map_err(|_| fail())?,
                    _ => return Err(fail()),
                };
                if ty == Type::F32 {
                    Value::F32(v as f32)
                } else {
                    Value::F64(v)
                }
            }
            Type::String => match json {
                Json::String(v) => Value::String(v.clone()),
                _ => return Err(fail()),
            },
            Type::Uuid => match json {
                Json::String(v) => Value::Uuid(v.parse().map_err(|_| fail())?),
                _ => return Err(fail()),
            },
            Type::Timestamp => match json {
                Json::String(v) => Value::Timestamp(parse_timestamp(v).ok_or_else(fail)?),
                _ => return Err(fail()),
            },
            Type::TimestampTz => match json {
                Json::String(v) => Value::TimestampTz(parse_timestamp_tz(v).ok_or_else(fail)?),
                _ => return Err(fail()),
            },
            Type::Json => Value::Json(json.clone()),
        };

        Ok(value)
    }

    /// Renders the value as response output.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(*v),
            Value::I16(v) => Json::from(*v),
            Value::I32(v) => Json::from(*v),
            Value::I64(v) => Json::from(*v),
            Value::F32(v) => float_json(*v as f64),
            Value::F64(v) => float_json(*v),
            Value::String(v) => Json::String(v.clone()),
            Value::Uuid(v) => Json::String(v.to_string()),
            Value::Timestamp(v) => Json::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Value::TimestampTz(v) => Json::String(v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Json(v) => v.clone(),
        }
    }

    /// Converts the value to `ty`, used to line up key columns whose declared
    /// types differ on the two sides of a foreign key.
    pub fn cast(self, ty: Type) -> Result<Value> {
        if self.infer_ty().map_or(true, |current| current == ty) {
            return Ok(self);
        }

        let fail = |value: &Value| Error::type_conversion(&format!("{value:?}"), ty.name());

        let cast = match (&self, ty) {
            (_, Type::I16) => self
                .as_i64()
                .and_then(|v| i16::try_from(v).ok())
                .map(Value::I16),
            (_, Type::I32) => self
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Value::I32),
            (_, Type::I64) => self.as_i64().map(Value::I64),
            (Value::F32(v), Type::F64) => Some(Value::F64(*v as f64)),
            (Value::F64(v), Type::F32) => Some(Value::F32(*v as f32)),
            (_, Type::F64) => self.as_i64().map(|v| Value::F64(v as f64)),
            (Value::String(v), Type::Uuid) => v.parse().ok().map(Value::Uuid),
            (Value::Uuid(v), Type::String) => Some(Value::String(v.to_string())),
            (Value::Timestamp(v), Type::TimestampTz) => Some(Value::TimestampTz(v.and_utc())),
            (Value::TimestampTz(v), Type::Timestamp) => Some(Value::Timestamp(v.naive_utc())),
            (Value::String(v), Type::Timestamp) => parse_timestamp(v).map(Value::Timestamp),
            (Value::String(v), Type::TimestampTz) => parse_timestamp_tz(v).map(Value::TimestampTz),
            _ => None,
        };

        cast.ok_or_else(|| fail(&self))
    }
}

fn float_json(v: f64) -> Json {
    serde_json::Number::from_f64(v)
        .map(Json::Number)
        .unwrap_or(Json::Null)
}

/// Parses a timestamp without time zone. RFC 3339 input is converted to UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(v) = NaiveDateTime::parse_from_str(s, format) {
            return Some(v);
        }
    }

    if let Ok(v) = DateTime::parse_from_rfc3339(s) {
        return Some(v.naive_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a timestamp with time zone. Input without an offset is taken as UTC.
pub(crate) fn parse_timestamp_tz(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(v) = DateTime::parse_from_rfc3339(s) {
        return Some(v.with_timezone(&Utc));
    }
    if let Ok(v) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(v.with_timezone(&Utc));
    }
    parse_timestamp(s).map(|v| v.and_utc())
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (F32(a), F32(b)) => a.to_bits() == b.to_bits(),
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Uuid(a), Uuid(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (TimestampTz(a), TimestampTz(b)) => a == b,
            (Json(a), Json(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);

        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Uuid(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::TimestampTz(v) => v.hash(state),
            Value::Json(v) => v.to_string().hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::I32(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::I64(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}
