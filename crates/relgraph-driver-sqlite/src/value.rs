use relgraph_core::{
    stmt::{self, Value as CoreValue},
    Error, Result,
};
use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Converts this SQLite driver value into the core value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a SQLite value within a row to a value of type `ty`.
    ///
    /// SQLite column affinity is loose, so the stored representation is cast
    /// to the requested type. SQL `NULL` is always [`CoreValue::Null`].
    pub fn from_sql(row: &Row, index: usize, ty: stmt::Type) -> Result<Self> {
        let value = row
            .get_ref(index)
            .map_err(Error::driver_operation_failed)?;

        let core_value = match value {
            ValueRef::Null => CoreValue::Null,
            ValueRef::Integer(value) => match ty {
                stmt::Type::Bool => CoreValue::Bool(value != 0),
                stmt::Type::String => CoreValue::String(value.to_string()),
                stmt::Type::F32 | stmt::Type::F64 => CoreValue::F64(value as f64).cast(ty)?,
                _ => CoreValue::I64(value).cast(ty)?,
            },
            ValueRef::Real(value) => match ty {
                stmt::Type::String => CoreValue::String(value.to_string()),
                _ => CoreValue::F64(value).cast(ty)?,
            },
            ValueRef::Text(value) => {
                let text = std::str::from_utf8(value).map_err(Error::driver_operation_failed)?;

                match ty {
                    stmt::Type::Bool => match text {
                        "true" | "TRUE" | "1" => CoreValue::Bool(true),
                        "false" | "FALSE" | "0" => CoreValue::Bool(false),
                        _ => return Err(Error::type_conversion(&text, ty.name())),
                    },
                    stmt::Type::Json => CoreValue::Json(
                        serde_json::from_str(text).map_err(Error::driver_operation_failed)?,
                    ),
                    _ => CoreValue::String(text.to_string()).cast(ty)?,
                }
            }
            ValueRef::Blob(_) => return Err(Error::unsupported_type("blob")),
        };

        Ok(Value(core_value))
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use stmt::Value;

        match &self.0 {
            Value::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Value::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            Value::I16(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            Value::I32(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            Value::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::F32(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v as f64))),
            Value::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            Value::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Uuid(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(v.to_string()))),
            // Timestamps are stored as ISO 8601 text so they sort and compare
            Value::Timestamp(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            ))),
            Value::TimestampTz(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            ))),
            Value::Json(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(v.to_string()))),
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
        }
    }
}
