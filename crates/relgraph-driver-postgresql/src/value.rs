use relgraph_core::stmt::{self, Value as CoreValue};
use std::error::Error as StdError;
use tokio_postgres::types::{private::BytesMut, to_sql_checked, IsNull, ToSql, Type};

#[derive(Debug)]
pub struct Value(pub(crate) CoreValue);

type BoxError = Box<dyn StdError + Sync + Send>;

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            stmt::Value::Null => Ok(IsNull::Yes),
            stmt::Value::Bool(value) => value.to_sql(ty, out),
            stmt::Value::I16(value) => integer_to_sql(*value as i64, ty, out),
            stmt::Value::I32(value) => integer_to_sql(*value as i64, ty, out),
            stmt::Value::I64(value) => integer_to_sql(*value, ty, out),
            stmt::Value::F32(value) => float_to_sql(*value as f64, ty, out),
            stmt::Value::F64(value) => float_to_sql(*value, ty, out),
            stmt::Value::String(value) => match *ty {
                Type::UUID => value.parse::<uuid::Uuid>()?.to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            stmt::Value::Uuid(value) => match *ty {
                Type::UUID => value.to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
            stmt::Value::Timestamp(value) => match *ty {
                Type::TIMESTAMPTZ => value.and_utc().to_sql(ty, out),
                Type::TIMESTAMP => value.to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
            stmt::Value::TimestampTz(value) => match *ty {
                Type::TIMESTAMP => value.naive_utc().to_sql(ty, out),
                Type::TIMESTAMPTZ => value.to_sql(ty, out),
                _ => value.to_rfc3339().to_sql(ty, out),
            },
            stmt::Value::Json(value) => match *ty {
                Type::JSON | Type::JSONB => value.to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
        }
    }

    /// The server infers parameter types from the statement; every value is
    /// converted to whatever it asks for, or rejected in `to_sql`.
    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn integer_to_sql(value: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => value.to_string().to_sql(ty, out),
        _ => Err(format!("cannot bind integer {value} as {ty}").into()),
    }
}

fn float_to_sql(value: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => value.to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR => value.to_string().to_sql(ty, out),
        _ => Err(format!("cannot bind float {value} as {ty}").into()),
    }
}
