/// Value type tag.
///
/// Drivers use the tag to decide how a result column is read back and the
/// binder uses it to convert request input into a [`Value`](super::Value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I16,
    I32,
    I64,
    F32,
    F64,
    String,
    Uuid,

    /// Timestamp without time zone
    Timestamp,

    /// Timestamp with time zone, normalized to UTC
    TimestampTz,

    Json,
}

impl Type {
    pub fn name(self) -> &'static str {
        match self {
            Type::Bool => "Bool",
            Type::I16 => "I16",
            Type::I32 => "I32",
            Type::I64 => "I64",
            Type::F32 => "F32",
            Type::F64 => "F64",
            Type::String => "String",
            Type::Uuid => "Uuid",
            Type::Timestamp => "Timestamp",
            Type::TimestampTz => "TimestampTz",
            Type::Json => "Json",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Type::I16 | Type::I32 | Type::I64)
    }
}
