use super::{DataType, Vendor};
use crate::{
    stmt::{Type, Value},
    Result,
};

use std::collections::HashMap;

/// Public scalar a column is exposed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Int,
    Long,
    Float,
    String,
    Boolean,
    Uuid,
    DateTime,
    Json,
}

impl Scalar {
    pub const ALL: [Scalar; 8] = [
        Scalar::Int,
        Scalar::Long,
        Scalar::Float,
        Scalar::String,
        Scalar::Boolean,
        Scalar::Uuid,
        Scalar::DateTime,
        Scalar::Json,
    ];

    /// Name of the scalar in the generated API.
    pub fn name(self) -> &'static str {
        match self {
            Scalar::Int => "Int",
            Scalar::Long => "Long",
            Scalar::Float => "Float",
            Scalar::String => "String",
            Scalar::Boolean => "Boolean",
            Scalar::Uuid => "UUID",
            Scalar::DateTime => "DateTime",
            Scalar::Json => "JSON",
        }
    }

    /// Returns `true` for scalars the API layer has to declare itself.
    pub fn is_custom(self) -> bool {
        matches!(
            self,
            Scalar::Long | Scalar::Uuid | Scalar::DateTime | Scalar::Json
        )
    }
}

/// How values of one database type are exposed, bound and read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub scalar: Scalar,

    /// Tag used to bind parameters and extract results
    pub ty: Type,

    /// Whether the column may be written by insert and update
    pub mutable: bool,
}

impl ColumnMapping {
    const fn new(scalar: Scalar, ty: Type) -> ColumnMapping {
        ColumnMapping {
            scalar,
            ty,
            mutable: true,
        }
    }

    const fn read_only(scalar: Scalar, ty: Type) -> ColumnMapping {
        ColumnMapping {
            scalar,
            ty,
            mutable: false,
        }
    }

    /// Binds request input to a value of the column's type.
    pub fn bind(&self, input: &serde_json::Value) -> Result<Value> {
        Value::from_json(input, self.ty)
    }
}

/// Per-vendor table from normalized type name to [`ColumnMapping`].
#[derive(Debug, Clone)]
pub struct TypeMapping {
    entries: HashMap<&'static str, ColumnMapping>,
}

const SQLITE: &[(&str, ColumnMapping)] = &[
    ("integer", ColumnMapping::new(Scalar::Long, Type::I64)),
    ("int", ColumnMapping::new(Scalar::Long, Type::I64)),
    ("bigint", ColumnMapping::new(Scalar::Long, Type::I64)),
    ("smallint", ColumnMapping::new(Scalar::Int, Type::I32)),
    ("tinyint", ColumnMapping::new(Scalar::Int, Type::I32)),
    ("mediumint", ColumnMapping::new(Scalar::Int, Type::I32)),
    ("text", ColumnMapping::new(Scalar::String, Type::String)),
    ("varchar", ColumnMapping::new(Scalar::String, Type::String)),
    ("character varying", ColumnMapping::new(Scalar::String, Type::String)),
    ("char", ColumnMapping::new(Scalar::String, Type::String)),
    ("character", ColumnMapping::new(Scalar::String, Type::String)),
    ("clob", ColumnMapping::new(Scalar::String, Type::String)),
    ("real", ColumnMapping::new(Scalar::Float, Type::F64)),
    ("double", ColumnMapping::new(Scalar::Float, Type::F64)),
    ("double precision", ColumnMapping::new(Scalar::Float, Type::F64)),
    ("float", ColumnMapping::new(Scalar::Float, Type::F64)),
    ("numeric", ColumnMapping::new(Scalar::Float, Type::F64)),
    ("decimal", ColumnMapping::new(Scalar::Float, Type::F64)),
    ("boolean", ColumnMapping::new(Scalar::Boolean, Type::Bool)),
    ("bool", ColumnMapping::new(Scalar::Boolean, Type::Bool)),
    ("uuid", ColumnMapping::new(Scalar::Uuid, Type::Uuid)),
    ("datetime", ColumnMapping::new(Scalar::DateTime, Type::Timestamp)),
    ("timestamp", ColumnMapping::new(Scalar::DateTime, Type::Timestamp)),
];

const POSTGRESQL: &[(&str, ColumnMapping)] = &[
    ("smallint", ColumnMapping::new(Scalar::Int, Type::I16)),
    ("integer", ColumnMapping::new(Scalar::Int, Type::I32)),
    ("bigint", ColumnMapping::new(Scalar::Long, Type::I64)),
    ("real", ColumnMapping::new(Scalar::Float, Type::F32)),
    ("double precision", ColumnMapping::new(Scalar::Float, Type::F64)),
    ("boolean", ColumnMapping::new(Scalar::Boolean, Type::Bool)),
    ("text", ColumnMapping::new(Scalar::String, Type::String)),
    ("character varying", ColumnMapping::new(Scalar::String, Type::String)),
    ("character", ColumnMapping::new(Scalar::String, Type::String)),
    ("uuid", ColumnMapping::new(Scalar::Uuid, Type::Uuid)),
    (
        "timestamp without time zone",
        ColumnMapping::new(Scalar::DateTime, Type::Timestamp),
    ),
    (
        "timestamp with time zone",
        ColumnMapping::new(Scalar::DateTime, Type::TimestampTz),
    ),
    ("name", ColumnMapping::read_only(Scalar::String, Type::String)),
    ("json", ColumnMapping::read_only(Scalar::Json, Type::Json)),
    ("jsonb", ColumnMapping::read_only(Scalar::Json, Type::Json)),
];

impl TypeMapping {
    pub fn new(vendor: Vendor) -> TypeMapping {
        let entries = match vendor {
            Vendor::Sqlite => SQLITE,
            Vendor::Postgresql => POSTGRESQL,
        };

        TypeMapping {
            entries: entries.iter().copied().collect(),
        }
    }

    pub fn get(&self, data_type: &DataType) -> Option<&ColumnMapping> {
        self.entries.get(data_type.as_str())
    }
}
