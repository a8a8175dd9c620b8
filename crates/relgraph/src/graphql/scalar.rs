use crate::engine::naming;

use async_graphql::{
    dynamic::{Enum, InputObject, InputValue, Scalar as ScalarType, Type, TypeRef},
    Value as GqlValue,
};
use relgraph_core::{
    schema::Scalar,
    stmt::{self, Value},
};

const OPERATORS: [&str; 6] = ["eq", "ne", "gt", "ge", "lt", "le"];

/// Custom scalars, the order direction enum and the comparison inputs.
pub(super) fn types() -> Vec<Type> {
    let mut types = vec![];

    for scalar in Scalar::ALL {
        if scalar.is_custom() {
            types.push(custom(scalar).into());
        }

        if is_comparable(scalar) {
            types.push(compare(scalar).into());
        }
    }

    types.push(
        Enum::new(naming::ORDER_DIRECTION)
            .item("ASC")
            .item("DESC")
            .into(),
    );

    types
}

/// Whether columns of `scalar` can be filtered and ordered by.
pub(super) fn is_comparable(scalar: Scalar) -> bool {
    scalar != Scalar::Json
}

fn custom(scalar: Scalar) -> ScalarType {
    let (description, ty) = match scalar {
        Scalar::Long => ("64-bit signed integer", stmt::Type::I64),
        Scalar::Uuid => ("String encoded UUID", stmt::Type::Uuid),
        Scalar::DateTime => ("ISO 8601 date and time", stmt::Type::TimestampTz),
        _ => return ScalarType::new(scalar.name()).description("Arbitrary JSON value"),
    };

    ScalarType::new(scalar.name())
        .description(description)
        .validator(move |value| accepts(value, ty))
}

fn accepts(value: &GqlValue, ty: stmt::Type) -> bool {
    value
        .clone()
        .into_json()
        .is_ok_and(|json| Value::from_json(&json, ty).is_ok())
}

fn compare(scalar: Scalar) -> InputObject {
    let mut input = InputObject::new(naming::compare_type(scalar));

    for operator in OPERATORS {
        input = input.field(InputValue::new(operator, TypeRef::named(scalar.name())));
    }

    if scalar == Scalar::String {
        input = input.field(InputValue::new("like", TypeRef::named(TypeRef::STRING)));
    }

    input
}
