use crate::{engine::Selection, Db, MutationKind};

use async_graphql::{
    dynamic::{FieldFuture, FieldValue, ResolverContext},
    SelectionField, Value as GqlValue,
};
use serde_json::{Map, Value as Json};

/// Top-level query of `table`.
pub(super) fn query(ctx: ResolverContext<'_>, table: String) -> FieldFuture<'_> {
    FieldFuture::new(async move {
        let db = ctx.data::<Db>()?;
        let selection = selection(ctx.field())?;
        tracing::trace!(table, ?selection, "resolving query");

        let rows = db.query(&table, &selection).await?;
        Ok(Some(FieldValue::list(rows.into_iter().map(field_value))))
    })
}

pub(super) fn mutation(ctx: ResolverContext<'_>, kind: MutationKind, table: String) -> FieldFuture<'_> {
    FieldFuture::new(async move {
        let db = ctx.data::<Db>()?;
        let selection = selection(ctx.field())?;
        tracing::trace!(table, ?kind, ?selection, "resolving mutation");

        let row = db.mutate(kind, &table, &selection).await?;
        Ok(Some(field_value(row)))
    })
}

/// A column of an already fetched row.
pub(super) fn column(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
    FieldFuture::new(async move {
        let value = member(&ctx)?.map(GqlValue::from_json).transpose()?;
        Ok(value)
    })
}

/// A relation of an already fetched row.
pub(super) fn nested(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
    FieldFuture::new(async move { Ok(member(&ctx)?.map(field_value)) })
}

/// Reads the resolved field from the parent row, by response key.
fn member(ctx: &ResolverContext<'_>) -> async_graphql::Result<Option<Json>> {
    let row = ctx.parent_value.try_downcast_ref::<Map<String, Json>>()?;
    let field = ctx.field();
    let key = field.alias().unwrap_or(field.name());

    Ok(row.get(key).cloned())
}

fn field_value<'a>(json: Json) -> FieldValue<'a> {
    match json {
        Json::Object(row) => FieldValue::owned_any(row),
        Json::Array(rows) => FieldValue::list(rows.into_iter().map(field_value)),
        _ => FieldValue::NULL,
    }
}

/// Converts the requested field, arguments resolved against the request's
/// variables and fragments flattened.
fn selection(field: SelectionField<'_>) -> async_graphql::Result<Selection> {
    let mut arguments = Map::new();
    for (name, value) in field.arguments()? {
        arguments.insert(name.to_string(), value.into_json()?);
    }

    let selection = field
        .selection_set()
        .map(selection)
        .collect::<async_graphql::Result<Vec<_>>>()?;

    Ok(Selection {
        name: field.name().to_string(),
        alias: field.alias().map(str::to_string),
        arguments,
        selection,
    })
}
