//! GraphQL API generated from the introspected schema.
//!
//! [`Graph::build`] registers one object type per table together with its
//! filter and order inputs, a query field per table and, for tables with a
//! primary key, insert, upsert, update and delete mutations. Resolvers hand
//! the requested selection to [`Db`].

mod resolve;
mod scalar;
mod table;

use crate::{Db, Error, Result};

use async_graphql::dynamic::{Object, Schema};

const QUERY: &str = "Query";
const MUTATION: &str = "Mutation";

/// An executable GraphQL schema over a database.
#[derive(Clone)]
pub struct Graph {
    schema: Schema,
}

impl Graph {
    /// Builds the GraphQL schema for every table that can be exposed.
    pub fn build(db: Db) -> Result<Graph> {
        let model = db.schema().clone();
        let exposed = table::exposed(&model);

        if exposed.is_empty() {
            return Err(Error::invalid_schema("no table can be exposed"));
        }

        let mut query = Object::new(QUERY);
        let mut mutation = Object::new(MUTATION);
        let mut mutations = 0;
        let mut types = scalar::types();

        for table in model.tables.values() {
            if !exposed.contains(table.name.as_str()) {
                continue;
            }

            let generated = table::Generated::new(&model, table, &exposed);

            query = query.field(generated.query_field());
            for field in generated.mutation_fields() {
                mutation = mutation.field(field);
                mutations += 1;
            }
            types.extend(generated.types());
        }

        tracing::debug!(tables = exposed.len(), mutations, "built graph");

        let mut builder =
            Schema::build(QUERY, (mutations > 0).then_some(MUTATION), None).register(query);
        if mutations > 0 {
            builder = builder.register(mutation);
        }
        for ty in types {
            builder = builder.register(ty);
        }

        let schema = builder
            .data(db)
            .finish()
            .map_err(|err| Error::invalid_schema(format!("failed to build graph: {err}")))?;

        Ok(Graph { schema })
    }

    /// Executes a request and returns its `data` and `errors`.
    pub async fn execute(&self, request: impl Into<async_graphql::Request>) -> async_graphql::Response {
        self.schema.execute(request.into()).await
    }

    /// The schema in GraphQL schema definition language.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph").finish_non_exhaustive()
    }
}
