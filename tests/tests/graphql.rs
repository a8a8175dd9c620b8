use tests::*;

use async_graphql::{Request, Variables};
use pretty_assertions::assert_eq;

async fn run(graph: &Graph, request: impl Into<Request>) -> Json {
    let response = graph.execute(request).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    response.data.into_json().unwrap()
}

#[tokio::test]
async fn query_with_nested_relations() {
    let mut fixture = Fixture::shop();
    let graph = fixture.graph().await;

    let data = run(
        &graph,
        r#"{
            customer(filter: { name: ["ann", "bob"] }, order: [{ name: DESC }]) {
                name
                orders: order_customer_id_fkey_reverse(order: [{ total: DESC }], limit: 2) {
                    id
                    total
                }
            }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({
            "customer": [
                { "name": "bob", "orders": [{ "id": 6, "total": 5.0 }] },
                {
                    "name": "ann",
                    "orders": [{ "id": 5, "total": 50.0 }, { "id": 4, "total": 40.0 }]
                },
            ]
        })
    );
    assert_eq!(fixture.statements().len(), 2);
}

#[tokio::test]
async fn variables_aliases_and_fragments() {
    let mut fixture = Fixture::shop();
    let graph = fixture.graph().await;

    let request = Request::new(
        r#"
        query Page($skip: Int, $min: Float) {
            cheap: order(filter: { total_compare: { lt: $min } }) { ...ids }
            rest: order(skip: $skip, limit: 2) { ...ids owner: order_customer_id_fkey { name } }
        }

        fragment ids on order { id }
        "#,
    )
    .variables(Variables::from_json(json!({ "skip": 5, "min": 15 })));

    assert_eq!(
        run(&graph, request).await,
        json!({
            "cheap": [{ "id": 1 }, { "id": 6 }],
            "rest": [
                { "id": 6, "owner": { "name": "bob" } },
                { "id": 7, "owner": null },
            ],
        })
    );
}

#[tokio::test]
async fn same_relation_under_two_aliases() {
    let mut fixture = Fixture::shop();
    let graph = fixture.graph().await;

    let data = run(
        &graph,
        r#"{
            customer(filter: { id: [1] }) {
                small: order_customer_id_fkey_reverse(filter: { total_compare: { le: 20 } }) { id }
                large: order_customer_id_fkey_reverse(filter: { total_compare: { gt: 40 } }) { id }
            }
        }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({
            "customer": [{
                "small": [{ "id": 1 }, { "id": 2 }],
                "large": [{ "id": 5 }],
            }]
        })
    );
}

#[tokio::test]
async fn plural_filter_through_graphql() {
    let mut fixture = Fixture::shop();
    let graph = fixture.graph().await;

    let data = run(
        &graph,
        r#"{ customer(filter: { order_customer_id_fkey_reverse: { total_compare: { gt: 1 } } }) { name } }"#,
    )
    .await;

    assert_eq!(
        data,
        json!({ "customer": [{ "name": "ann" }, { "name": "bob" }] })
    );
}

#[tokio::test]
async fn mutations_round_trip() {
    let mut fixture = Fixture::shop();
    let graph = fixture.graph().await;

    let data = run(
        &graph,
        r#"mutation {
            insert_customer(values: { name: "eve" }) { id name email }
        }"#,
    )
    .await;
    assert_eq!(
        data,
        json!({ "insert_customer": { "id": 5, "name": "eve", "email": null } })
    );

    let data = run(
        &graph,
        r#"mutation {
            update_customer(id: 5, values: { email: "eve@example.com" }) { email }
            delete_line(order_id: 1, no: 2) { qty }
        }"#,
    )
    .await;
    assert_eq!(
        data,
        json!({
            "update_customer": { "email": "eve@example.com" },
            "delete_line": { "qty": 1 },
        })
    );

    let data = run(&graph, r#"mutation { delete_customer(id: 42) { id } }"#).await;
    assert_eq!(data, json!({ "delete_customer": null }));
}

#[tokio::test]
async fn invalid_input_is_reported_as_error() {
    let mut fixture = Fixture::shop();
    let graph = fixture.graph().await;

    let response = graph
        .execute(r#"{ customer(limit: -3) { id } }"#)
        .await;
    assert_eq!(response.errors.len(), 1);
    assert!(
        response.errors[0].message.contains("non-negative"),
        "{}",
        response.errors[0].message
    );

    let response = graph
        .execute(r#"{ order(filter: { placed_at: ["yesterday"] }) { id } }"#)
        .await;
    assert_eq!(response.errors.len(), 1);

    let response = graph.execute(r#"{ customer { nope } }"#).await;
    assert_eq!(response.errors.len(), 1);
    assert!(fixture.statements().is_empty());
}

#[tokio::test]
async fn generated_sdl() {
    let mut fixture = Fixture::shop();
    let graph = fixture.graph().await;
    let sdl = graph.sdl();

    for expected in [
        "scalar Long",
        "scalar DateTime",
        "enum OrderDirection",
        "input String_compare",
        "input customer_filter",
        "input order_order",
        "input customer_insert",
        "input line_update",
        "type order",
        "order_customer_id_fkey: customer",
        "insert_customer(values: customer_insert!): customer",
        "delete_line(order_id: Long!, no: Long!): line",
        "tag(filter: tag_filter, order: [tag_order!], skip: Int, limit: Int): [tag!]!",
    ] {
        assert!(sdl.contains(expected), "missing `{expected}` in\n{sdl}");
    }

    // Tables without a primary key are read only
    for missing in ["insert_tag", "update_tag", "delete_tag", "avatar"] {
        assert!(!sdl.contains(missing), "unexpected `{missing}`");
    }
}

#[tokio::test]
async fn schema_without_usable_tables_fails() {
    let mut fixture = Fixture::new("CREATE TABLE blobs (data BLOB);");
    let db = fixture.db().await;

    let err = Graph::build(db).unwrap_err();
    assert!(err.is_invalid_schema(), "{err}");
}
