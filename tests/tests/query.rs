use tests::*;

use pretty_assertions::assert_eq;

const ORDERS: &str = "order_customer_id_fkey_reverse";
const CUSTOMER: &str = "order_customer_id_fkey";
const LINES: &str = "line_order_id_fkey_reverse";

#[tokio::test]
async fn select_columns_with_default_page() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let rows = db
        .query("customer", &Selection::new("customer").fields(["id", "name"]))
        .await
        .unwrap();

    assert_eq!(
        rows,
        vec![
            json!({ "id": 1, "name": "ann" }),
            json!({ "id": 2, "name": "bob" }),
            json!({ "id": 3, "name": "cid" }),
            json!({ "id": 4, "name": "dee" }),
        ]
    );
    assert_eq!(
        fixture.statements(),
        [r#"SELECT t0."id", t0."name" FROM "customer" AS t0 ORDER BY t0."id" ASC LIMIT ?1 OFFSET ?2;"#]
    );
}

#[tokio::test]
async fn filter_by_value_list_and_null() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let names = |rows: Vec<Json>| {
        rows.into_iter()
            .map(|row| row["name"].as_str().unwrap().to_string())
            .collect::<Vec<_>>()
    };

    let by_name = Selection::new("customer")
        .argument("filter", json!({ "name": ["bob", "dee", "zed"] }))
        .fields(["name"]);
    assert_eq!(names(db.query("customer", &by_name).await.unwrap()), ["bob", "dee"]);

    let no_email = Selection::new("customer")
        .argument("filter", json!({ "email": null }))
        .fields(["name"]);
    assert_eq!(names(db.query("customer", &no_email).await.unwrap()), ["bob", "dee"]);

    let like = Selection::new("customer")
        .argument("filter", json!({ "email_compare": { "like": "%example.com" } }))
        .fields(["name"]);
    assert_eq!(names(db.query("customer", &like).await.unwrap()), ["ann", "cid"]);
}

#[tokio::test]
async fn compare_operators_combine() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("order")
        .argument("filter", json!({ "total_compare": { "gt": 15, "le": 40 } }))
        .fields(["id", "total"]);

    assert_eq!(
        db.query("order", &selection).await.unwrap(),
        vec![
            json!({ "id": 2, "total": 20.0 }),
            json!({ "id": 3, "total": 30.0 }),
            json!({ "id": 4, "total": 40.0 }),
        ]
    );
}

#[tokio::test]
async fn filter_through_forward_relation() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("order")
        .argument("filter", json!({ CUSTOMER: { "name": "bob" } }))
        .fields(["id"]);

    assert_eq!(db.query("order", &selection).await.unwrap(), vec![json!({ "id": 6 })]);
    assert_eq!(
        fixture.statements(),
        [concat!(
            r#"SELECT t0."id" FROM "order" AS t0 "#,
            r#"INNER JOIN "customer" AS t1 ON t0."customer_id" = t1."id" "#,
            r#"WHERE t1."name" = ?1 ORDER BY t0."id" ASC LIMIT ?2 OFFSET ?3;"#
        )]
    );
}

#[tokio::test]
async fn plural_filter_returns_each_row_once() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    // Ann has four orders above 15, she must still appear once
    let selection = Selection::new("customer")
        .argument("filter", json!({ ORDERS: { "total_compare": { "gt": 15 } } }))
        .fields(["id", "name"]);

    assert_eq!(
        db.query("customer", &selection).await.unwrap(),
        vec![json!({ "id": 1, "name": "ann" })]
    );

    let statements = fixture.statements();
    assert_eq!(statements.len(), 1);
    assert!(
        statements[0].starts_with(r#"WITH "filter" AS (SELECT DISTINCT f0."id" FROM "customer" AS f0"#),
        "{}",
        statements[0]
    );
}

#[tokio::test]
async fn order_by_columns_and_relations() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("order")
        .argument(
            "order",
            json!([{ CUSTOMER: { "name": "desc" } }, { "total": "asc" }]),
        )
        .argument("limit", json!(3))
        .fields(["id"]);

    // DESC puts bob first and the order without a customer last
    assert_eq!(
        db.query("order", &selection).await.unwrap(),
        vec![json!({ "id": 6 }), json!({ "id": 1 }), json!({ "id": 2 })]
    );
}

#[tokio::test]
async fn skip_and_limit_page_through_rows() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("customer")
        .argument("skip", json!(1))
        .argument("limit", json!(2))
        .fields(["id"]);

    assert_eq!(
        db.query("customer", &selection).await.unwrap(),
        vec![json!({ "id": 2 }), json!({ "id": 3 })]
    );
}

#[tokio::test]
async fn page_size_is_configurable() {
    let mut fixture = Fixture::shop();
    let db = fixture.db_with(Db::builder().page_size(2)).await;

    let rows = db
        .query("order", &Selection::new("order").fields(["id"]))
        .await
        .unwrap();
    assert_eq!(rows, vec![json!({ "id": 1 }), json!({ "id": 2 })]);
}

#[tokio::test]
async fn negative_limit_is_rejected() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("customer")
        .argument("limit", json!(-1))
        .fields(["id"]);

    let err = db.query("customer", &selection).await.unwrap_err();
    assert!(err.is_invalid_request(), "{err}");
    assert!(fixture.statements().is_empty());
}

#[tokio::test]
async fn unknown_table_is_rejected() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let err = db.query("nope", &Selection::new("nope")).await.unwrap_err();
    assert!(err.is_invalid_request());
}

#[tokio::test]
async fn nested_lists_use_one_statement_per_level() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("customer")
        .argument("filter", json!({ "id": [1, 2, 3] }))
        .fields(["name"])
        .select(
            Selection::new(ORDERS)
                .alias("orders")
                .fields(["id"])
                .select(
                    Selection::new(LINES)
                        .alias("lines")
                        .argument("order", json!({ "no": "asc" }))
                        .fields(["no", "qty"]),
                ),
        );

    let rows = db.query("customer", &selection).await.unwrap();

    assert_eq!(
        rows,
        vec![
            json!({
                "name": "ann",
                "orders": [
                    { "id": 1, "lines": [{ "no": 1, "qty": 2 }, { "no": 2, "qty": 1 }] },
                    { "id": 2, "lines": [] },
                    { "id": 3, "lines": [] },
                    { "id": 4, "lines": [] },
                    { "id": 5, "lines": [] },
                ]
            }),
            json!({
                "name": "bob",
                "orders": [{ "id": 6, "lines": [{ "no": 1, "qty": 4 }] }]
            }),
            json!({ "name": "cid", "orders": [] }),
        ]
    );

    assert_eq!(fixture.statements().len(), 3);
}

#[tokio::test]
async fn no_parent_keys_skip_the_sub_statement() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("customer")
        .argument("filter", json!({ "name": "dee" }))
        .fields(["name"])
        .select(Selection::new(ORDERS).alias("orders").fields(["id"]));

    assert_eq!(
        db.query("customer", &selection).await.unwrap(),
        vec![json!({ "name": "dee", "orders": [] })]
    );
    assert_eq!(fixture.statements().len(), 2);

    fixture.clear();

    let selection = Selection::new("customer")
        .argument("filter", json!({ "name": "zed" }))
        .select(Selection::new(ORDERS).fields(["id"]));

    assert_eq!(db.query("customer", &selection).await.unwrap(), Vec::<Json>::new());
    assert_eq!(fixture.statements().len(), 1);
}

#[tokio::test]
async fn nested_skip_and_limit_apply_per_parent() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("customer")
        .argument("filter", json!({ "id": [1, 2] }))
        .fields(["id"])
        .select(
            Selection::new(ORDERS)
                .alias("orders")
                .argument("order", json!({ "total": "desc" }))
                .argument("skip", json!(1))
                .argument("limit", json!(2))
                .fields(["id"]),
        );

    assert_eq!(
        db.query("customer", &selection).await.unwrap(),
        vec![
            json!({ "id": 1, "orders": [{ "id": 4 }, { "id": 3 }] }),
            json!({ "id": 2, "orders": [] }),
        ]
    );
}

#[tokio::test]
async fn forward_relation_without_row_is_null() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("order")
        .argument("filter", json!({ "id": [6, 7] }))
        .fields(["id"])
        .select(
            Selection::new(CUSTOMER)
                .alias("customer")
                .fields(["name"])
                .select(Selection::new(ORDERS).alias("orders").fields(["id"])),
        );

    assert_eq!(
        db.query("order", &selection).await.unwrap(),
        vec![
            json!({ "id": 6, "customer": { "name": "bob", "orders": [{ "id": 6 }] } }),
            json!({ "id": 7, "customer": null }),
        ]
    );
}

#[tokio::test]
async fn composite_keys_correlate_lines() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("line")
        .argument("filter", json!({ "qty_compare": { "ge": 2 } }))
        .argument("order", json!({ "qty": "desc" }))
        .fields(["order_id", "no"])
        .select(Selection::new("line_order_id_fkey").alias("order").fields(["total"]));

    assert_eq!(
        db.query("line", &selection).await.unwrap(),
        vec![
            json!({ "order_id": 6, "no": 1, "order": { "total": 5.0 } }),
            json!({ "order_id": 1, "no": 1, "order": { "total": 10.0 } }),
        ]
    );
}

#[tokio::test]
async fn repeated_queries_are_identical() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("customer")
        .argument("filter", json!({ ORDERS: { "total_compare": { "lt": 25 } } }))
        .fields(["name"])
        .select(Selection::new(ORDERS).fields(["total"]));

    let first = db.query("customer", &selection).await.unwrap();
    let second = db.query("customer", &selection).await.unwrap();
    assert_eq!(first, second);

    let statements = fixture.statements();
    assert_eq!(statements.len(), 4);
    assert_eq!(statements[..2], statements[2..]);
}

#[tokio::test]
async fn table_without_primary_key_is_queryable() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let rows = db
        .query("tag", &Selection::new("tag").fields(["label", "avatar"]))
        .await
        .unwrap();
    assert_eq!(rows, vec![json!({ "label": "new" }), json!({ "label": "sale" })]);
}

#[tokio::test]
async fn many_parent_keys_are_fetched_in_batches() {
    // Cid gets 1500 orders, more than one statement binds keys for
    let mut fixture = Fixture::new(&format!(
        r#"{SHOP}
        WITH RECURSIVE n(i) AS (SELECT 100 UNION ALL SELECT i + 1 FROM n WHERE i < 1599)
        INSERT INTO "order" (id, customer_id, total) SELECT i, 3, 1.0 FROM n;
        INSERT INTO line (order_id, no, qty) VALUES (100, 1, 3), (1599, 1, 8), (1599, 2, 9);
        "#
    ));
    let db = fixture.db().await;

    let selection = Selection::new("customer")
        .argument("filter", json!({ "id": [3] }))
        .fields(["id"])
        .select(
            Selection::new(ORDERS)
                .alias("orders")
                .fields(["id"])
                .select(
                    Selection::new(LINES)
                        .alias("lines")
                        .argument("order", json!({ "no": "asc" }))
                        .fields(["qty"]),
                ),
        );

    let rows = db.query("customer", &selection).await.unwrap();
    let orders = rows[0]["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1500);

    let lines = |id: i64| {
        orders
            .iter()
            .find(|order| order["id"] == json!(id))
            .map(|order| order["lines"].clone())
            .unwrap()
    };
    assert_eq!(lines(100), json!([{ "qty": 3 }]));
    assert_eq!(lines(1000), json!([]));
    assert_eq!(lines(1599), json!([{ "qty": 8 }, { "qty": 9 }]));

    // customer, orders, then two batches of lines
    let statements = fixture.statements();
    assert_eq!(statements.len(), 4);
    assert!(statements[2].starts_with(r#"SELECT t0."qty""#), "{}", statements[2]);
    assert!(statements[3].starts_with(r#"SELECT t0."qty""#), "{}", statements[3]);
}
