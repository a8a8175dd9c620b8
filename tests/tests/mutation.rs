use tests::*;

use pretty_assertions::assert_eq;

#[tokio::test]
async fn insert_returns_the_new_row() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("insert_customer")
        .argument("values", json!({ "name": "eve", "email": "eve@example.com" }))
        .fields(["id", "name", "email"]);

    let row = db
        .mutate(MutationKind::Insert, "customer", &selection)
        .await
        .unwrap();

    assert_eq!(
        row,
        json!({ "id": 5, "name": "eve", "email": "eve@example.com" })
    );
    assert_eq!(
        fixture.statements(),
        [r#"INSERT INTO "customer" ("name", "email") VALUES (?1, ?2) RETURNING "id", "name", "email";"#]
    );
    assert_eq!(
        fixture.scalar::<String>("SELECT name FROM customer WHERE id = 5"),
        Some("eve".to_string())
    );
}

#[tokio::test]
async fn insert_with_explicit_key_and_timestamp() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("insert_order")
        .argument(
            "values",
            json!({ "id": 40, "customer_id": 3, "total": 12.5, "placed_at": "2024-05-01T10:30:00" }),
        )
        .fields(["id", "total", "placed_at"]);

    assert_eq!(
        db.mutate(MutationKind::Insert, "order", &selection).await.unwrap(),
        json!({ "id": 40, "total": 12.5, "placed_at": "2024-05-01T10:30:00" })
    );

    let filter = Selection::new("order")
        .argument(
            "filter",
            json!({ "placed_at_compare": { "ge": "2024-05-01 00:00" } }),
        )
        .fields(["id"]);
    assert_eq!(db.query("order", &filter).await.unwrap(), vec![json!({ "id": 40 })]);
}

#[tokio::test]
async fn upsert_updates_existing_rows_in_place() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("upsert_order")
        .argument("id", json!(6))
        .argument("values", json!({ "total": 6.5 }))
        .fields(["id", "customer_id", "total"]);

    assert_eq!(
        db.mutate(MutationKind::Upsert, "order", &selection).await.unwrap(),
        json!({ "id": 6, "customer_id": 2, "total": 6.5 })
    );
    assert_eq!(fixture.scalar::<i64>("SELECT count(*) FROM \"order\""), Some(7));
}

#[tokio::test]
async fn upsert_inserts_missing_rows() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("upsert_line")
        .argument("order_id", json!(2))
        .argument("no", json!(1))
        .argument("values", json!({ "qty": 7 }))
        .fields(["order_id", "no", "qty"]);

    assert_eq!(
        db.mutate(MutationKind::Upsert, "line", &selection).await.unwrap(),
        json!({ "order_id": 2, "no": 1, "qty": 7 })
    );
    assert_eq!(
        fixture.scalar::<i64>("SELECT qty FROM line WHERE order_id = 2 AND no = 1"),
        Some(7)
    );
}

#[tokio::test]
async fn update_changes_only_the_keyed_row() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("update_line")
        .argument("order_id", json!(1))
        .argument("no", json!(2))
        .argument("values", json!({ "qty": 9, "no": 5 }))
        .fields(["no", "qty"]);

    assert_eq!(
        db.mutate(MutationKind::Update, "line", &selection).await.unwrap(),
        json!({ "no": 2, "qty": 9 })
    );
    assert_eq!(
        fixture.scalar::<i64>("SELECT sum(qty) FROM line"),
        Some(2 + 9 + 4)
    );
}

#[tokio::test]
async fn update_without_values_reads_the_row() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("update_customer")
        .argument("id", json!(3))
        .fields(["name"]);

    assert_eq!(
        db.mutate(MutationKind::Update, "customer", &selection).await.unwrap(),
        json!({ "name": "cid" })
    );

    let statements = fixture.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].starts_with("SELECT"), "{}", statements[0]);
}

#[tokio::test]
async fn update_of_missing_row_is_null() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("update_customer")
        .argument("id", json!(99))
        .argument("values", json!({ "name": "nobody" }))
        .fields(["id"]);

    assert_eq!(
        db.mutate(MutationKind::Update, "customer", &selection).await.unwrap(),
        Json::Null
    );
}

#[tokio::test]
async fn delete_returns_the_removed_row() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("delete_line")
        .argument("order_id", json!(6))
        .argument("no", json!(1))
        .fields(["qty"])
        .select(Selection::new("line_order_id_fkey").alias("order").fields(["id"]));

    assert_eq!(
        db.mutate(MutationKind::Delete, "line", &selection).await.unwrap(),
        json!({ "qty": 4, "order": null })
    );
    assert_eq!(
        fixture.scalar::<i64>("SELECT count(*) FROM line WHERE order_id = 6"),
        Some(0)
    );

    // Deleting again matches nothing
    assert_eq!(
        db.mutate(MutationKind::Delete, "line", &selection).await.unwrap(),
        Json::Null
    );
}

#[tokio::test]
async fn relations_are_read_back_after_writing() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("insert_order")
        .argument("values", json!({ "customer_id": 4, "total": 1.5 }))
        .fields(["id"])
        .select(
            Selection::new("order_customer_id_fkey")
                .alias("customer")
                .fields(["name"]),
        );

    assert_eq!(
        db.mutate(MutationKind::Insert, "order", &selection).await.unwrap(),
        json!({ "id": 8, "customer": { "name": "dee" } })
    );

    let statements = fixture.statements();
    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("INSERT"));
    assert!(statements[1].starts_with("SELECT"));
}

#[tokio::test]
async fn missing_key_arguments_are_rejected() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("update_line")
        .argument("order_id", json!(1))
        .argument("values", json!({ "qty": 1 }));

    let err = db
        .mutate(MutationKind::Update, "line", &selection)
        .await
        .unwrap_err();
    assert!(err.is_invalid_request(), "{err}");
    assert!(fixture.statements().is_empty());
}

#[tokio::test]
async fn tables_without_primary_key_cannot_be_mutated() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("insert_tag").argument("values", json!({ "label": "x" }));

    let err = db
        .mutate(MutationKind::Insert, "tag", &selection)
        .await
        .unwrap_err();
    assert!(err.is_invalid_request());
}

#[tokio::test]
async fn badly_typed_values_are_rejected() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;

    let selection = Selection::new("insert_order")
        .argument("values", json!({ "total": "lots" }))
        .fields(["id"]);

    let err = db
        .mutate(MutationKind::Insert, "order", &selection)
        .await
        .unwrap_err();
    assert!(err.is_type_conversion(), "{err}");
    assert_eq!(fixture.scalar::<i64>("SELECT count(*) FROM \"order\""), Some(7));
}
