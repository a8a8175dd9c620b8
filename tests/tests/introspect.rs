use tests::*;

use pretty_assertions::assert_eq;
use relgraph::schema::{Scalar, Vendor};

#[tokio::test]
async fn reads_tables_keys_and_references() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;
    let schema = db.schema();

    assert_eq!(schema.vendor, Vendor::Sqlite);
    assert_eq!(
        schema.tables.keys().map(String::as_str).collect::<Vec<_>>(),
        ["customer", "line", "order", "tag"]
    );

    let line = schema.table("line").unwrap();
    assert_eq!(line.primary_key_columns(), ["order_id", "no"]);
    assert_eq!(line.outgoing.len(), 1);

    let fk = &line.outgoing[0];
    assert_eq!(fk.name, "line_order_id_fkey");
    assert_eq!(fk.to_table, "order");
    assert_eq!(fk.to_columns().collect::<Vec<_>>(), ["id"]);

    let order = schema.table("order").unwrap();
    assert!(order.incoming("line_order_id_fkey_reverse").is_some());
    assert!(order.outgoing("order_customer_id_fkey").is_some());

    let tag = schema.table("tag").unwrap();
    assert!(tag.primary_key.is_none());
}

#[tokio::test]
async fn maps_declared_types() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;
    let schema = db.schema();

    let order = schema.table("order").unwrap();
    let scalars = schema
        .mapped_columns(order)
        .map(|(column, mapping)| (column.name.as_str(), mapping.scalar))
        .collect::<Vec<_>>();

    assert_eq!(
        scalars,
        [
            ("id", Scalar::Long),
            ("customer_id", Scalar::Long),
            ("total", Scalar::Float),
            ("placed_at", Scalar::DateTime),
        ]
    );

    // Blobs have no mapping and are left out
    let tag = schema.table("tag").unwrap();
    assert_eq!(schema.mapped_columns(tag).count(), 1);
}

#[tokio::test]
async fn connects_by_url() {
    let db = Db::connect("sqlite::memory:").await.unwrap();
    assert!(db.schema().tables.is_empty());
    assert_eq!(db.driver().max_connections(), Some(1));

    let err = Db::connect("mysql://localhost/shop").await.unwrap_err();
    assert!(err.is_invalid_connection_url(), "{err}");
}

#[tokio::test]
async fn dangling_references_are_skipped() {
    let mut fixture = Fixture::new(
        r#"
        CREATE TABLE customer (id INTEGER PRIMARY KEY, name TEXT);
        CREATE TABLE audit (
            id INTEGER PRIMARY KEY,
            customer_id INTEGER REFERENCES customer (id),
            user_id INTEGER REFERENCES legacy_user (id),
            owner_id INTEGER REFERENCES legacy_owner
        );
        INSERT INTO customer VALUES (1, 'ann');
        INSERT INTO audit VALUES (1, 1, 7, 8);
        "#,
    );
    let db = fixture.db().await;

    let audit = db.schema().table("audit").unwrap();
    assert_eq!(
        audit.outgoing.iter().map(|fk| fk.name.as_str()).collect::<Vec<_>>(),
        ["audit_customer_id_fkey"]
    );

    let selection = Selection::new("audit")
        .fields(["id", "user_id"])
        .select(Selection::new("audit_customer_id_fkey").fields(["name"]));
    assert_eq!(
        db.query("audit", &selection).await.unwrap(),
        vec![json!({ "id": 1, "user_id": 7, "audit_customer_id_fkey": { "name": "ann" } })]
    );
}

#[tokio::test]
async fn closed_handles_reject_requests() {
    let mut fixture = Fixture::shop();
    let db = fixture.db().await;
    let clone = db.clone();

    let selection = Selection::new("customer").fields(["id"]);
    assert_eq!(db.query("customer", &selection).await.unwrap().len(), 4);

    db.close();

    let err = clone.query("customer", &selection).await.unwrap_err();
    assert!(err.is_connection_pool(), "{err}");
}
