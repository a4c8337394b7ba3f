//! `PgDocumentStore` against a live database.
//!
//! These tests require a migrated `PostgreSQL` database:
//!
//! ```bash
//! bazaar migrate
//! BAZAAR_TEST_DATABASE_URL=postgres://... cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! Every test writes under its own collection prefix so runs never collide.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;

use bazaar_storefront::catalog::{StockFilter, aggregate};
use bazaar_storefront::db::{
    CollectionPath, DocumentStore, ListFilter, PgDocumentStore, Record, create_pool,
};

async fn connect() -> PgDocumentStore {
    let url = std::env::var("BAZAAR_TEST_DATABASE_URL")
        .expect("BAZAAR_TEST_DATABASE_URL must be set for database tests");
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    PgDocumentStore::new(pool)
}

fn unique_collection(name: &str) -> CollectionPath {
    CollectionPath::new(format!("test-{}/{name}", Uuid::new_v4().simple()))
}

fn record(value: serde_json::Value) -> Record {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn added_documents_can_be_read_back() {
    let db = connect().await;
    let collection = unique_collection("websiteOrders");

    let id = db
        .add(&collection, record(json!({"orderNumber": "#WW-1", "total": 25.5})))
        .await
        .unwrap();
    assert!(!id.is_empty());

    let document = db.get(&collection, &id).await.unwrap().unwrap();
    assert_eq!(document.id, id);
    assert_eq!(document.data["orderNumber"], json!("#WW-1"));
    assert_eq!(document.data["total"], json!(25.5));

    assert!(db.get(&collection, "missing").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn upsert_replaces_existing_document() {
    let db = connect().await;
    let collection = unique_collection("inventory");

    db.upsert(&collection, "d1", record(json!({"name": "Case", "stock": 1})))
        .await
        .unwrap();
    db.upsert(&collection, "d1", record(json!({"name": "Case", "stock": 4})))
        .await
        .unwrap();

    let documents = db.list(&collection, ListFilter::All).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].data["stock"], json!(4));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn stock_filter_at_source_skips_text_and_empty_stock() {
    let db = connect().await;
    let collection = unique_collection("inventory");

    db.upsert(&collection, "a", record(json!({"stock": 3}))).await.unwrap();
    db.upsert(&collection, "b", record(json!({"stock": 0}))).await.unwrap();
    db.upsert(&collection, "c", record(json!({"stock": "5"}))).await.unwrap();
    db.upsert(&collection, "d", record(json!({}))).await.unwrap();

    let filter = ListFilter::AtLeast {
        field: "stock",
        min: 1.0,
    };
    let ids: Vec<String> = db
        .list(&collection, filter)
        .await
        .unwrap()
        .into_iter()
        .map(|doc| doc.id)
        .collect();
    assert_eq!(ids, vec!["a"]);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn catalog_aggregates_from_postgres() {
    let db = connect().await;
    let owner = format!("owner-{}", Uuid::new_v4().simple());
    let store = bazaar_core::StoreRef::parse(&owner, "s1").unwrap();

    db.upsert(
        &CollectionPath::inventory(&store),
        "d1",
        record(json!({"name": "iPhone 13", "price": 4500, "stock": 2})),
    )
    .await
    .unwrap();
    db.upsert(
        &CollectionPath::inventory(&store),
        "d2",
        record(json!({"name": "Pixel 7", "price": 3000, "stock": 0})),
    )
    .await
    .unwrap();

    let products = aggregate(&db, &[store], StockFilter::AtSource).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "iPhone 13");
}
