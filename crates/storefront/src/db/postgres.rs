//! `PostgreSQL` document store.
//!
//! Documents live in a single JSONB table keyed by `(collection, id)`; see
//! `migrations/` for the schema. Queries are built at runtime so the crate
//! compiles without a live database.

use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;

use super::{CollectionPath, Document, DocumentStore, ListFilter, Record, StoreError};

/// Document store backed by the `storefront.documents` table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert or replace a document with a known id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn upsert(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Record,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO storefront.documents (collection, id, data) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data",
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(Value::Object(data)))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn into_document(collection: &CollectionPath, id: String, data: Value) -> Result<Document, StoreError> {
    match data {
        Value::Object(data) => Ok(Document { id, data }),
        _ => Err(StoreError::DataCorruption(format!(
            "document {collection}/{id} is not an object"
        ))),
    }
}

impl DocumentStore for PgDocumentStore {
    async fn list(
        &self,
        collection: &CollectionPath,
        filter: ListFilter,
    ) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<(String, Json<Value>)> = match filter {
            ListFilter::All => {
                sqlx::query_as(
                    "SELECT id, data FROM storefront.documents \
                     WHERE collection = $1 \
                     ORDER BY created_at, id",
                )
                .bind(collection.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            ListFilter::AtLeast { field, min } => {
                sqlx::query_as(
                    "SELECT id, data FROM storefront.documents \
                     WHERE collection = $1 \
                       AND CASE WHEN jsonb_typeof(data -> $2) = 'number' \
                                THEN (data ->> $2)::float8 >= $3 \
                                ELSE false END \
                     ORDER BY created_at, id",
                )
                .bind(collection.as_str())
                .bind(field)
                .bind(min)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter()
            .map(|(id, Json(data))| into_document(collection, id, data))
            .collect()
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let row: Option<(String, Json<Value>)> = sqlx::query_as(
            "SELECT id, data FROM storefront.documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id, Json(data))| into_document(collection, id, data))
            .transpose()
    }

    async fn add(&self, collection: &CollectionPath, data: Record) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        sqlx::query("INSERT INTO storefront.documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection.as_str())
            .bind(&id)
            .bind(Json(Value::Object(data)))
            .execute(&self.pool)
            .await?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_document_rejects_non_object() {
        let path = CollectionPath::new("c");
        assert!(into_document(&path, "a".into(), json!({"x": 1})).is_ok());
        assert!(matches!(
            into_document(&path, "a".into(), json!("text")),
            Err(StoreError::DataCorruption(_))
        ));
    }
}
