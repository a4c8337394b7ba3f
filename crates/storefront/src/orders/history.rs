//! "My orders": resolving a customer's order refs back to store orders.
//!
//! Listing is driven entirely by the customer's `orderRefs`; an order whose
//! ref was never written does not appear here even though the store has it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use bazaar_core::{CurrencyCode, CustomerId, Money, OrderStatus, PaymentStatus, StoreRef};

use super::{CustomerInfo, OrderLine};
use crate::db::{CollectionPath, Document, DocumentStore, ListFilter, Record, StoreError, fields};

/// Errors from order history lookups.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Order not found")]
    NotFound,

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

/// A store order as shown to the customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    /// Order document id within the store's order collection.
    pub id: String,
    /// Ref document id within the customer's index.
    pub ref_id: String,
    pub store: StoreRef,
    pub order_number: String,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub currency: Option<CurrencyCode>,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub paid_amount: Option<Decimal>,
    pub customer_info: Option<CustomerInfo>,
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderView {
    /// The order total in its currency (cedis when unspecified).
    #[must_use]
    pub fn total_money(&self) -> Money {
        Money::new(self.total, self.currency.unwrap_or_default())
    }
}

/// Whether any order is still awaiting the store.
#[must_use]
pub fn has_pending_orders(orders: &[OrderView]) -> bool {
    orders.iter().any(|order| order.status.is_pending())
}

/// A parsed `orderRefs` document.
struct RefEntry {
    ref_id: String,
    store: StoreRef,
    order_id: String,
    order_number: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl RefEntry {
    fn parse(document: &Document) -> Option<Self> {
        let data = &document.data;
        let store = StoreRef::parse(
            &fields::text_or_empty(data, &["ownerId"]),
            &fields::text_or_empty(data, &["storeId"]),
        )
        .ok()?;
        let order_id = fields::text(data, &["orderId"])?;

        Some(Self {
            ref_id: document.id.clone(),
            store,
            order_id,
            order_number: fields::text(data, &["orderNumber"]),
            created_at: fields::timestamp(data, "createdAt"),
        })
    }
}

fn parse_line(value: &Value) -> Option<OrderLine> {
    let data = value.as_object()?;
    Some(OrderLine {
        id: fields::text_or_empty(data, &["id"]),
        name: fields::text_or_empty(data, &["name"]),
        price: fields::amount(data, "price"),
        quantity: fields::count(data, "quantity"),
        image_url: fields::text(data, &["imageUrl"]),
    })
}

fn parse_customer_info(data: &Record) -> Option<CustomerInfo> {
    let info = data.get("customerInfo")?.as_object()?;
    Some(CustomerInfo {
        name: fields::text_or_empty(info, &["name"]),
        phone: fields::text(info, &["phone"]),
        email: fields::text(info, &["email"]),
        address: fields::text(info, &["address"]),
    })
}

fn build_view(entry: &RefEntry, order: Document) -> OrderView {
    let data = &order.data;
    let items = match data.get("items") {
        Some(Value::Array(items)) => items.iter().filter_map(parse_line).collect(),
        _ => Vec::new(),
    };

    OrderView {
        id: order.id.clone(),
        ref_id: entry.ref_id.clone(),
        store: entry.store.clone(),
        order_number: entry
            .order_number
            .clone()
            .or_else(|| fields::text(data, &["orderNumber"]))
            .unwrap_or_default(),
        items,
        total: fields::amount(data, "total"),
        currency: fields::text(data, &["currency"]).and_then(|c| c.parse().ok()),
        status: data
            .get("status")
            .and_then(|s| serde_json::from_value(s.clone()).ok())
            .unwrap_or_default(),
        payment_method: fields::text(data, &["paymentMethod"]),
        payment_status: data
            .get("paymentStatus")
            .and_then(|s| serde_json::from_value(s.clone()).ok()),
        paid_amount: data.get("paidAmount").and_then(fields::decimal),
        customer_info: parse_customer_info(data),
        created_at: fields::timestamp(data, "createdAt").or(entry.created_at),
    }
}

/// Read access to a customer's orders.
pub struct OrderHistory<S> {
    db: Arc<S>,
}

impl<S: DocumentStore> OrderHistory<S> {
    #[must_use]
    pub const fn new(db: Arc<S>) -> Self {
        Self { db }
    }

    /// All of a customer's orders, newest first.
    ///
    /// Refs that are malformed, or whose order is missing or unreadable, are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Store` if the customer's refs cannot be read.
    #[instrument(skip(self), fields(customer_id = %customer))]
    pub async fn list_orders(&self, customer: &CustomerId) -> Result<Vec<OrderView>, HistoryError> {
        let documents = self
            .db
            .list(&CollectionPath::order_refs(customer), ListFilter::All)
            .await?;

        let mut entries: Vec<RefEntry> = documents
            .iter()
            .filter_map(|document| {
                let entry = RefEntry::parse(document);
                if entry.is_none() {
                    warn!(ref_id = %document.id, "Skipping malformed order ref");
                }
                entry
            })
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let paths: Vec<CollectionPath> = entries
            .iter()
            .map(|entry| CollectionPath::website_orders(&entry.store))
            .collect();
        let orders = join_all(
            entries
                .iter()
                .zip(&paths)
                .map(|(entry, path)| self.db.get(path, &entry.order_id)),
        )
        .await;

        let views: Vec<OrderView> = entries
            .iter()
            .zip(orders)
            .filter_map(|(entry, order)| match order {
                Ok(Some(order)) => Some(build_view(entry, order)),
                Ok(None) => {
                    debug!(ref_id = %entry.ref_id, "Order for ref no longer exists");
                    None
                }
                Err(e) => {
                    warn!(ref_id = %entry.ref_id, error = %e, "Failed to read order");
                    None
                }
            })
            .collect();

        Ok(views)
    }

    /// One order, addressed by its ref id.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::NotFound` when the ref or its order is missing
    /// or the ref is malformed, and `HistoryError::Store` when a read fails.
    #[instrument(skip(self), fields(customer_id = %customer))]
    pub async fn view_order(
        &self,
        customer: &CustomerId,
        ref_id: &str,
    ) -> Result<OrderView, HistoryError> {
        let document = self
            .db
            .get(&CollectionPath::order_refs(customer), ref_id)
            .await?
            .ok_or(HistoryError::NotFound)?;
        let entry = RefEntry::parse(&document).ok_or(HistoryError::NotFound)?;

        let order = self
            .db
            .get(
                &CollectionPath::website_orders(&entry.store),
                &entry.order_id,
            )
            .await?
            .ok_or(HistoryError::NotFound)?;

        Ok(build_view(&entry, order))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn customer() -> CustomerId {
        CustomerId::parse("cust-1").unwrap()
    }

    async fn seed_order(
        db: &MemoryDocumentStore,
        store: &StoreRef,
        order_id: &str,
        ref_id: &str,
        created_at: &str,
        status: &str,
    ) {
        db.insert(
            &CollectionPath::website_orders(store),
            order_id,
            record(json!({
                "orderNumber": format!("#WW-{order_id}"),
                "status": status,
                "items": [{"id": "d1", "name": "iPhone 13", "price": 4500, "quantity": 2}],
                "total": 9000,
                "currency": "GHS",
                "paymentMethod": "Cash",
                "paymentStatus": "unpaid",
                "paidAmount": 0,
                "createdAt": created_at,
            })),
        )
        .await;
        db.insert(
            &CollectionPath::order_refs(&customer()),
            ref_id,
            record(json!({
                "ownerId": store.owner_id.as_str(),
                "storeId": store.store_id.as_str(),
                "orderId": order_id,
                "orderNumber": format!("#WW-{order_id}"),
                "createdAt": created_at,
            })),
        )
        .await;
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_across_stores() {
        let db = Arc::new(MemoryDocumentStore::new());
        let s1 = StoreRef::parse("ownerA", "s1").unwrap();
        let s2 = StoreRef::parse("ownerB", "s2").unwrap();
        seed_order(&db, &s1, "o1", "r1", "2024-01-01T00:00:00Z", "completed").await;
        seed_order(&db, &s2, "o2", "r2", "2024-02-01T00:00:00Z", "pending").await;

        let history = OrderHistory::new(Arc::clone(&db));
        let orders = history.list_orders(&customer()).await.unwrap();

        let numbers: Vec<_> = orders.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, ["#WW-o2", "#WW-o1"]);
        assert_eq!(orders[0].store, s2);
        assert_eq!(orders[0].items[0].quantity, 2);
        assert_eq!(orders[0].total, Decimal::from(9000));
        assert_eq!(orders[0].payment_status, Some(PaymentStatus::Unpaid));
        assert_eq!(orders[0].total_money().to_string(), "GH₵9000.00");
        assert!(has_pending_orders(&orders));
    }

    #[tokio::test]
    async fn test_list_orders_skips_missing_and_unreadable() {
        let db = Arc::new(MemoryDocumentStore::new());
        let s1 = StoreRef::parse("ownerA", "s1").unwrap();
        let s2 = StoreRef::parse("ownerB", "s2").unwrap();
        seed_order(&db, &s1, "o1", "r1", "2024-01-01T00:00:00Z", "completed").await;
        seed_order(&db, &s2, "o2", "r2", "2024-02-01T00:00:00Z", "pending").await;
        db.insert(
            &CollectionPath::order_refs(&customer()),
            "dangling",
            record(json!({"ownerId": "ownerA", "storeId": "s1", "orderId": "gone"})),
        )
        .await;
        db.insert(
            &CollectionPath::order_refs(&customer()),
            "malformed",
            record(json!({"orderId": "o1"})),
        )
        .await;
        db.fail_reads(&CollectionPath::website_orders(&s2)).await;

        let history = OrderHistory::new(Arc::clone(&db));
        let orders = history.list_orders(&customer()).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, "o1");
        assert!(!has_pending_orders(&orders));
    }

    #[tokio::test]
    async fn test_unknown_status_is_tolerated() {
        let db = Arc::new(MemoryDocumentStore::new());
        let s1 = StoreRef::parse("ownerA", "s1").unwrap();
        seed_order(&db, &s1, "o1", "r1", "2024-01-01T00:00:00Z", "shipped").await;

        let history = OrderHistory::new(Arc::clone(&db));
        let order = history.view_order(&customer(), "r1").await.unwrap();
        assert_eq!(order.status, OrderStatus::Other);
        assert_eq!(order.ref_id, "r1");
    }

    #[tokio::test]
    async fn test_view_order_not_found() {
        let db = Arc::new(MemoryDocumentStore::new());
        let history = OrderHistory::new(Arc::clone(&db));
        assert!(matches!(
            history.view_order(&customer(), "nope").await,
            Err(HistoryError::NotFound)
        ));

        db.insert(
            &CollectionPath::order_refs(&customer()),
            "r1",
            record(json!({"ownerId": "ownerA", "storeId": "s1", "orderId": "gone"})),
        )
        .await;
        assert!(matches!(
            history.view_order(&customer(), "r1").await,
            Err(HistoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_refs_read_failure_is_an_error() {
        let db = Arc::new(MemoryDocumentStore::new());
        db.fail_reads(&CollectionPath::order_refs(&customer())).await;
        let history = OrderHistory::new(Arc::clone(&db));
        assert!(matches!(
            history.list_orders(&customer()).await,
            Err(HistoryError::Store(_))
        ));
    }
}
