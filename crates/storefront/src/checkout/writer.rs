//! Persisting split orders and the customer's refs.
//!
//! Writes are sequential: for each store the order is written, then the ref
//! pointing at it. The first failure stops the checkout and reports exactly
//! what exists, so nothing is retried or rolled back here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info, instrument};

use bazaar_core::{CurrencyCode, OrderStatus, PaymentStatus, StoreRef};

use super::error::{WriteError, WriteStage};
use super::payment::{Allocation, Payment, allocate};
use super::split::StoreOrderGroup;
use crate::db::{CollectionPath, DocumentStore, StoreError, to_record};
use crate::models::Customer;
use crate::orders::{CustomerInfo, Order, OrderRef, base_order_number, order_number};

/// Everything about a checkout that is the same for every store order.
#[derive(Debug, Clone, Copy)]
pub struct CommitRequest<'a> {
    pub customer: &'a Customer,
    pub customer_info: &'a CustomerInfo,
    pub payment: &'a Payment,
    pub currency: CurrencyCode,
    pub placed_at: DateTime<Utc>,
}

/// A store order whose order and ref documents were both written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedOrder {
    pub order_ref: OrderRef,
    /// Ref document id in the customer's index.
    pub ref_id: String,
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub payment_status: PaymentStatus,
}

fn build_order(
    group: &StoreOrderGroup,
    allocation: &Allocation,
    number: String,
    request: &CommitRequest<'_>,
) -> Order {
    let (payment_reference, payment_sender_name) = match request.payment {
        Payment::MobileMoney(momo) => (Some(momo.reference.clone()), Some(momo.sender_name.clone())),
        Payment::Cash => (None, None),
    };

    Order {
        order_number: number,
        status: OrderStatus::Pending,
        items: group.items.clone(),
        total: allocation.total,
        currency: request.currency,
        customer_info: request.customer_info.clone(),
        customer_id: request.customer.id.to_string(),
        customer_email: request.customer.email.as_ref().map(ToString::to_string),
        payment_method: request.payment.method(),
        payment_status: allocation.payment_status,
        paid_amount: allocation.paid_amount,
        payment_reference,
        payment_sender_name,
        created_at: request.placed_at,
    }
}

/// Write one order per group plus a ref per order.
///
/// Order numbers share a base derived from `placed_at`; with several groups
/// each gets a `-{n}` suffix in group order.
///
/// # Errors
///
/// Returns a [`WriteError`] describing the failed write together with the
/// orders already committed, a possibly orphaned order id, and the stores
/// never attempted.
#[instrument(skip_all, fields(customer_id = %request.customer.id, stores = groups.len()))]
pub async fn commit<S: DocumentStore>(
    db: &S,
    groups: &[StoreOrderGroup],
    request: &CommitRequest<'_>,
) -> Result<Vec<CommittedOrder>, WriteError> {
    let base = base_order_number(request.placed_at);
    let allocations = allocate(groups, request.payment);
    let refs_path = CollectionPath::order_refs(&request.customer.id);
    let mut committed: Vec<CommittedOrder> = Vec::with_capacity(groups.len());

    for (index, (group, allocation)) in groups.iter().zip(&allocations).enumerate() {
        let number = order_number(&base, index, groups.len());
        let skipped = || -> Vec<StoreRef> {
            groups
                .iter()
                .skip(index + 1)
                .map(|g| g.store.clone())
                .collect()
        };
        let fail = |stage: WriteStage,
                    committed: Vec<CommittedOrder>,
                    orphaned_order_id: Option<String>,
                    source: StoreError| {
            error!(
                store = %group.store,
                order_number = %number,
                %stage,
                error = %source,
                "Checkout write failed"
            );
            WriteError {
                stage,
                store: group.store.clone(),
                order_number: number.clone(),
                completed: committed,
                orphaned_order_id,
                skipped: skipped(),
                source,
            }
        };

        let order = build_order(group, allocation, number.clone(), request);
        let order_id = match write_order(db, &group.store, &order).await {
            Ok(id) => id,
            Err(e) => return Err(fail(WriteStage::Order, committed, None, e)),
        };

        let order_ref = OrderRef {
            store: group.store.clone(),
            order_id: order_id.clone(),
            order_number: number.clone(),
            created_at: request.placed_at,
        };
        let ref_id = match to_record(&order_ref) {
            Ok(record) => db.add(&refs_path, record).await,
            Err(e) => Err(e),
        };
        let ref_id = match ref_id {
            Ok(id) => id,
            Err(e) => return Err(fail(WriteStage::OrderRef, committed, Some(order_id), e)),
        };

        info!(
            store = %group.store,
            order_number = %number,
            order_id = %order_id,
            payment_status = ?allocation.payment_status,
            "Order placed"
        );
        committed.push(CommittedOrder {
            order_ref,
            ref_id,
            total: allocation.total,
            paid_amount: allocation.paid_amount,
            payment_status: allocation.payment_status,
        });
    }

    Ok(committed)
}

async fn write_order<S: DocumentStore>(
    db: &S,
    store: &StoreRef,
    order: &Order,
) -> Result<String, StoreError> {
    let record = to_record(order)?;
    db.add(&CollectionPath::website_orders(store), record).await
}
