//! Order history commands.

use bazaar_core::CustomerId;
use bazaar_storefront::db::DocumentStore;
use bazaar_storefront::orders::{OrderView, has_pending_orders};
use bazaar_storefront::state::AppState;

use super::CommandError;

fn print_summary(order: &OrderView) {
    let placed = order
        .created_at
        .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
    println!(
        "{:<10} {:<26} {:<16} {:>14}  {:?}",
        order.ref_id,
        order.order_number,
        placed,
        order.total_money().to_string(),
        order.status,
    );
}

fn print_detail(order: &OrderView) {
    println!("Order {}", order.order_number);
    println!("  Store:    {}", order.store);
    println!("  Status:   {:?}", order.status);
    if let Some(method) = &order.payment_method {
        println!("  Payment:  {method}");
    }
    if let Some(status) = order.payment_status {
        println!("  Paid:     {status:?}");
    }
    if let Some(info) = &order.customer_info {
        println!("  Customer: {}", info.name);
        if let Some(address) = &info.address {
            println!("  Address:  {address}");
        }
    }
    for line in &order.items {
        println!("  {} x {} @ {}", line.quantity, line.name, line.price);
    }
    println!("  Total:    {}", order.total_money());
}

/// List a customer's orders, or show one by ref id.
///
/// # Errors
///
/// Returns an error for an invalid customer id, a missing order, or a
/// failed read of the customer's refs.
pub async fn run<S: DocumentStore + 'static>(
    state: &AppState<S>,
    customer: &str,
    ref_id: Option<&str>,
) -> Result<(), CommandError> {
    let customer = CustomerId::parse(customer)?;

    if let Some(ref_id) = ref_id {
        let order = state.history().view_order(&customer, ref_id).await?;
        print_detail(&order);
        return Ok(());
    }

    let orders = state.history().list_orders(&customer).await?;
    if orders.is_empty() {
        println!("No orders yet.");
        return Ok(());
    }
    for order in &orders {
        print_summary(order);
    }
    if has_pending_orders(&orders) {
        println!("Some orders are still pending with the store.");
    }
    Ok(())
}
