//! Checkout command.

use bazaar_core::Money;
use bazaar_storefront::checkout::{
    CheckoutError, CheckoutForm, MobileMoneyForm, PaymentInput,
};
use bazaar_storefront::db::DocumentStore;
use bazaar_storefront::error::{StorefrontError, set_sentry_user};
use bazaar_storefront::state::AppState;

use super::{CommandError, cart, customer};
use crate::CheckoutArgs;

fn payment_input(args: &CheckoutArgs) -> PaymentInput {
    if args.cash {
        return PaymentInput::Cash;
    }
    PaymentInput::MobileMoney(MobileMoneyForm {
        payment_reference: args.reference.clone().unwrap_or_default(),
        sender_name: args.sender.clone().unwrap_or_default(),
        amount_sent: args.amount.clone().unwrap_or_default(),
        acknowledge_partial: args.acknowledge_partial,
    })
}

/// Place orders for the cart and print the receipt.
///
/// A failed write prints which orders were already placed before the error
/// is returned.
///
/// # Errors
///
/// Returns an error for invalid input or when an order cannot be written.
pub async fn run<S: DocumentStore + 'static>(
    state: &AppState<S>,
    args: CheckoutArgs,
) -> Result<(), CommandError> {
    let customer = customer(&args.customer, args.email.as_deref())?;
    set_sentry_user(&customer.id, customer.email.as_ref().map(|e| e.as_str()));

    let form = CheckoutForm {
        full_name: args.full_name.clone(),
        phone: args.phone.clone(),
        address: args.address.clone(),
        city: args.city.clone(),
        country: args.country.clone(),
    };
    let payment = payment_input(&args);
    let currency = state.config().currency;

    let mut cart = cart::open(state);
    cart::print_cart(&cart, currency);

    match state
        .checkout()
        .place_order(&mut cart, &customer, &form, &payment)
        .await
    {
        Ok(receipt) => {
            println!("Order {} placed.", receipt.order_number);
            for order in &receipt.orders {
                println!(
                    "  {} at {}: total {}, paid {} ({:?})",
                    order.order_ref.order_number,
                    order.order_ref.store,
                    Money::new(order.total, currency),
                    Money::new(order.paid_amount, currency),
                    order.payment_status,
                );
            }
            if let Some(message) = &receipt.payment_message {
                println!("{message}");
            }
            Ok(())
        }
        Err(CheckoutError::Write(failure)) => {
            for order in &failure.completed {
                println!(
                    "  Placed {} at {} before the failure",
                    order.order_ref.order_number, order.order_ref.store
                );
            }
            if let Some(order_id) = &failure.orphaned_order_id {
                println!(
                    "  Order {order_id} at {} was written without a customer ref",
                    failure.store
                );
            }
            for store in &failure.skipped {
                println!("  Not attempted: {store}");
            }
            Err(StorefrontError::from(CheckoutError::Write(failure)).into())
        }
        Err(CheckoutError::Validation(err)) => {
            println!("{err}");
            Err(StorefrontError::from(CheckoutError::Validation(err)).into())
        }
        Err(err) => Err(err.into()),
    }
}
