//! Partitioning a cart into one order per store.

use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::StoreRef;

use super::error::AssignmentError;
use crate::cart::CartItem;
use crate::orders::OrderLine;

/// The part of a cart fulfilled by one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOrderGroup {
    pub store: StoreRef,
    pub items: Vec<OrderLine>,
    /// Sum of `price × quantity` over `items`, unrounded.
    pub total: Decimal,
}

/// Group cart lines by owning store.
///
/// Composite product ids name their store; bare ids belong to the first
/// configured store. Groups appear in the order their first line does.
///
/// # Errors
///
/// Returns `AssignmentError::EmptyCart` for an empty cart and
/// `AssignmentError::Unassignable` when a bare id meets an empty store list.
pub fn split(
    items: &[CartItem],
    stores: &[StoreRef],
) -> Result<Vec<StoreOrderGroup>, AssignmentError> {
    if items.is_empty() {
        return Err(AssignmentError::EmptyCart);
    }

    let mut groups: Vec<StoreOrderGroup> = Vec::new();
    for item in items {
        let store = item
            .product_id
            .store()
            .or_else(|| stores.first())
            .ok_or_else(|| AssignmentError::Unassignable {
                product_id: item.product_id.clone(),
            })?;

        let line = OrderLine {
            id: item.product_id.doc_id().to_owned(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            image_url: item.image_url.clone(),
        };
        let line_total = line.line_total();

        if let Some(group) = groups.iter_mut().find(|g| &g.store == store) {
            group.items.push(line);
            group.total = group.total.saturating_add(line_total);
        } else {
            groups.push(StoreOrderGroup {
                store: store.clone(),
                items: vec![line],
                total: line_total,
            });
        }
    }

    Ok(groups)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::ProductId;

    fn item(id: &str, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::decode(id),
            name: format!("Item {id}"),
            price: Decimal::from(price),
            quantity,
            max_stock: 10,
            image_url: None,
        }
    }

    fn store(owner: &str, id: &str) -> StoreRef {
        StoreRef::parse(owner, id).unwrap()
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(
            split(&[], &[store("o", "s")]),
            Err(AssignmentError::EmptyCart)
        );
    }

    #[test]
    fn test_groups_by_composite_store() {
        let items = [
            item("ownerA|s1|d1", 4500, 1),
            item("ownerB|s2|d2", 1000, 2),
            item("ownerA|s1|d3", 500, 1),
        ];
        let groups = split(&items, &[]).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].store, store("ownerA", "s1"));
        assert_eq!(groups[0].total, Decimal::from(5000));
        assert_eq!(groups[0].items[1].id, "d3");
        assert_eq!(groups[1].store, store("ownerB", "s2"));
        assert_eq!(groups[1].total, Decimal::from(2000));
    }

    #[test]
    fn test_bare_ids_fall_back_to_first_store() {
        let items = [item("d1", 4500, 2), item("ownerA|s1|d2", 100, 1)];
        let groups = split(&items, &[store("ownerA", "s1"), store("ownerB", "s2")]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items[0].id, "d1");
        assert_eq!(groups[0].total, Decimal::from(9100));
    }

    #[test]
    fn test_bare_id_without_stores_is_unassignable() {
        let result = split(&[item("d1", 1, 1)], &[]);
        assert!(matches!(result, Err(AssignmentError::Unassignable { .. })));
    }

    #[test]
    fn test_every_item_lands_in_exactly_one_group() {
        let items = [
            item("a|s1|1", 1, 1),
            item("b|s2|2", 1, 1),
            item("3", 1, 1),
            item("a|s1|4", 1, 1),
        ];
        let groups = split(&items, &[store("c", "s3")]).unwrap();
        let lines: usize = groups.iter().map(|g| g.items.len()).sum();
        assert_eq!(lines, items.len());
        assert_eq!(groups.len(), 3);
    }
}
