//! Inventory document to [`Product`] mapping.

use bazaar_core::{ProductId, StoreRef};

use super::Product;
use super::images;
use crate::db::{Record, fields};

/// Map one raw inventory document onto a [`Product`].
///
/// `id` is chosen by the caller (bare document id or composite id);
/// `origin` becomes the product's only store location.
#[must_use]
pub fn normalize(id: ProductId, origin: &StoreRef, data: &Record) -> Product {
    let image_urls = images::resolve(data);
    let image_url = image_urls.first().cloned();

    Product {
        id,
        name: fields::text_or_empty(data, &["name", "model"]),
        description: data
            .get("description")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        price: fields::amount(data, "price"),
        stock: fields::count(data, "stock"),
        category: fields::text_or_empty(data, &["category"]),
        is_accessory: fields::flag(data, "isAccessory"),
        is_custom_item: fields::flag(data, "isCustomItem"),
        color: fields::text(data, &["color", "colour"]),
        storage: fields::text(data, &["storage", "storageCapacity"]),
        image_urls,
        image_url,
        created_at: fields::timestamp(data, "createdAt"),
        store_locations: vec![origin.clone()],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bazaar_core::Category;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn origin() -> StoreRef {
        StoreRef::parse("ownerA", "s1").unwrap()
    }

    #[test]
    fn test_full_document() {
        let data = record(json!({
            "name": " iPhone 13 ",
            "description": "Clean, unlocked",
            "price": 4500,
            "stock": 3,
            "category": "Phone",
            "color": "Black",
            "storage": "128GB",
            "imageUrls": ["https://a/1.jpg", "https://a/2.jpg"],
            "createdAt": {"seconds": 1_700_000_000}
        }));
        let product = normalize(ProductId::Local("d1".into()), &origin(), &data);

        assert_eq!(product.name, "iPhone 13");
        assert_eq!(product.price, Decimal::from(4500));
        assert_eq!(product.stock, 3);
        assert_eq!(product.color.as_deref(), Some("Black"));
        assert_eq!(product.storage.as_deref(), Some("128GB"));
        assert_eq!(product.image_url.as_deref(), Some("https://a/1.jpg"));
        assert_eq!(product.store_locations, vec![origin()]);
        assert_eq!(product.category(), Category::Devices);
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_alternate_field_names() {
        let data = record(json!({
            "model": "Galaxy S21",
            "colour": "Blue",
            "storageCapacity": "256GB",
            "price": "3200.50",
            "stock": "4"
        }));
        let product = normalize(ProductId::Local("d2".into()), &origin(), &data);
        assert_eq!(product.name, "Galaxy S21");
        assert_eq!(product.color.as_deref(), Some("Blue"));
        assert_eq!(product.storage.as_deref(), Some("256GB"));
        assert_eq!(product.price, "3200.50".parse::<Decimal>().unwrap());
        assert_eq!(product.stock, 4);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let product = normalize(ProductId::Local("d3".into()), &origin(), &Record::new());
        assert_eq!(product.name, "");
        assert_eq!(product.description, "");
        assert_eq!(product.category, "");
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.stock, 0);
        assert!(product.color.is_none());
        assert!(product.image_urls.is_empty());
        assert!(product.image_url.is_none());
        assert!(!product.in_stock());
    }

    #[test]
    fn test_non_numeric_values_become_zero() {
        let data = record(json!({"price": "call us", "stock": {"n": 1}}));
        let product = normalize(ProductId::Local("d4".into()), &origin(), &data);
        assert_eq!(product.price, Decimal::ZERO);
        assert_eq!(product.stock, 0);
    }
}
