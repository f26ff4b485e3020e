//! Cart types.
//!
//! Two views of a cart exist and they are deliberately separate:
//!
//! - [`Cart`] is the server's record, fetched on demand and never cached.
//! - [`CartEntry`] is the client's own note that a particular add succeeded.
//!   Entries are advisory and may diverge from the server until the next
//!   explicit fetch.

use serde::{Deserialize, Serialize};

use super::id::{CartId, ItemId};
use super::item::Item;

/// A server-side cart with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Server-issued cart id.
    pub id: CartId,
    /// Items in the cart. The backend omits the field when the cart is empty.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Cart {
    /// Whether this cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One locally known association between a server cart and an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Cart id returned by the add request.
    pub cart_id: CartId,
    /// Item that was added.
    pub item_id: ItemId,
    /// Name from the local catalog; `None` when the item was not cached.
    pub item_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_without_items_field_is_empty() {
        let cart: Cart = serde_json::from_str(r#"{"id":3,"status":"ordered"}"#).expect("valid");
        assert_eq!(cart.id, CartId::from(3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_with_items() {
        let cart: Cart = serde_json::from_str(
            r#"{"id":"C1","items":[{"id":1,"name":"Widget"},{"id":1,"name":"Widget"}]}"#,
        )
        .expect("valid");
        assert_eq!(cart.items.len(), 2);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_cart_rejects_wrong_item_shape() {
        assert!(serde_json::from_str::<Cart>(r#"{"id":1,"items":[{"id":1}]}"#).is_err());
    }
}
