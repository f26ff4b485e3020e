//! Plain-text rendering of backend entities for the shell.

use shopping_portal_core::{Cart, CartEntry, Item, Order};

/// Shown when every server cart has no items.
pub const EMPTY_CART: &str = "Your cart is empty";

/// Shown when the order history is empty.
pub const NO_ORDERS: &str = "No orders yet";

/// Shown when the catalog is empty.
pub const NO_ITEMS: &str = "No items available";

/// Shown when nothing was added in this session.
pub const NO_ENTRIES: &str = "Nothing added this session";

/// The catalog, one item per line.
pub fn catalog(items: &[Item]) -> String {
    if items.is_empty() {
        return NO_ITEMS.to_string();
    }
    let lines: Vec<String> = items
        .iter()
        .map(|item| format!("Item ID: {}, Item Name: {}", item.id, item.name))
        .collect();
    format!("Available items:\n{}", lines.join("\n"))
}

/// A single locally recorded add.
pub fn entry(entry: &CartEntry) -> String {
    format!(
        "Cart ID: {}, Item ID: {}, Item Name: {}",
        entry.cart_id,
        entry.item_id,
        entry.item_name.as_deref().unwrap_or("(unknown)")
    )
}

/// Every locally recorded add, oldest first.
pub fn entries(entries: &[CartEntry]) -> String {
    if entries.is_empty() {
        return NO_ENTRIES.to_string();
    }
    entries.iter().map(entry).collect::<Vec<_>>().join("\n")
}

/// The server's cart listing, one line per item in every cart.
pub fn carts(carts: &[Cart]) -> String {
    let lines: Vec<String> = carts
        .iter()
        .flat_map(|cart| {
            cart.items.iter().map(move |item| {
                format!(
                    "Cart ID: {}, Item ID: {}, Item Name: {}",
                    cart.id, item.id, item.name
                )
            })
        })
        .collect();

    if lines.is_empty() {
        EMPTY_CART.to_string()
    } else {
        lines.join("\n")
    }
}

/// The order history, one line per order with its UTC date.
pub fn orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return NO_ORDERS.to_string();
    }
    orders
        .iter()
        .map(|order| {
            format!(
                "Order ID: {}, Cart ID: {}, Date: {}",
                order.id,
                order.cart_id,
                order.created_at.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use shopping_portal_core::{CartId, ItemId, OrderId};

    use super::*;

    fn widget() -> Item {
        Item {
            id: ItemId::from(1),
            name: "Widget".to_string(),
        }
    }

    #[test]
    fn test_carts_list_every_item() {
        let listing = vec![Cart {
            id: CartId::from("C1"),
            items: vec![widget(), widget()],
        }];
        assert_eq!(
            carts(&listing),
            "Cart ID: C1, Item ID: 1, Item Name: Widget\nCart ID: C1, Item ID: 1, Item Name: Widget"
        );
    }

    #[test]
    fn test_carts_without_items_render_empty() {
        assert_eq!(carts(&[]), EMPTY_CART);

        let listing = vec![
            Cart {
                id: CartId::from(1),
                items: vec![],
            },
            Cart {
                id: CartId::from(2),
                items: vec![],
            },
        ];
        assert_eq!(carts(&listing), EMPTY_CART);
    }

    #[test]
    fn test_orders_show_utc_date() {
        let history = vec![Order {
            id: OrderId::from("O1"),
            cart_id: CartId::from("C1"),
            created_at: Utc
                .with_ymd_and_hms(2024, 3, 1, 23, 59, 0)
                .single()
                .expect("valid date"),
        }];
        assert_eq!(
            orders(&history),
            "Order ID: O1, Cart ID: C1, Date: 2024-03-01"
        );
        assert_eq!(orders(&[]), NO_ORDERS);
    }

    #[test]
    fn test_entry_without_name() {
        let unnamed = CartEntry {
            cart_id: CartId::from("C1"),
            item_id: ItemId::from(99),
            item_name: None,
        };
        assert_eq!(
            entry(&unnamed),
            "Cart ID: C1, Item ID: 99, Item Name: (unknown)"
        );
        assert_eq!(entries(&[]), NO_ENTRIES);
    }

    #[test]
    fn test_catalog() {
        assert_eq!(catalog(&[]), NO_ITEMS);
        assert_eq!(
            catalog(&[widget()]),
            "Available items:\nItem ID: 1, Item Name: Widget"
        );
    }
}
