//! Catalog items.

use serde::{Deserialize, Serialize};

use super::id::ItemId;

/// A purchasable item as listed by the backend catalog.
///
/// Items are immutable from the client's perspective. Any extra fields the
/// backend sends (status, timestamps) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Server-issued item id.
    pub id: ItemId,
    /// Display name.
    pub name: String,
}
