//! Orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{CartId, OrderId};

/// A completed purchase created by checking out a cart.
///
/// Orders are immutable once created. `created_at` accepts any RFC 3339
/// offset and is normalized to UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Server-issued order id.
    pub id: OrderId,
    /// The cart this order was created from.
    pub cart_id: CartId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
