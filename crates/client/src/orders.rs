//! Order flow: checkout and order history.
//!
//! Checkout always acts on the server's cart, never on the local projection.
//! Once the backend accepts a checkout the local projection is cleared
//! whatever it held, because after checkout the only correct local view is
//! an empty one.

use shopping_portal_core::Order;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::cart::CartState;
use crate::error::{FetchResult, NotAuthenticated};
use crate::gateway::{ApiGateway, GatewayError};
use crate::session::Session;

/// Fallback shown when a checkout rejection carries no reason.
pub const CHECKOUT_FAILED: &str = "Checkout failed";

/// Errors from checking out.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No session is active.
    #[error(transparent)]
    NotAuthenticated(#[from] NotAuthenticated),

    /// The backend refused the checkout, for example because the server
    /// cart is empty.
    #[error("{0}")]
    CheckoutRejected(String),

    /// The backend could not be reached or sent an unexpected body.
    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for CheckoutError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { .. } => Self::CheckoutRejected(
                err.reason().unwrap_or_else(|| CHECKOUT_FAILED.to_string()),
            ),
            other => Self::Gateway(other),
        }
    }
}

/// Convert the server cart into an order.
///
/// On any success status the local cart is cleared before the body is
/// decoded; a malformed body is still reported, but the cart stays cleared
/// since the server has already committed.
///
/// # Errors
///
/// Returns `CheckoutError::CheckoutRejected` with the server's reason (or a
/// generic message) on a non-success response, leaving the local cart
/// untouched. Returns `CheckoutError::Gateway` on network or decoding failure.
#[instrument(skip(gateway, session, cart), fields(local_entries = cart.len()))]
pub async fn checkout(
    gateway: &ApiGateway,
    session: &Session,
    cart: &mut CartState,
) -> Result<Order, CheckoutError> {
    let accepted = gateway.create_order(session).await?;

    cart.clear();
    debug!("Local cart cleared");

    let order = accepted.decode()?;
    info!(order_id = %order.id, cart_id = %order.cart_id, "Order placed");
    Ok(order)
}

/// Fetch the user's past orders. An empty history is a valid result.
///
/// # Errors
///
/// Returns a `FetchError` if the request fails.
#[instrument(skip(gateway, session))]
pub async fn history(gateway: &ApiGateway, session: &Session) -> FetchResult<Vec<Order>> {
    let orders = gateway.list_orders(session).await?;
    debug!(orders = orders.len(), "Order history fetched");
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use shopping_portal_core::UserId;

    use super::*;
    use crate::gateway::Endpoint;

    fn rejected(body: &str) -> GatewayError {
        GatewayError::Rejected {
            endpoint: Endpoint::Checkout,
            status: StatusCode::NOT_FOUND,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_rejection_carries_server_reason() {
        let err = CheckoutError::from(rejected(r#"{"error":"No active cart found"}"#));
        assert_eq!(err.to_string(), "No active cart found");
    }

    #[test]
    fn test_rejection_without_reason_is_generic() {
        let err = CheckoutError::from(rejected(""));
        assert!(matches!(err, CheckoutError::CheckoutRejected(ref msg) if msg == CHECKOUT_FAILED));
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_local_cart() {
        let gateway = crate::test_support::unreachable_gateway();
        let session = Session::new("T1", UserId::from(1));
        let mut cart = crate::test_support::cart_with_entries(2);

        let err = checkout(&gateway, &session, &mut cart)
            .await
            .expect_err("nothing is listening");

        assert!(matches!(err, CheckoutError::Gateway(GatewayError::Transport(_))));
        assert_eq!(cart.len(), 2);
    }
}
