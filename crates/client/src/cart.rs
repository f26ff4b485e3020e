//! Local projection of the user's cart.
//!
//! The server owns the cart. [`CartState`] only records which adds this
//! client saw succeed, in order, and is never used as the source of truth
//! for checkout. The server listing ([`CartState::view_cart`]) is a separate
//! read path that never writes back into the projection, so the two can
//! disagree until the caller reconciles them.

use reqwest::StatusCode;
use shopping_portal_core::{Cart, CartEntry, CartId, ItemId};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::catalog::CatalogCache;
use crate::error::{FetchResult, NotAuthenticated};
use crate::gateway::{ApiGateway, GatewayError};
use crate::session::Session;

/// Errors from adding an item to the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// No session is active.
    #[error(transparent)]
    NotAuthenticated(#[from] NotAuthenticated),

    /// The backend refused the add. The body is not inspected.
    #[error("Failed to add item to cart")]
    AddRejected {
        /// The response status.
        status: StatusCode,
    },

    /// The backend could not be reached or sent an unexpected body.
    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for CartError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { status, .. } => Self::AddRejected { status },
            other => Self::Gateway(other),
        }
    }
}

/// Append-only record of successful adds, cleared on checkout or logout.
#[derive(Debug, Default)]
pub struct CartState {
    entries: Vec<CartEntry>,
}

impl CartState {
    /// Create an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the server cart and record the result locally.
    ///
    /// The entry's name comes from the cached catalog; an item the catalog
    /// does not know still succeeds with no name. Adding the same item twice
    /// records two entries.
    ///
    /// # Errors
    ///
    /// Returns `CartError::AddRejected` on a non-success response, or
    /// `CartError::Gateway` on network or decoding failure. Local state is
    /// untouched on error.
    #[instrument(skip(self, gateway, session, catalog), fields(item_id = %item_id))]
    pub async fn add_item(
        &mut self,
        gateway: &ApiGateway,
        session: &Session,
        catalog: &CatalogCache,
        item_id: &ItemId,
    ) -> Result<CartEntry, CartError> {
        let cart_id = gateway.add_to_cart(session, item_id).await?;
        let entry = self.record(cart_id, item_id.clone(), catalog);
        info!(cart_id = %entry.cart_id, entries = self.entries.len(), "Item added to cart");
        Ok(entry)
    }

    /// Fetch the server's cart listing for display.
    ///
    /// Never touches local state. An empty listing is a valid result.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` if the request fails.
    #[instrument(skip(gateway, session))]
    pub async fn view_cart(gateway: &ApiGateway, session: &Session) -> FetchResult<Vec<Cart>> {
        let carts = gateway.list_carts(session).await?;
        debug!(carts = carts.len(), "Cart listing fetched");
        Ok(carts)
    }

    pub(crate) fn record(
        &mut self,
        cart_id: CartId,
        item_id: ItemId,
        catalog: &CatalogCache,
    ) -> CartEntry {
        let item_name = catalog.find(&item_id).map(|item| item.name.clone());
        if item_name.is_none() {
            debug!(item_id = %item_id, "Added item is not in the cached catalog");
        }

        let entry = CartEntry {
            cart_id,
            item_id,
            item_name,
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Locally recorded entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of locally recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every recorded entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
