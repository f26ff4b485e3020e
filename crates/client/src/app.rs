//! Top-level application controller.
//!
//! [`App`] exclusively owns the session, the catalog snapshot, the local cart
//! and the gateway, and lends them to each operation. Logging out tears all
//! of the session-scoped state down together.

use secrecy::SecretString;
use shopping_portal_core::{Cart, CartEntry, Item, ItemId, Order, Username};
use tracing::{info, instrument};

use crate::cart::{CartError, CartState};
use crate::catalog::CatalogCache;
use crate::config::ClientConfig;
use crate::error::FetchResult;
use crate::gateway::ApiGateway;
use crate::orders::{self, CheckoutError};
use crate::session::{AuthError, Session, SessionPhase, SessionStore, SignupError};

/// A single user's shopping session against one backend.
#[derive(Debug)]
pub struct App {
    gateway: ApiGateway,
    session: SessionStore,
    catalog: CatalogCache,
    cart: CartState,
}

impl App {
    /// Create an anonymous app talking to the given gateway.
    #[must_use]
    pub fn new(gateway: ApiGateway) -> Self {
        Self {
            gateway,
            session: SessionStore::new(),
            catalog: CatalogCache::new(),
            cart: CartState::new(),
        }
    }

    /// Create an anonymous app for the configured backend.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(ApiGateway::new(config))
    }

    /// The gateway used for every request.
    #[must_use]
    pub const fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    /// The session lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// The current session, if logged in.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.current()
    }

    /// The catalog snapshot.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// The local cart projection.
    #[must_use]
    pub const fn cart(&self) -> &CartState {
        &self.cart
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Register a new user. Does not log in.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::signup`].
    pub async fn signup(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<(), SignupError> {
        self.session.signup(&self.gateway, username, password).await
    }

    /// Log in. A successful login replacing an earlier session also drops
    /// that session's catalog snapshot and local cart.
    ///
    /// # Errors
    ///
    /// See [`SessionStore::login`]. Nothing changes on error.
    pub async fn login(
        &mut self,
        username: &Username,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        let had_session = self.session.current().is_some();
        let session = self.session.login(&self.gateway, username, password).await?;

        if had_session {
            self.catalog.clear();
            self.cart.clear();
        }

        Ok(session)
    }

    /// Log out and drop every piece of session-scoped state.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        self.session.logout();
        self.catalog.clear();
        self.cart.clear();
        info!("Session state torn down");
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Load the catalog for the current session.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::NotAuthenticated` without a session, otherwise see
    /// [`CatalogCache::load_items`].
    pub async fn load_items(&mut self) -> FetchResult<&[Item]> {
        self.session.require()?;
        self.catalog.load_items(&self.gateway).await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add an item to the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` without a session, otherwise see
    /// [`CartState::add_item`].
    pub async fn add_item(&mut self, item_id: &ItemId) -> Result<CartEntry, CartError> {
        let session = self.session.require()?;
        self.cart
            .add_item(&self.gateway, session, &self.catalog, item_id)
            .await
    }

    /// Fetch the server's cart listing.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::NotAuthenticated` without a session, otherwise see
    /// [`CartState::view_cart`].
    pub async fn view_cart(&self) -> FetchResult<Vec<Cart>> {
        let session = self.session.require()?;
        CartState::view_cart(&self.gateway, session).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Check out the server cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotAuthenticated` without a session, otherwise
    /// see [`orders::checkout`].
    pub async fn checkout(&mut self) -> Result<Order, CheckoutError> {
        let session = self.session.require()?;
        orders::checkout(&self.gateway, session, &mut self.cart).await
    }

    /// Fetch the order history.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::NotAuthenticated` without a session, otherwise see
    /// [`orders::history`].
    pub async fn history(&self) -> FetchResult<Vec<Order>> {
        let session = self.session.require()?;
        orders::history(&self.gateway, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn anonymous_app() -> App {
        App::new(crate::test_support::unreachable_gateway())
    }

    #[tokio::test]
    async fn test_authenticated_operations_require_a_session() {
        let mut app = anonymous_app();

        assert!(matches!(
            app.load_items().await,
            Err(FetchError::NotAuthenticated(_))
        ));
        assert!(matches!(
            app.add_item(&ItemId::from(1)).await,
            Err(CartError::NotAuthenticated(_))
        ));
        assert!(matches!(
            app.view_cart().await,
            Err(FetchError::NotAuthenticated(_))
        ));
        assert!(matches!(
            app.checkout().await,
            Err(CheckoutError::NotAuthenticated(_))
        ));
        assert!(matches!(
            app.history().await,
            Err(FetchError::NotAuthenticated(_))
        ));
        assert_eq!(app.phase(), SessionPhase::Anonymous);
    }

    #[test]
    fn test_logout_tears_down_session_state() {
        let mut app = anonymous_app();
        app.cart = crate::test_support::cart_with_entries(3);

        app.logout();

        assert_eq!(app.phase(), SessionPhase::Anonymous);
        assert!(app.cart().is_empty());
        assert!(!app.catalog().is_loaded());
    }
}
