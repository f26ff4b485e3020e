//! Shopping Portal Client - session and cart state machine.
//!
//! # Architecture
//!
//! - The backend is the source of truth for carts and orders; the client
//!   keeps only an advisory projection of the cart
//! - Every request goes through [`ApiGateway`], which decodes bodies into the
//!   types of `shopping-portal-core` and never retries
//! - [`App`] owns the session, catalog snapshot and local cart, and tears
//!   them down together on logout
//!
//! # Example
//!
//! ```rust,ignore
//! use shopping_portal_client::{App, ClientConfig};
//!
//! let mut app = App::from_config(&ClientConfig::from_env()?);
//!
//! app.signup(&username, &password).await?;
//! app.login(&username, &password).await?;
//! app.load_items().await?;
//!
//! let entry = app.add_item(&ItemId::from(1)).await?;
//! let order = app.checkout().await?;
//! assert!(app.cart().is_empty());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod orders;
pub mod session;

pub use app::App;
pub use cart::{CartError, CartState};
pub use catalog::CatalogCache;
pub use config::{ClientConfig, ConfigError};
pub use error::{FetchError, NotAuthenticated};
pub use gateway::{ApiGateway, Endpoint, GatewayError};
pub use orders::CheckoutError;
pub use session::{AuthError, Session, SessionPhase, SessionStore, SignupError};

#[cfg(test)]
pub(crate) mod test_support {
    use shopping_portal_core::{CartId, ItemId};

    use crate::cart::CartState;
    use crate::catalog::CatalogCache;
    use crate::config::ClientConfig;
    use crate::gateway::ApiGateway;

    /// A gateway pointed at a loopback port nothing listens on.
    pub fn unreachable_gateway() -> ApiGateway {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        ApiGateway::new(&ClientConfig {
            api_url: format!("http://{addr}"),
        })
    }

    /// A local cart holding `count` entries for uncached items.
    pub fn cart_with_entries(count: u64) -> CartState {
        let catalog = CatalogCache::new();
        let mut cart = CartState::new();
        for id in 0..count {
            cart.record(CartId::from("C1"), ItemId::from(id), &catalog);
        }
        cart
    }
}
