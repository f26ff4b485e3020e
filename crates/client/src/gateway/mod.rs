//! HTTP gateway to the shopping backend.
//!
//! Every network call the client makes goes through [`ApiGateway`]. The
//! gateway:
//!
//! - attaches the session token as a `Token` header on authenticated calls
//! - decodes response bodies into the typed entities of `shopping-portal-core`
//!   and fails fast with [`GatewayError::MalformedResponse`] on shape mismatch
//! - never retries, refreshes tokens, queues requests or applies timeouts
//!
//! Authenticated methods take a [`Session`] by reference, so an
//! authenticated request without a token cannot be expressed.

mod wire;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use shopping_portal_core::{Cart, CartId, Item, ItemId, Order, Username};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::session::Session;

use wire::{AddToCartBody, CartCreated, CredentialsBody, LoginResponse, error_reason, truncate};

/// Header carrying the opaque session token.
pub const TOKEN_HEADER: &str = "Token";

/// Characters of a response body kept in log output.
const LOG_BODY_CHARS: usize = 500;

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request could not reach the server, or the response could not be
    /// read.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{endpoint} rejected with HTTP {status}")]
    Rejected {
        /// The endpoint that was called.
        endpoint: Endpoint,
        /// The response status.
        status: StatusCode,
        /// The raw response body.
        body: String,
    },

    /// A success response did not have the expected shape.
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// The endpoint that was called.
        endpoint: Endpoint,
        /// What did not match.
        reason: String,
    },
}

impl GatewayError {
    /// The server-supplied `error` string of a rejection, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        match self {
            Self::Rejected { body, .. } => error_reason(body),
            _ => None,
        }
    }

    /// The HTTP status of a rejection.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server refused the session token.
    ///
    /// Such rejections are reported like any other; the session is kept.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

// =============================================================================
// Endpoints
// =============================================================================

/// The backend operations the client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /users`
    Signup,
    /// `POST /users/login`
    Login,
    /// `GET /items`
    ListItems,
    /// `POST /carts`
    AddToCart,
    /// `GET /carts`
    ListCarts,
    /// `POST /orders`
    Checkout,
    /// `GET /orders`
    ListOrders,
}

impl Endpoint {
    /// HTTP method of this endpoint.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            Self::Signup | Self::Login | Self::AddToCart | Self::Checkout => Method::POST,
            Self::ListItems | Self::ListCarts | Self::ListOrders => Method::GET,
        }
    }

    /// Path of this endpoint relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Signup => "/users",
            Self::Login => "/users/login",
            Self::ListItems => "/items",
            Self::AddToCart | Self::ListCarts => "/carts",
            Self::Checkout | Self::ListOrders => "/orders",
        }
    }

    /// Whether the endpoint requires the `Token` header.
    #[must_use]
    pub const fn requires_token(self) -> bool {
        matches!(
            self,
            Self::AddToCart | Self::ListCarts | Self::Checkout | Self::ListOrders
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

// =============================================================================
// Accepted
// =============================================================================

/// A success response whose body has not been decoded yet.
///
/// Used where the caller must act on the server having committed a change
/// before finding out whether the body is well formed.
#[derive(Debug)]
pub struct Accepted<T> {
    endpoint: Endpoint,
    body: String,
    _entity: PhantomData<T>,
}

impl<T: DeserializeOwned> Accepted<T> {
    /// Decode the body into the expected entity.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::MalformedResponse` if the body has the wrong shape.
    pub fn decode(self) -> Result<T, GatewayError> {
        decode(self.endpoint, &self.body)
    }
}

// =============================================================================
// ApiGateway
// =============================================================================

/// Client for the shopping backend's HTTP API.
#[derive(Clone)]
pub struct ApiGateway {
    inner: Arc<ApiGatewayInner>,
}

struct ApiGatewayInner {
    client: reqwest::Client,
    base_url: String,
}

impl fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiGateway {
    /// Create a new gateway for the configured backend.
    ///
    /// No request timeout is set: a hung request blocks only the operation
    /// that issued it.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            inner: Arc::new(ApiGatewayInner {
                client: reqwest::Client::new(),
                base_url: config.api_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn request(&self, endpoint: Endpoint) -> RequestBuilder {
        let url = format!("{}{}", self.inner.base_url, endpoint.path());
        self.inner.client.request(endpoint.method(), url)
    }

    fn authorized(&self, endpoint: Endpoint, session: &Session) -> RequestBuilder {
        debug_assert!(
            endpoint.requires_token(),
            "{endpoint} must be sent without a token"
        );
        self.request(endpoint)
            .header(TOKEN_HEADER, session.token().expose_secret())
    }

    /// Send a request and return the body of a success response.
    async fn dispatch(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<String, GatewayError> {
        debug!(%endpoint, "Sending request");

        let response = request.send().await.inspect_err(|e| {
            warn!(%endpoint, error = %e, "Request did not reach the backend");
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                %endpoint,
                status = %status,
                body = %truncate(&body, LOG_BODY_CHARS),
                "Backend returned non-success status"
            );
            return Err(GatewayError::Rejected {
                endpoint,
                status,
                body,
            });
        }

        debug!(%endpoint, status = %status, "Request succeeded");
        Ok(body)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Register a new user. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Rejected` if the backend refuses the
    /// registration (for example a duplicate username).
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn signup(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<(), GatewayError> {
        let body = CredentialsBody {
            username: username.as_str(),
            password: password.expose_secret(),
        };
        self.dispatch(Endpoint::Signup, self.request(Endpoint::Signup).json(&body))
            .await?;
        Ok(())
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Rejected` for bad credentials and
    /// `GatewayError::MalformedResponse` if the body lacks a usable token or
    /// user id.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &Username,
        password: &SecretString,
    ) -> Result<Session, GatewayError> {
        let body = CredentialsBody {
            username: username.as_str(),
            password: password.expose_secret(),
        };
        let text = self
            .dispatch(Endpoint::Login, self.request(Endpoint::Login).json(&body))
            .await?;

        let response: LoginResponse = decode(Endpoint::Login, &text)?;
        if response.token.trim().is_empty() {
            return Err(GatewayError::MalformedResponse {
                endpoint: Endpoint::Login,
                reason: "empty token".to_string(),
            });
        }

        Ok(Session::new(response.token, response.user_id).with_username(response.username))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the full item catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a list of items.
    #[instrument(skip(self))]
    pub async fn list_items(&self) -> Result<Vec<Item>, GatewayError> {
        let text = self
            .dispatch(Endpoint::ListItems, self.request(Endpoint::ListItems))
            .await?;
        decode(Endpoint::ListItems, &text)
    }

    // =========================================================================
    // Carts
    // =========================================================================

    /// Add an item to the user's server cart and return the cart id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rejected, or the body has no
    /// cart id.
    #[instrument(skip(self, session), fields(item_id = %item_id))]
    pub async fn add_to_cart(
        &self,
        session: &Session,
        item_id: &ItemId,
    ) -> Result<CartId, GatewayError> {
        let request = self
            .authorized(Endpoint::AddToCart, session)
            .json(&AddToCartBody { item_id });
        let text = self.dispatch(Endpoint::AddToCart, request).await?;
        let created: CartCreated = decode(Endpoint::AddToCart, &text)?;
        Ok(created.id)
    }

    /// Fetch every cart the user owns, with nested items.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rejected, or the body is not
    /// a list of carts.
    #[instrument(skip(self, session))]
    pub async fn list_carts(&self, session: &Session) -> Result<Vec<Cart>, GatewayError> {
        let request = self.authorized(Endpoint::ListCarts, session);
        let text = self.dispatch(Endpoint::ListCarts, request).await?;
        decode(Endpoint::ListCarts, &text)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Ask the backend to turn the user's active server cart into an order.
    ///
    /// Sends no body. The returned [`Accepted`] means the server committed the
    /// order; decoding it may still fail.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Rejected` if the backend refuses (for example
    /// when there is no active cart).
    #[instrument(skip(self, session))]
    pub async fn create_order(&self, session: &Session) -> Result<Accepted<Order>, GatewayError> {
        let request = self.authorized(Endpoint::Checkout, session);
        let body = self.dispatch(Endpoint::Checkout, request).await?;
        Ok(Accepted {
            endpoint: Endpoint::Checkout,
            body,
            _entity: PhantomData,
        })
    }

    /// Fetch the user's past orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is rejected, or the body is not
    /// a list of orders.
    #[instrument(skip(self, session))]
    pub async fn list_orders(&self, session: &Session) -> Result<Vec<Order>, GatewayError> {
        let request = self.authorized(Endpoint::ListOrders, session);
        let text = self.dispatch(Endpoint::ListOrders, request).await?;
        decode(Endpoint::ListOrders, &text)
    }
}

/// Decode a success body, logging the raw text when it does not match.
fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> Result<T, GatewayError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            %endpoint,
            error = %e,
            body = %truncate(body, LOG_BODY_CHARS),
            "Failed to decode backend response"
        );
        GatewayError::MalformedResponse {
            endpoint,
            reason: e.to_string(),
        }
    })
}
