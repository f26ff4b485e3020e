//! Integration tests for the Shopping Portal client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopping-portal-integration-tests
//! ```
//!
//! # Fake Backend
//!
//! [`FakeBackend`] serves the shopping API from an in-process `axum` router on
//! a loopback port. It issues deterministic identifiers so tests can assert on
//! exact values:
//!
//! - users `U1`, `U2`, ... and tokens `T1`, `T2`, ... (a new token per login)
//! - items `1`, `2`, ... (numeric)
//! - carts `C1`, `C2`, ... and orders `O1`, `O2`, ...
//!
//! Every token a user was issued stays valid, so several clients can share
//! one account. Each user has at most one active cart. Checkout turns it into
//! an order and marks it ordered, so the next add opens a new cart.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use shopping_portal_client::{App, ClientConfig};
use shopping_portal_core::Username;
use tokio::task::JoinHandle;

/// Endpoints that can be told to answer 2xx with a body the client cannot
/// decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Malformed {
    /// `POST /users/login` answers without a token.
    Login,
    /// `GET /items` answers with an object instead of a list.
    Items,
    /// `POST /orders` commits the order but answers with only its id.
    Checkout,
    /// `GET /orders` answers with entries missing their cart.
    Orders,
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug)]
struct UserRow {
    id: String,
    username: String,
    password: String,
    tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ItemRow {
    id: u64,
    name: String,
    status: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CartStatus {
    Active,
    Ordered,
}

impl CartStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ordered => "ordered",
        }
    }
}

#[derive(Debug)]
struct CartRow {
    id: String,
    user_id: String,
    status: CartStatus,
    items: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
struct OrderRow {
    id: String,
    cart_id: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Store {
    users: Vec<UserRow>,
    items: Vec<ItemRow>,
    carts: Vec<CartRow>,
    orders: Vec<OrderRow>,
    tokens_issued: u64,
    malformed: HashSet<Malformed>,
    seen_tokens: Vec<String>,
}

impl Store {
    fn add_item(&mut self, name: &str) -> u64 {
        let id = self.items.len() as u64 + 1;
        self.items.push(ItemRow {
            id,
            name: name.to_string(),
            status: "active",
        });
        id
    }

    fn item(&self, id: u64) -> Option<&ItemRow> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Resolve the `Token` header to a user id, recording what was sent.
    fn authenticate(&mut self, headers: &HeaderMap) -> Result<String, ApiError> {
        let Some(token) = headers.get("Token").and_then(|v| v.to_str().ok()) else {
            return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Token required"));
        };
        self.seen_tokens.push(token.to_string());

        self.users
            .iter()
            .find(|user| user.tokens.iter().any(|issued| issued == token))
            .map(|user| user.id.clone())
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Invalid token"))
    }

    fn active_cart(&mut self, user_id: &str) -> Option<&mut CartRow> {
        self.carts
            .iter_mut()
            .find(|cart| cart.user_id == user_id && cart.status == CartStatus::Active)
    }

    fn cart_json(&self, cart: &CartRow) -> Value {
        let items: Vec<&ItemRow> = cart.items.iter().filter_map(|id| self.item(*id)).collect();
        let mut body = json!({
            "id": cart.id,
            "user_id": cart.user_id,
            "name": "Shopping Cart",
            "status": cart.status.as_str(),
        });
        // Carts without items omit the field entirely.
        if !items.is_empty()
            && let Some(object) = body.as_object_mut()
        {
            object.insert("items".to_string(), json!(items));
        }
        body
    }
}

type Shared = Arc<Mutex<Store>>;

fn lock(state: &Shared) -> MutexGuard<'_, Store> {
    state.lock().expect("fake backend state poisoned")
}

// =============================================================================
// Errors
// =============================================================================

/// Error body in the backend's `{"error": "..."}` shape.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    error: String,
}

impl ApiError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            error: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.error }))).into_response()
    }
}

type ApiResult = Result<(StatusCode, Json<Value>), ApiError>;

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct Credentials {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct NewItem {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AddToCart {
    item_id: Value,
}

async fn signup(State(state): State<Shared>, Json(body): Json<Credentials>) -> ApiResult {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "username and password are required",
        ));
    }

    let mut store = lock(&state);
    if store.users.iter().any(|user| user.username == body.username) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Username already exists",
        ));
    }

    let id = format!("U{}", store.users.len() + 1);
    store.users.push(UserRow {
        id: id.clone(),
        username: body.username.clone(),
        password: body.password,
        tokens: Vec::new(),
    });

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "username": body.username })),
    ))
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> ApiResult {
    let mut store = lock(&state);
    let issued = store.tokens_issued + 1;
    let token = format!("T{issued}");
    let malformed = store.malformed.contains(&Malformed::Login);

    let Some(user) = store
        .users
        .iter_mut()
        .find(|user| user.username == body.username && user.password == body.password)
    else {
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Invalid username or password",
        ));
    };

    user.tokens.push(token.clone());
    let response = if malformed {
        json!({ "user_id": user.id })
    } else {
        json!({
            "token": token,
            "user_id": user.id,
            "username": user.username,
        })
    };
    store.tokens_issued = issued;

    Ok((StatusCode::OK, Json(response)))
}

async fn create_item(State(state): State<Shared>, Json(body): Json<NewItem>) -> ApiResult {
    let mut store = lock(&state);
    let id = store.add_item(&body.name);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "name": body.name, "status": "active" })),
    ))
}

async fn list_items(State(state): State<Shared>) -> ApiResult {
    let store = lock(&state);
    if store.malformed.contains(&Malformed::Items) {
        return Ok((StatusCode::OK, Json(json!({ "items": "unavailable" }))));
    }
    Ok((StatusCode::OK, Json(json!(store.items))))
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddToCart>,
) -> ApiResult {
    let mut store = lock(&state);
    let user_id = store.authenticate(&headers)?;

    let Some(item_id) = body.item_id.as_u64() else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "item_id must be a number"));
    };

    // The active cart is opened before the item is checked.
    if store.active_cart(&user_id).is_none() {
        let id = format!("C{}", store.carts.len() + 1);
        store.carts.push(CartRow {
            id,
            user_id: user_id.clone(),
            status: CartStatus::Active,
            items: Vec::new(),
        });
    }

    if store.item(item_id).is_none() {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "Item not found"));
    }

    let Some(cart) = store.active_cart(&user_id) else {
        return Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "cart vanished"));
    };
    cart.items.push(item_id);

    let body = store
        .carts
        .iter()
        .find(|cart| cart.user_id == user_id && cart.status == CartStatus::Active)
        .map(|cart| store.cart_json(cart))
        .unwrap_or_default();

    Ok((StatusCode::OK, Json(body)))
}

async fn list_carts(State(state): State<Shared>, headers: HeaderMap) -> ApiResult {
    let mut store = lock(&state);
    let user_id = store.authenticate(&headers)?;

    let carts: Vec<Value> = store
        .carts
        .iter()
        .filter(|cart| cart.user_id == user_id)
        .map(|cart| store.cart_json(cart))
        .collect();

    Ok((StatusCode::OK, Json(Value::Array(carts))))
}

async fn create_order(State(state): State<Shared>, headers: HeaderMap) -> ApiResult {
    let mut store = lock(&state);
    let user_id = store.authenticate(&headers)?;
    let order_id = format!("O{}", store.orders.len() + 1);

    let Some(cart) = store.active_cart(&user_id) else {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "No active cart found"));
    };
    cart.status = CartStatus::Ordered;
    let cart_id = cart.id.clone();

    let order = OrderRow {
        id: order_id,
        cart_id,
        user_id,
        created_at: Utc::now(),
    };
    store.orders.push(order.clone());

    if store.malformed.contains(&Malformed::Checkout) {
        return Ok((StatusCode::CREATED, Json(json!({ "id": order.id }))));
    }
    Ok((StatusCode::CREATED, Json(json!(order))))
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> ApiResult {
    let mut store = lock(&state);
    let user_id = store.authenticate(&headers)?;

    let orders: Vec<&OrderRow> = store
        .orders
        .iter()
        .filter(|order| order.user_id == user_id)
        .collect();

    if store.malformed.contains(&Malformed::Orders) {
        let stubs: Vec<Value> = orders.iter().map(|o| json!({ "id": o.id })).collect();
        return Ok((StatusCode::OK, Json(Value::Array(stubs))));
    }
    Ok((StatusCode::OK, Json(json!(orders))))
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/users", post(signup))
        .route("/users/login", post(login))
        .route("/items", get(list_items).post(create_item))
        .route("/carts", get(list_carts).post(add_to_cart))
        .route("/orders", get(list_orders).post(create_order))
        .with_state(state)
}

// =============================================================================
// FakeBackend
// =============================================================================

/// An in-process shopping backend bound to a loopback port.
///
/// The server task is aborted when the value is dropped.
#[derive(Debug)]
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    task: JoinHandle<()>,
}

impl FakeBackend {
    /// Start a backend whose catalog holds a single `Widget` with id `1`.
    pub async fn start() -> Self {
        let backend = Self::empty().await;
        backend.add_item("Widget");
        backend
    }

    /// Start a backend with an empty catalog.
    pub async fn empty() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let state = Shared::default();
        let app = router(Arc::clone(&state));
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend error");
        });

        Self { addr, state, task }
    }

    /// Base URL of the backend.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this backend.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::with_api_url(&self.base_url()).expect("loopback URL is valid")
    }

    /// An anonymous client app pointing at this backend.
    #[must_use]
    pub fn app(&self) -> App {
        App::from_config(&self.config())
    }

    /// A client app that has registered `username` and logged in.
    pub async fn signed_in_app(&self, username: &str) -> App {
        let (username, password) = credentials(username, "pw");
        let mut app = self.app();
        app.signup(&username, &password).await.expect("signup succeeds");
        app.login(&username, &password).await.expect("login succeeds");
        app
    }

    /// Stop serving and wait until the listener is closed.
    pub async fn shutdown(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
    }

    /// Add a catalog item and return its id.
    pub fn add_item(&self, name: &str) -> u64 {
        lock(&self.state).add_item(name)
    }

    /// Make an endpoint answer with an undecodable success body.
    pub fn malform(&self, endpoint: Malformed) {
        lock(&self.state).malformed.insert(endpoint);
    }

    /// Invalidate every issued token, as a server restart would.
    pub fn revoke_tokens(&self) {
        for user in &mut lock(&self.state).users {
            user.tokens.clear();
        }
    }

    /// Every `Token` header value received, in arrival order.
    #[must_use]
    pub fn seen_tokens(&self) -> Vec<String> {
        lock(&self.state).seen_tokens.clone()
    }

    /// Item ids in the user's active cart, if one is open.
    #[must_use]
    pub fn active_cart_items(&self, user_id: &str) -> Option<Vec<u64>> {
        lock(&self.state)
            .active_cart(user_id)
            .map(|cart| cart.items.clone())
    }

    /// Number of orders placed by all users.
    #[must_use]
    pub fn order_count(&self) -> usize {
        lock(&self.state).orders.len()
    }
}

/// Parse test credentials.
#[must_use]
pub fn credentials(username: &str, password: &str) -> (Username, SecretString) {
    (
        Username::parse(username).expect("valid test username"),
        SecretString::from(password.to_string()),
    )
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carts_without_items_omit_field() {
        let store = Store::default();
        let cart = CartRow {
            id: "C1".to_string(),
            user_id: "U1".to_string(),
            status: CartStatus::Ordered,
            items: vec![],
        };
        let body = store.cart_json(&cart);
        assert!(body.get("items").is_none());
        assert_eq!(body["status"], "ordered");
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        let mut store = Store::default();
        let err = store
            .authenticate(&HeaderMap::new())
            .expect_err("no header");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert!(store.seen_tokens.is_empty());
    }
}
