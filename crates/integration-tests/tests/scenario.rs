//! End-to-end shopping scenario over a real HTTP connection.

use chrono::Utc;
use secrecy::ExposeSecret;
use shopping_portal_client::SessionPhase;
use shopping_portal_core::{CartEntry, CartId, Item, ItemId, OrderId, UserId};
use shopping_portal_integration_tests::{FakeBackend, credentials};

#[tokio::test]
async fn test_signup_login_add_checkout() {
    let backend = FakeBackend::start().await;
    let mut app = backend.app();
    let (username, password) = credentials("alice", "pw");

    app.signup(&username, &password).await.expect("signup");

    let session = app.login(&username, &password).await.expect("login");
    assert_eq!(session.token().expose_secret(), "T1");
    assert_eq!(session.user_id(), &UserId::from("U1"));

    let items = app.load_items().await.expect("catalog").to_vec();
    assert_eq!(
        items,
        vec![Item {
            id: ItemId::from(1),
            name: "Widget".to_string(),
        }]
    );

    let entry = app.add_item(&ItemId::from(1)).await.expect("add");
    assert_eq!(
        entry,
        CartEntry {
            cart_id: CartId::from("C1"),
            item_id: ItemId::from(1),
            item_name: Some("Widget".to_string()),
        }
    );
    assert_eq!(app.cart().entries(), &[entry]);

    let order = app.checkout().await.expect("checkout");
    assert_eq!(order.id, OrderId::from("O1"));
    assert_eq!(order.cart_id, CartId::from("C1"));
    assert!(order.created_at <= Utc::now());
    assert!(app.cart().is_empty());

    let history = app.history().await.expect("history");
    assert_eq!(history, vec![order]);

    app.logout();
    assert_eq!(app.phase(), SessionPhase::Anonymous);
    assert_eq!(backend.seen_tokens().len(), 3);
    assert!(backend.seen_tokens().iter().all(|token| token == "T1"));
}

#[tokio::test]
async fn test_add_before_catalog_load_succeeds_without_name() {
    let backend = FakeBackend::start().await;
    let mut app = backend.signed_in_app("alice").await;

    let entry = app.add_item(&ItemId::from(1)).await.expect("add");

    assert_eq!(entry.cart_id, CartId::from("C1"));
    assert_eq!(entry.item_name, None);
}

#[tokio::test]
async fn test_backend_requires_token_header() {
    let backend = FakeBackend::start().await;

    let response = reqwest::Client::new()
        .get(format!("{}/carts", backend.base_url()))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert_eq!(body["error"], "Token required");
}
