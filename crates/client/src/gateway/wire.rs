//! Request and response bodies exchanged with the backend.
//!
//! Entities the backend returns verbatim (items, carts, orders) decode
//! straight into the `shopping-portal-core` types. The shapes here cover
//! everything else.

use serde::{Deserialize, Serialize};
use shopping_portal_core::{CartId, ItemId, UserId};

/// Body for `POST /users` and `POST /users/login`.
#[derive(Serialize)]
pub(super) struct CredentialsBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body for `POST /carts`.
#[derive(Serialize)]
pub(super) struct AddToCartBody<'a> {
    pub item_id: &'a ItemId,
}

/// Successful `POST /users/login` response.
#[derive(Deserialize)]
pub(super) struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
    #[serde(default)]
    pub username: Option<String>,
}

/// Successful `POST /carts` response. The backend sends the whole cart; only
/// the id is needed.
#[derive(Deserialize)]
pub(super) struct CartCreated {
    pub id: CartId,
}

/// Optional error body attached to rejected requests.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Extract the `error` string from a rejection body, if there is one.
pub(super) fn error_reason(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|reason| !reason.trim().is_empty())
}

/// Shorten a response body for log output.
pub(super) fn truncate(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reason_present() {
        assert_eq!(
            error_reason(r#"{"error":"Username already exists"}"#).as_deref(),
            Some("Username already exists")
        );
    }

    #[test]
    fn test_error_reason_absent_or_blank() {
        assert_eq!(error_reason("{}"), None);
        assert_eq!(error_reason(r#"{"error":"  "}"#), None);
        assert_eq!(error_reason(r#"{"error":null}"#), None);
    }

    #[test]
    fn test_error_reason_non_json_body() {
        assert_eq!(error_reason("Internal Server Error"), None);
        assert_eq!(error_reason(""), None);
    }

    #[test]
    fn test_login_response_keeps_numeric_user_id() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"token":"abc","user_id":7,"username":"alice"}"#)
                .expect("valid login");
        assert_eq!(response.user_id, UserId::from(7));
        assert_eq!(response.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_login_response_requires_token() {
        assert!(serde_json::from_str::<LoginResponse>(r#"{"user_id":7}"#).is_err());
    }

    #[test]
    fn test_add_to_cart_body_echoes_id_form() {
        let numeric = ItemId::from(3);
        let text = ItemId::from("sku-3");
        assert_eq!(
            serde_json::to_string(&AddToCartBody { item_id: &numeric }).expect("serialize"),
            r#"{"item_id":3}"#
        );
        assert_eq!(
            serde_json::to_string(&AddToCartBody { item_id: &text }).expect("serialize"),
            r#"{"item_id":"sku-3"}"#
        );
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
