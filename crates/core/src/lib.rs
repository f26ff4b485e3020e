//! Shopping Portal Core - Shared domain types.
//!
//! This crate provides the entities exchanged between the Shopping Portal
//! client and its backend:
//! - `client` - Session, catalog, cart and order flows over HTTP
//! - `cli` - Terminal shell driving the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The backend
//! owns every entity here; the client only ever holds copies.
//!
//! # Modules
//!
//! - [`types`] - Opaque identifiers, usernames, items, carts and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
