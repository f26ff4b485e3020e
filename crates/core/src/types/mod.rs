//! Core types for the Shopping Portal.
//!
//! This module provides type-safe wrappers for the backend's entities.

pub mod cart;
pub mod id;
pub mod item;
pub mod order;
pub mod username;

pub use cart::{Cart, CartEntry};
pub use id::*;
pub use item::Item;
pub use order::Order;
pub use username::{Username, UsernameError};
