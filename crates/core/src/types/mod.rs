//! Core types for Shopsync.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod session;

pub use id::*;
pub use order::{Order, OrderDraft, OrderItem, OrderStatus, OrderStatusParseError};
pub use price::Price;
pub use product::{CartLine, Product, ProductDraft, ProductPatch, WishlistEntry};
pub use session::SessionIdentity;
