//! Shopsync Core - Shared types library.
//!
//! This crate provides common types used across all Shopsync components:
//! - `client` - Client-side state synchronization library
//! - `cli` - Command-line diagnostics tool
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, catalog/cart/wishlist entities,
//!   orders, and session identity

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
