//! Shopsync client - reactive state synchronization for the storefront.
//!
//! This crate keeps a UI-facing snapshot of catalog, cart, and wishlist
//! state synchronized with the remote storefront services. Mutations apply
//! optimistically and roll back on remote failure; search is debounced and
//! latest-query-wins; the cart survives process restarts through a
//! persistence adapter.
//!
//! # Modules
//!
//! - [`store`] - Reactive store: snapshot read/replace/subscribe
//! - [`service`] - Optimistic mutation executor over a [`gateway::RemoteGateway`]
//! - [`search`] - Debounced incremental search pipeline
//! - [`persist`] - Durable cart storage
//! - [`gateway`] - Transport seam to the remote services
//! - [`notify`] - Transient failure notifications for the UI
//! - [`config`] - Environment-driven configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod persist;
pub mod search;
pub mod service;
pub mod store;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use notify::{Notification, NotificationKind, NotificationStream, Notifier};
pub use search::{SearchPipeline, SearchState};
pub use service::StorefrontService;
pub use store::{ReactiveStore, Section, SectionValue, Snapshot, Subscription};
