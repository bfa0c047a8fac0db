//! Persistence collaborator for the extraction pipeline.
//!
//! The host platform exposes key-value variable storage scoped to a script
//! or a chat message; this crate models that boundary as the
//! [`VariableStore`] trait, layers bounded newest-first caches on top of
//! it, and carries the service-order glue and parse-event observer that
//! the surrounding UI consumes. Everything here is best-effort by design:
//! a failed cache write must never affect a parse result.

pub mod cache;
pub mod events;
pub mod messages;
pub mod orders;
pub mod store;

pub use cache::{order_cache, shop_cache, BoundedCache, CachedEntry};
pub use events::{LogObserver, NullObserver, ParseObserver};
pub use messages::{ChatLog, MessagePayload, MessageSource};
pub use orders::{normalize_order, orders_from_state, OrderStatus, ServiceOrder};
pub use store::{FileStore, MemoryStore, Scope, StoreError, VariableStore};
