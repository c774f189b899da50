//! # Repersist
//!
//! Persistent state stores for Rust applications.
//!
//! A [`StoreConfig`] describes default state, named actions, and a storage
//! backend. Building it runs the guarded hydration sequence (read,
//! deserialize, integrity-check, load-transform, falling back to the
//! default state on any defect) and produces a bound [`Store`]. Every
//! dispatched action shallow-merges its result into the state and writes
//! the new state back to the backend, so state survives restarts.
//!
//! ## Quick start
//!
//! ```
//! use repersist::{ActionResult, MemoryStorage, State, StoreConfig, StoreDef};
//! use serde_json::{json, Value};
//!
//! let def = StoreDef::new()
//!     .entry("counter", 0)
//!     .action("increment", |_setter, _args| {
//!         Ok(ActionResult::update(|state| {
//!             let counter = state.get("counter").and_then(Value::as_i64).unwrap_or(0);
//!             let mut patch = State::new();
//!             patch.insert("counter".into(), json!(counter + 1));
//!             patch
//!         }))
//!     });
//!
//! let store = StoreConfig::new()
//!     .def(def)
//!     .storage(MemoryStorage::new())
//!     .build()
//!     .unwrap();
//!
//! store.dispatch("increment", &[]).unwrap();
//! assert_eq!(store.get()["counter"], json!(1));
//! ```
//!
//! ## Consuming a store
//!
//! Handles are the dependency-injection mechanism: clone the [`Store`]
//! (or take an [`Actions`] / [`Setter`] view) and pass it to whoever needs
//! it. Subscriptions, property-injection wrappers, and accessor pairs are
//! all equivalent views over the same state/actions pair.

pub mod config;
pub mod error;
pub mod storage;
pub mod store;

/// Application state: string keys to arbitrary JSON-serializable values.
pub type State = serde_json::Map<String, serde_json::Value>;

/// Construction-time external properties, handed to init/action factories
/// and to property-injection wrappers.
pub type Props = State;

// Re-export main types for convenience
pub use config::{combine, StoreConfig, StoreDef, DEFAULT_STORAGE_KEY};
pub use error::{BoxError, StoreError};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError};
pub use store::{ActionFn, ActionMap, ActionResult, Actions, Setter, Store, Subscription};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = StoreConfig::new().no_storage().build().unwrap();
        assert!(store.get().is_empty());
    }

    #[test]
    fn handles_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<Store>();
        assert_send_sync::<Actions>();
        assert_send_sync::<Setter>();
    }
}
