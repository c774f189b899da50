//! Store configuration and partial-definition composition.

mod config;

pub use config::{combine, StoreConfig, StoreDef, DEFAULT_STORAGE_KEY};

pub(crate) use config::SerializeFn;
