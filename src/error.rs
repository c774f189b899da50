//! Error types for store construction and action dispatch.

use thiserror::Error;

use crate::storage::StorageError;

/// Boxed error carried by action and serializer hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by store construction and action dispatch.
///
/// Hydration-path defects (missing record, failing deserializer, rejected
/// integrity check, rejected load transform) never surface here; they
/// collapse to the default state inside the store builder. What does
/// surface is the caller's responsibility: an unknown or failing action,
/// a rejected storage write, or a serializer hook refusing the state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Dispatch named an action the configuration does not define.
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    /// An action returned an error; nothing was committed.
    #[error("action failed: {0}")]
    Action(#[source] BoxError),

    /// The storage backend rejected a read or write.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A serializer hook rejected the state.
    #[error("serialization failed: {0}")]
    Serialize(#[source] BoxError),
}
