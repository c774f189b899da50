use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{BoxError, StoreError};
use crate::State;

use super::store::{Change, StoreCore};

/// Outcome of a single action invocation.
///
/// Actions either describe a state change for the store to commit, or
/// commit directly through the injected [`Setter`] and report `Noop`.
pub enum ActionResult {
    /// Shallow-merge the contained fields into the current state.
    Patch(State),
    /// Compute the patch from the latest committed state at commit time.
    ///
    /// The updater runs under the store's update lock, so read-then-write
    /// sequences observe the state they will be merged over.
    Update(Box<dyn FnOnce(&State) -> State + Send>),
    /// No state change.
    Noop,
}

impl ActionResult {
    /// Build a merge patch from key/value pairs.
    pub fn patch<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut patch = State::new();
        for (key, value) in entries {
            patch.insert(key.into(), value.into());
        }
        Self::Patch(patch)
    }

    /// Build an updater that receives the latest committed state.
    pub fn update<F>(updater: F) -> Self
    where
        F: FnOnce(&State) -> State + Send + 'static,
    {
        Self::Update(Box::new(updater))
    }
}

/// An action bound into a store: arguments in, [`ActionResult`] out.
///
/// The [`Setter`] is injected on every call; declarative actions that only
/// return patches simply ignore it.
pub type ActionFn = Arc<dyn Fn(&Setter, &[Value]) -> Result<ActionResult, BoxError> + Send + Sync>;

/// Named action definitions keyed by action name.
pub type ActionMap = BTreeMap<String, ActionFn>;

/// Actions-only view over a store.
///
/// A plain clonable handle: it carries no subscription, so holders are
/// never re-invoked on state changes.
#[derive(Clone)]
pub struct Actions {
    map: Arc<ActionMap>,
    core: Arc<StoreCore>,
}

impl Actions {
    pub(crate) fn bind(map: ActionMap, core: Arc<StoreCore>) -> Self {
        Self {
            map: Arc::new(map),
            core,
        }
    }

    /// Invoke a bound action by name.
    ///
    /// The action runs outside the update lock with a fresh [`Setter`]. A
    /// returned patch or updater is committed and persisted; `Noop` commits
    /// nothing. An `Err` from the action leaves the prior state intact and
    /// surfaces as [`StoreError::Action`].
    pub fn call(&self, name: &str, args: &[Value]) -> Result<(), StoreError> {
        let action = self
            .map
            .get(name)
            .ok_or_else(|| StoreError::UnknownAction(name.to_string()))?;

        let setter = Setter {
            core: Arc::clone(&self.core),
        };

        match action(&setter, args).map_err(StoreError::Action)? {
            ActionResult::Patch(patch) => {
                self.core.apply(Change::Merge(patch))?;
            }
            ActionResult::Update(updater) => {
                self.core.apply(Change::Update(updater))?;
            }
            ActionResult::Noop => {}
        }

        Ok(())
    }

    /// Names of all bound actions, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.map.keys().map(String::as_str).collect()
    }
}

/// Capability for committing state changes directly from inside an action.
///
/// Every commit shallow-merges, persists, and notifies subscribers exactly
/// like a returned [`ActionResult::Patch`].
#[derive(Clone)]
pub struct Setter {
    pub(crate) core: Arc<StoreCore>,
}

impl Setter {
    /// Shallow-merge `patch` into the current state and persist the result.
    pub fn commit(&self, patch: State) -> Result<(), StoreError> {
        self.core.apply(Change::Merge(patch)).map(|_| ())
    }

    /// Like [`Setter::commit`], then invoke `after` with a snapshot of the
    /// committed state.
    pub fn commit_then<F>(&self, patch: State, after: F) -> Result<(), StoreError>
    where
        F: FnOnce(&State),
    {
        let snapshot = self.core.apply(Change::Merge(patch))?;
        after(&snapshot);
        Ok(())
    }

    /// Replace the whole state and persist the result.
    pub fn replace(&self, state: State) -> Result<(), StoreError> {
        self.core.apply(Change::Replace(state)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_builder_collects_entries() {
        let result = ActionResult::patch([("a", json!(1)), ("b", json!("two"))]);

        match result {
            ActionResult::Patch(patch) => {
                assert_eq!(patch["a"], json!(1));
                assert_eq!(patch["b"], json!("two"));
            }
            _ => panic!("expected a patch"),
        }
    }
}
