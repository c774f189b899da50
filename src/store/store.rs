use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::storage::StorageBackend;
use crate::{Props, State};

use super::actions::{Actions, Setter};

type Subscriber = Box<dyn Fn(&State) + Send + Sync>;

/// A state change queued for commit.
pub(crate) enum Change {
    Merge(State),
    Update(Box<dyn FnOnce(&State) -> State + Send>),
    Replace(State),
}

/// Shared core owning the state, the subscriber list, and the persistence
/// hook-up. [`Store`], [`Actions`], and [`Setter`] are all clones over one
/// core.
pub(crate) struct StoreCore {
    state: RwLock<State>,
    subscribers: RwLock<Vec<(usize, Subscriber)>>,
    next_subscriber_id: AtomicUsize,
    storage: Option<Arc<dyn StorageBackend>>,
    storage_key: String,
    serialize: crate::config::SerializeFn,
}

impl StoreCore {
    /// Commit a change: merge, persist, swap, then notify with a snapshot.
    ///
    /// The write lock serializes commits, so updaters always observe the
    /// latest committed state. Persistence happens before the in-memory
    /// swap; a failing write leaves the prior state in place.
    pub(crate) fn apply(&self, change: Change) -> Result<State, StoreError> {
        let snapshot = {
            let mut state = self.state.write().unwrap();
            let next = match change {
                Change::Merge(patch) => merged(&*state, patch),
                Change::Update(updater) => {
                    let patch = updater(&*state);
                    merged(&*state, patch)
                }
                Change::Replace(next) => next,
            };
            self.persist(&next)?;
            *state = next.clone();
            next
        };

        self.notify(&snapshot);
        Ok(snapshot)
    }

    /// Serialize `state` and write it under the configured key.
    fn persist(&self, state: &State) -> Result<(), StoreError> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };

        let raw = (self.serialize)(&Value::Object(state.clone())).map_err(StoreError::Serialize)?;
        storage.set(&self.storage_key, &raw)?;
        tracing::trace!(key = %self.storage_key, bytes = raw.len(), "state persisted");
        Ok(())
    }

    fn notify(&self, state: &State) {
        let subscribers = self.subscribers.read().unwrap();
        for (_, subscriber) in subscribers.iter() {
            subscriber(state);
        }
    }

    fn add_subscriber(self: &Arc<Self>, subscriber: Subscriber) -> Subscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.write().unwrap().push((id, subscriber));
        Subscription {
            id,
            core: Arc::downgrade(self),
        }
    }
}

/// Shallow merge of `patch` over `base`.
fn merged(base: &State, patch: State) -> State {
    let mut next = base.clone();
    for (key, value) in patch {
        next.insert(key, value);
    }
    next
}

/// Run the guarded hydration sequence and normalize storage.
///
/// Read, deserialize, integrity-check, and load-transform the stored
/// record; any defect falls back to the default state. Whatever state
/// results is immediately written back, so storage holds a known-good
/// record after every construction.
fn hydrate(config: &StoreConfig, props: &Props) -> Result<State, StoreError> {
    let Some(storage) = &config.storage else {
        return Ok((config.init)(props));
    };

    let initial = recover(config, storage.as_ref()).unwrap_or_else(|| (config.init)(props));

    let raw = (config.serialize)(&Value::Object(initial.clone())).map_err(StoreError::Serialize)?;
    storage.set(&config.storage_key, &raw)?;

    Ok(initial)
}

/// The guarded read path: fetch, deserialize, integrity-check, load.
///
/// Each defect is independent and short-circuits to `None`; no partial
/// recovery of surviving fields is attempted.
fn recover(config: &StoreConfig, storage: &dyn StorageBackend) -> Option<State> {
    let raw = match storage.get(&config.storage_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            tracing::debug!(key = %config.storage_key, "no stored record");
            return None;
        }
        Err(err) => {
            tracing::warn!(key = %config.storage_key, %err, "storage read failed");
            return None;
        }
    };

    let value = match (config.deserialize)(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key = %config.storage_key, %err, "stored record failed to deserialize");
            return None;
        }
    };

    if !(config.integrity)(&value) {
        tracing::warn!(key = %config.storage_key, "stored record failed its integrity check");
        return None;
    }

    let Some(loaded) = (config.load)(value) else {
        tracing::warn!(key = %config.storage_key, "load transform rejected the stored record");
        return None;
    };

    match loaded {
        Value::Object(state) => Some(state),
        _ => {
            tracing::warn!(key = %config.storage_key, "loaded record is not an object");
            None
        }
    }
}

/// A bound store: hydrated state, wrapped actions, and the access adapters.
///
/// `Store` is a cheap clonable handle over one shared core. Cloning is the
/// dependency-injection mechanism: hand a clone (or an [`Actions`] /
/// [`Setter`] view of it) to any consumer that needs state or actions.
///
/// State mutation only ever happens through the commit path: a dispatched
/// action's result, or a [`Setter`] call. Every commit shallow-merges into
/// the latest committed state, writes the serialized result to storage,
/// and then notifies subscribers synchronously.
#[derive(Clone)]
pub struct Store {
    core: Arc<StoreCore>,
    actions: Actions,
}

impl Store {
    pub(crate) fn bind(config: StoreConfig, props: &Props) -> Result<Self, StoreError> {
        let initial = hydrate(&config, props)?;
        let actions = (config.actions)(props);

        let core = Arc::new(StoreCore {
            state: RwLock::new(initial),
            subscribers: RwLock::new(Vec::new()),
            next_subscriber_id: AtomicUsize::new(0),
            storage: config.storage,
            storage_key: config.storage_key,
            serialize: config.serialize,
        });

        let actions = Actions::bind(actions, Arc::clone(&core));
        Ok(Self { core, actions })
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> State {
        self.core.state.read().unwrap().clone()
    }

    /// Read the current state without cloning.
    pub fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let state = self.core.state.read().unwrap();
        f(&*state)
    }

    /// Invoke a bound action by name. Shorthand for `self.actions().call(..)`.
    ///
    /// # Errors
    ///
    /// * [`StoreError::UnknownAction`] if no action has this name
    /// * [`StoreError::Action`] if the action itself fails
    /// * [`StoreError::Storage`] / [`StoreError::Serialize`] if persisting
    ///   the committed state fails
    pub fn dispatch(&self, name: &str, args: &[Value]) -> Result<(), StoreError> {
        self.actions.call(name, args)
    }

    /// Actions-only view over this store.
    pub fn actions(&self) -> Actions {
        self.actions.clone()
    }

    /// Setter capability for commits outside any action.
    pub fn setter(&self) -> Setter {
        Setter {
            core: Arc::clone(&self.core),
        }
    }

    /// Subscribe to committed state changes.
    ///
    /// The callback runs synchronously after every commit with a snapshot
    /// of the new state. Dropping the returned guard unregisters it.
    pub fn subscribe<F>(&self, subscriber: F) -> Subscription
    where
        F: Fn(&State) + Send + Sync + 'static,
    {
        self.core.add_subscriber(Box::new(subscriber))
    }

    /// Subscribing render-callback adapter.
    ///
    /// `callback` receives the mapped state and the actions handle: once
    /// immediately with the current state, and again after every commit.
    ///
    /// ```
    /// use repersist::StoreConfig;
    ///
    /// let store = StoreConfig::new().no_storage().build().unwrap();
    /// let _guard = store.connect(
    ///     |state| state.len(),
    ///     |len, _actions| println!("{len} keys"),
    /// );
    /// ```
    pub fn connect<T, M, F>(&self, map: M, callback: F) -> Subscription
    where
        M: Fn(&State) -> T + Send + Sync + 'static,
        F: Fn(&T, &Actions) + Send + Sync + 'static,
    {
        let actions = self.actions.clone();
        let view = move |state: &State| callback(&map(state), &actions);

        self.read(|state| view(state));
        self.core.add_subscriber(Box::new(view))
    }

    /// Direct accessor pair: the mapped current state and the actions
    /// handle, for consumption without a nested-callback shape.
    pub fn with_state<T>(&self, map: impl FnOnce(&State) -> T) -> (T, Actions) {
        (self.read(map), self.actions.clone())
    }

    /// Property-injection wrapper.
    ///
    /// Returns a function that supplies `component` with the incoming
    /// properties, the mapped state as of the call, and the actions handle.
    pub fn inject<T, M, C, R>(&self, map: M, component: C) -> impl Fn(Props) -> R
    where
        M: Fn(&State) -> T,
        C: Fn(Props, T, &Actions) -> R,
    {
        let core = Arc::clone(&self.core);
        let actions = self.actions.clone();
        move |props: Props| {
            let mapped = map(&*core.state.read().unwrap());
            component(props, mapped, &actions)
        }
    }

    /// Actions-only property-injection wrapper.
    pub fn inject_actions<C, R>(&self, component: C) -> impl Fn(Props) -> R
    where
        C: Fn(Props, &Actions) -> R,
    {
        let actions = self.actions.clone();
        move |props: Props| component(props, &actions)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.core.state.read().unwrap())
            .finish_non_exhaustive()
    }
}

/// RAII guard for a store subscription.
///
/// Dropping the guard unregisters the callback.
pub struct Subscription {
    id: usize,
    core: Weak<StoreCore>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(core) = self.core.upgrade() {
            core.subscribers
                .write()
                .unwrap()
                .retain(|(id, _)| *id != self.id);
        }
    }
}
