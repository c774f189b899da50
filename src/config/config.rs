use std::sync::Arc;

use serde_json::Value;

use crate::error::{BoxError, StoreError};
use crate::storage::{FileStorage, StorageBackend};
use crate::store::{ActionMap, ActionResult, Setter, Store};
use crate::{Props, State};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "repersist-store";

pub(crate) type InitFactory = Arc<dyn Fn(&Props) -> State + Send + Sync>;
pub(crate) type ActionsFactory = Arc<dyn Fn(&Props) -> ActionMap + Send + Sync>;
pub(crate) type SerializeFn = Arc<dyn Fn(&Value) -> Result<String, BoxError> + Send + Sync>;
pub(crate) type DeserializeFn = Arc<dyn Fn(&str) -> Result<Value, BoxError> + Send + Sync>;
pub(crate) type IntegrityFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
pub(crate) type LoadFn = Arc<dyn Fn(Value) -> Option<Value> + Send + Sync>;

fn json_serialize(value: &Value) -> Result<String, BoxError> {
    Ok(serde_json::to_string(value)?)
}

fn json_deserialize(raw: &str) -> Result<Value, BoxError> {
    Ok(serde_json::from_str(raw)?)
}

/// Configuration for a persistent store.
///
/// All options have working defaults: empty state, no actions, JSON
/// serialization, an always-passing integrity check, an identity load
/// transform, and file-backed storage under the per-user data directory.
/// The `init` and `actions` options accept either plain values or
/// factories of the construction-time [`Props`]; plain values are
/// normalized into constant factories when set.
///
/// Building consumes the configuration, runs the hydration sequence, and
/// produces the bound [`Store`]:
///
/// ```
/// use repersist::{MemoryStorage, StoreConfig, StoreDef};
///
/// let store = StoreConfig::new()
///     .def(StoreDef::new().entry("counter", 0))
///     .storage(MemoryStorage::new())
///     .build()
///     .unwrap();
///
/// assert_eq!(store.get()["counter"], 0);
/// ```
#[derive(Clone)]
pub struct StoreConfig {
    pub(crate) init: InitFactory,
    pub(crate) actions: ActionsFactory,
    pub(crate) storage: Option<Arc<dyn StorageBackend>>,
    pub(crate) storage_key: String,
    pub(crate) serialize: SerializeFn,
    pub(crate) deserialize: DeserializeFn,
    pub(crate) integrity: IntegrityFn,
    pub(crate) load: LoadFn,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            init: Arc::new(|_| State::new()),
            actions: Arc::new(|_| ActionMap::new()),
            storage: Some(Arc::new(FileStorage::platform_default())),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            serialize: Arc::new(json_serialize),
            deserialize: Arc::new(json_deserialize),
            integrity: Arc::new(|_| true),
            load: Arc::new(|value| Some(value)),
        }
    }
}

impl StoreConfig {
    /// Create a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default state used when hydration falls back.
    pub fn init(mut self, state: State) -> Self {
        self.init = Arc::new(move |_| state.clone());
        self
    }

    /// Default state as a factory of the construction-time properties.
    pub fn init_with<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Props) -> State + Send + Sync + 'static,
    {
        self.init = Arc::new(factory);
        self
    }

    /// Action definitions.
    pub fn actions(mut self, actions: ActionMap) -> Self {
        self.actions = Arc::new(move |_| actions.clone());
        self
    }

    /// Action definitions as a factory of the construction-time properties.
    ///
    /// The [`Setter`] is not a factory input; it is injected into every
    /// action call at dispatch time.
    pub fn actions_with<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Props) -> ActionMap + Send + Sync + 'static,
    {
        self.actions = Arc::new(factory);
        self
    }

    /// Install a partial definition: its init map and its actions.
    pub fn def(self, def: StoreDef) -> Self {
        self.init(def.init).actions(def.actions)
    }

    /// Persistence backend.
    pub fn storage<B>(mut self, backend: B) -> Self
    where
        B: StorageBackend + 'static,
    {
        self.storage = Some(Arc::new(backend));
        self
    }

    /// Disable persistence; the store becomes a pure in-memory container
    /// and no backend call ever occurs.
    pub fn no_storage(mut self) -> Self {
        self.storage = None;
        self
    }

    /// Key under which the single state record is stored.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Storage write transform. Defaults to JSON encoding.
    pub fn serialize<F>(mut self, serialize: F) -> Self
    where
        F: Fn(&Value) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.serialize = Arc::new(serialize);
        self
    }

    /// Storage read transform. Defaults to JSON decoding.
    pub fn deserialize<F>(mut self, deserialize: F) -> Self
    where
        F: Fn(&str) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.deserialize = Arc::new(deserialize);
        self
    }

    /// Predicate validating a freshly read record; a `false` result sends
    /// hydration to the default state.
    pub fn integrity<F>(mut self, integrity: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.integrity = Arc::new(integrity);
        self
    }

    /// Post-read transform applied before the record becomes initial
    /// state; `None` sends hydration to the default state.
    pub fn load<F>(mut self, load: F) -> Self
    where
        F: Fn(Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.load = Arc::new(load);
        self
    }

    /// Non-reactive direct reader.
    ///
    /// Reads and deserializes the current storage record on demand,
    /// bypassing any in-memory store. Returns the empty map when storage
    /// is disabled, nothing is stored, or the record does not decode to
    /// an object.
    pub fn stored_state(&self) -> State {
        let Some(storage) = &self.storage else {
            return State::new();
        };

        let raw = match storage.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            _ => return State::new(),
        };

        match (self.deserialize)(&raw) {
            Ok(Value::Object(state)) => state,
            _ => State::new(),
        }
    }

    /// Build the bound store with empty construction-time properties.
    ///
    /// # Errors
    ///
    /// Hydration defects never error; they fall back to the default
    /// state. The error paths are a serializer hook or storage write
    /// failing while normalizing the record back to storage.
    pub fn build(self) -> Result<Store, StoreError> {
        self.build_with_props(Props::new())
    }

    /// Build the bound store, handing `props` to the init and actions
    /// factories.
    ///
    /// # Errors
    ///
    /// Same as [`StoreConfig::build`].
    pub fn build_with_props(self, props: Props) -> Result<Store, StoreError> {
        Store::bind(self, &props)
    }
}

/// A partial store definition: an init fragment and an action fragment.
///
/// Fragments exist to be combined: feature modules each export one, and
/// [`combine`] folds them into the single definition a [`StoreConfig`]
/// takes.
#[derive(Clone, Default)]
pub struct StoreDef {
    pub(crate) init: State,
    pub(crate) actions: ActionMap,
}

impl StoreDef {
    /// Create an empty definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the init fragment wholesale.
    pub fn init(mut self, state: State) -> Self {
        self.init = state;
        self
    }

    /// Add one init entry.
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.init.insert(key.into(), value.into());
        self
    }

    /// Add one named action.
    pub fn action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Setter, &[Value]) -> Result<ActionResult, BoxError> + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    /// Split the definition into its init map and its action map.
    pub fn into_parts(self) -> (State, ActionMap) {
        (self.init, self.actions)
    }
}

/// Merge partial definitions into one by keyed union.
///
/// Later fragments win on key collisions, for init entries and actions
/// alike. Pure and stateless.
///
/// ```
/// use repersist::{combine, StoreDef};
///
/// let counters = StoreDef::new().entry("counter", 0);
/// let session = StoreDef::new().entry("user", "anonymous");
///
/// let def = combine([counters, session]);
/// ```
pub fn combine<I>(defs: I) -> StoreDef
where
    I: IntoIterator<Item = StoreDef>,
{
    let mut combined = StoreDef::new();
    for def in defs {
        combined.init.extend(def.init);
        combined.actions.extend(def.actions);
    }
    combined
}
