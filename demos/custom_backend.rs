//! Plugging a custom storage backend and codec into a store

use std::sync::{Arc, RwLock};

use serde_json::json;

use repersist::{ActionResult, StorageBackend, StorageError, StoreConfig, StoreDef};

/// A toy backend that records every operation it sees.
#[derive(Default)]
struct TracingBackend {
    records: RwLock<std::collections::HashMap<String, String>>,
}

impl StorageBackend for TracingBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        println!("  [backend] get {key}");
        Ok(self.records.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        println!("  [backend] set {key} = {value}");
        self.records
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn main() {
    println!("=== Custom Backend Example ===\n");

    let backend = Arc::new(TracingBackend::default());

    let def = StoreDef::new()
        .entry("greeting", "hello")
        .action("shout", |_setter, _args| {
            Ok(ActionResult::update(|state| {
                let greeting = state
                    .get("greeting")
                    .and_then(|v| v.as_str())
                    .unwrap_or("hello");
                let mut patch = repersist::State::new();
                patch.insert("greeting".into(), json!(greeting.to_uppercase()));
                patch
            }))
        });

    println!("Building the store (watch the hydration traffic):");
    let store = StoreConfig::new()
        .def(def)
        .storage(Arc::clone(&backend))
        .storage_key("demo")
        .build()
        .expect("building the store");

    println!("\nDispatching `shout`:");
    store.dispatch("shout", &[]).expect("dispatching shout");

    println!("\nFinal state: {}", serde_json::Value::Object(store.get()));
}
