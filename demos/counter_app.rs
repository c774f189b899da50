//! Counter application demonstrating hydration, dispatch, and subscriptions

use serde_json::{json, Value};

use repersist::{ActionResult, FileStorage, State, StoreConfig, StoreDef};

fn main() {
    println!("=== Counter App Example ===\n");

    let dir = std::env::temp_dir().join("repersist-counter-demo");

    let def = StoreDef::new()
        .entry("counter", 0)
        .action("increment", |_setter, _args| {
            Ok(ActionResult::update(|state| {
                let counter = state.get("counter").and_then(Value::as_i64).unwrap_or(0);
                let mut patch = State::new();
                patch.insert("counter".into(), json!(counter + 1));
                patch
            }))
        })
        .action("reset", |_setter, _args| {
            Ok(ActionResult::patch([("counter", json!(0))]))
        });

    let store = StoreConfig::new()
        .def(def)
        .storage(FileStorage::new(&dir))
        .storage_key("counter-app")
        .build()
        .expect("building the store");

    // On a second run this prints the persisted value, not 0.
    println!("Hydrated counter: {}", store.get()["counter"]);

    let _guard = store.connect(
        |state| state.get("counter").cloned(),
        |counter, _actions| {
            if let Some(counter) = counter {
                println!("  -> counter is now {counter}");
            }
        },
    );

    println!("\nIncrementing three times...");
    for _ in 0..3 {
        store.dispatch("increment", &[]).expect("dispatching increment");
    }

    println!("\nState is mirrored to {}", dir.display());
    println!("Run this example again to see it hydrate from disk.");
}
