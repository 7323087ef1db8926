#![no_main]

use autowire_di::{binding_specs_from_json, Container, TypeTable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let specs = binding_specs_from_json(&value);
    let container = Container::new(TypeTable::new());
    let applied = container.bind_many(specs.clone());
    assert!(applied <= specs.len());

    // Nothing is registered in the table, so every request fails cleanly
    for (name, _) in &specs {
        let _ = container.instantiate(name);
        let _ = container.resolve_concrete_type(name, None, None);
    }
});
