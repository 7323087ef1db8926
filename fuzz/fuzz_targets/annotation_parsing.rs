#![no_main]

use autowire_di::{Annotations, BindingRegistry, BindingSpec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let annotations = Annotations::parse(text);
    for annotation in annotations.iter() {
        assert!(!annotation.tag.is_empty());
        assert!(annotations.has_tag(&annotation.tag));
    }

    // Whatever the text, a tagged binding always resolves to one of its variants
    let mut registry = BindingRegistry::new();
    registry.bind("IService", BindingSpec::tagged([("first", "First"), ("second", "Second")]));
    let parameter = text.split_whitespace().next();
    let resolved = registry
        .resolve_concrete_type("IService", Some(&annotations), parameter)
        .expect("bound interface resolves");
    assert!(resolved == "First" || resolved == "Second");
});
