mod common;

use autowire_di::{
    Argument, BindingSpec, Container, DiError, DiObserver, Instance, LoggingObserver, Parameters, TypeKey, Value,
    VariantSpec,
};
use common::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_interface_instantiation() {
    let container = container();
    let next = container.instantiate("INext").unwrap();
    assert_eq!(next.type_name().as_str(), "Next");
    assert!(next.is::<Next>());
}

#[test]
fn test_method_on_interface_uses_field_injection() {
    let container = container();
    let result = container.invoke_method("INext", "tryMe").unwrap();
    assert_eq!(type_of(&result), "Starter");
}

#[test]
fn test_recursive_auto_wiring() {
    let container = container();
    let overrides = Parameters::new().with("c", "fff");

    let child = container.invoke_method_with("ChildClass", "hello", &overrides).unwrap();
    let child = child.as_object().unwrap();
    let child_ref = child.downcast_ref::<ChildClass>().unwrap();

    assert_eq!(child_ref.c, Value::from("fff"));
    assert_eq!(child_ref.next.type_name().as_str(), "Next");
    assert_eq!(child_ref.starter.as_ref().unwrap().type_name().as_str(), "Starter");

    // `@star` on hello selects Start
    let start = child_ref.start.lock().unwrap().clone().unwrap();
    assert!(start.is::<Start>());

    // Field of the nested Next is injected too
    let next = child_ref.next.downcast_ref::<Next>().unwrap();
    assert!(next.start.as_ref().unwrap().is::<Starter>());
}

#[test]
fn test_inherited_method_uses_its_own_annotations() {
    let container = container();
    let overrides = Parameters::new().with("c", "fff");
    let starter = container
        .invoke_method_with("ChildClass", "getStarter", &overrides)
        .unwrap();
    assert_eq!(type_of(&starter), "Starter");
}

#[test]
fn test_getters_after_construction() {
    let container = container();
    let overrides = Parameters::new().with("c", 3);
    let next = container.invoke_method_with("ChildClass", "getNext", &overrides).unwrap();
    assert_eq!(type_of(&next), "Next");

    // A fresh transient instance: hello was never called on it
    let start = container.invoke_method_with("ChildClass", "getStart", &overrides).unwrap();
    assert!(start.is_null());
}

#[test]
fn test_direct_overrides_respect_parameter_shape() {
    let container = container();

    let plain = container
        .instantiate_with("SimpleParameter", &Parameters::new().with("c", 1))
        .unwrap();
    let plain = plain.downcast_ref::<SimpleParameter>().unwrap();
    assert_eq!(plain.c, Value::Int(1));
    // `d` is typed Next, which is constructible
    assert!(plain.d.as_ref().unwrap().is::<Next>());

    let supplied = Instance::new("Next", Next { start: None });
    let with_object = container
        .instantiate_with(
            "SimpleParameter",
            &Parameters::new().with("c", 1).with("d", supplied.clone()),
        )
        .unwrap();
    let with_object = with_object.downcast_ref::<SimpleParameter>().unwrap();
    assert!(Instance::ptr_eq(with_object.d.as_ref().unwrap(), &supplied));

    // Raw data does not fit a typed parameter, so `d` is auto-wired instead
    let with_raw = container
        .instantiate_with("SimpleParameter", &Parameters::new().with("c", 1).with("d", 2))
        .unwrap();
    let with_raw = with_raw.downcast_ref::<SimpleParameter>().unwrap();
    assert!(with_raw.d.as_ref().unwrap().is::<Next>());
}

#[test]
fn test_object_override_is_not_used_for_untyped_parameter() {
    let container = container();
    let err = container
        .instantiate_with(
            "SimpleParameter",
            &Parameters::new().with("c", Instance::new("Start", Start)),
        )
        .unwrap_err();
    assert!(err.to_string().contains("required parameter [c]"));
}

#[test]
fn test_null_override_counts_as_missing() {
    let container = container();
    let overrides = Parameters::new().with("c", 5).with("d", Value::Null);
    let built = container.instantiate_with("SimpleParameter", &overrides).unwrap();
    assert!(built.downcast_ref::<SimpleParameter>().unwrap().d.is_some());
}

#[test]
fn test_type_reference_parameter_builds_named_type() {
    let container = container();
    assert!(container.bind(
        "InjectClassParameter",
        BindingSpec::tagged([(
            "default",
            VariantSpec::new("InjectClassParameter").parameter("param", Argument::type_ref("Next")),
        )]),
    ));

    let class = container.invoke_method("InjectClassParameter", "getClass").unwrap();
    assert_eq!(type_of(&class), "Next");
}

#[test]
fn test_type_reference_through_interface_binding() {
    let container = container();
    let overrides = Parameters::new().with_type("param", "INext");
    let built = container.instantiate_with("InjectClassParameter", &overrides).unwrap();
    let param = &built.downcast_ref::<InjectClassParameter>().unwrap().param;
    assert_eq!(type_of(param), "Next");
}

#[test]
fn test_string_override_is_raw_data() {
    let container = container();
    let overrides = Parameters::new().with("param", "Next");
    let built = container.instantiate_with("InjectClassParameter", &overrides).unwrap();
    assert_eq!(
        built.downcast_ref::<InjectClassParameter>().unwrap().param,
        Value::from("Next")
    );
}

#[test]
fn test_unknown_type_reference_is_type_not_found() {
    let container = container();
    let overrides = Parameters::new().with_type("param", "Nowhere");
    let err = container
        .instantiate_with("InjectClassParameter", &overrides)
        .unwrap_err();
    assert!(matches!(err, DiError::TypeNotFound(ref name) if name == "Nowhere"));
    assert_eq!(err.to_string(), "class Nowhere does not exist");
}

#[test]
fn test_type_reference_on_typed_parameter_is_ignored() {
    // `d` is typed, so the reference is not used and Next is auto-wired
    let container = container();
    let overrides = Parameters::new().with("c", 1).with_type("d", "Nowhere");
    let built = container.instantiate_with("SimpleParameter", &overrides).unwrap();
    assert!(built.downcast_ref::<SimpleParameter>().unwrap().d.as_ref().unwrap().is::<Next>());
}

#[test]
fn test_object_override_for_interface_method_parameter() {
    let container = container();
    let supplied = Instance::new("Starter", Starter);
    let overrides = Parameters::new().with("c", 1).with("start", supplied.clone());

    // `@star` on hello would pick Start; the supplied Starter wins
    let child = container.invoke_method_with("ChildClass", "hello", &overrides).unwrap();
    let child = child.as_object().unwrap().downcast_ref::<ChildClass>().unwrap();
    let stored = child.start.lock().unwrap().clone().unwrap();
    assert!(Instance::ptr_eq(&stored, &supplied));
    assert!(child.next.is::<Next>());
}

#[test]
fn test_object_override_for_interface_constructor_parameter() {
    let container = container();
    let next = Instance::new("Next", Next { start: None });
    let parent = container
        .instantiate_with("ParentClass", &Parameters::new().with("c", 1).with("next", next.clone()))
        .unwrap();
    let parent = parent.downcast_ref::<ParentClass>().unwrap();
    assert!(Instance::ptr_eq(&parent.next, &next));

    // An object that does not implement INext is not used; the binding applies
    let stray = Instance::new("Start", Start);
    let parent = container
        .instantiate_with("ParentClass", &Parameters::new().with("c", 1).with("next", stray.clone()))
        .unwrap();
    let parent = parent.downcast_ref::<ParentClass>().unwrap();
    assert!(!Instance::ptr_eq(&parent.next, &stray));
    assert!(parent.next.is::<Next>());
}

#[test]
fn test_leading_separator_is_normalized() {
    let container = Container::new(type_table());
    assert!(container.bind("\\INext", "\\Next"));
    assert_eq!(container.instantiate("INext").unwrap().type_name(), &TypeKey::new("Next"));
    assert!(container.instantiate("\\INext").is_ok());
}

#[test]
fn test_only_one_leading_separator_is_stripped() {
    let container = Container::new(type_table());
    assert!(container.bind("\\\\INext", "Next"));
    assert!(container.is_bound("\\\\INext"));
    assert!(!container.is_bound("\\INext"));
    assert!(!container.is_bound("INext"));
    assert_eq!(
        container.resolve_concrete_type("\\\\INext", None, None).unwrap().as_str(),
        "Next"
    );
    assert_eq!(container.binding_descriptors()[0].abstract_type.as_str(), "\\INext");
}

#[test]
fn test_transient_types_build_fresh_instances() {
    let container = container();
    let a = container.instantiate("Counted").unwrap();
    let b = container.instantiate("Counted").unwrap();
    assert!(!Instance::ptr_eq(&a, &b));
    assert_ne!(
        a.downcast_ref::<Counted>().unwrap().serial,
        b.downcast_ref::<Counted>().unwrap().serial
    );
}

#[test]
fn test_instantiate_as_downcasts() {
    let container = container();
    let next: Arc<Next> = container.instantiate_as::<Next>("INext").unwrap();
    assert!(next.start.is_some());
}

#[derive(Default)]
struct RecordingObserver {
    resolving: AtomicUsize,
    resolved: AtomicUsize,
    hits: AtomicUsize,
    failed: AtomicUsize,
}

impl DiObserver for RecordingObserver {
    fn resolving(&self, _: &TypeKey) {
        self.resolving.fetch_add(1, Ordering::SeqCst);
    }

    fn resolved(&self, _: &TypeKey, _: Duration) {
        self.resolved.fetch_add(1, Ordering::SeqCst);
    }

    fn singleton_hit(&self, _: &TypeKey) {
        self.hits.fetch_add(1, Ordering::SeqCst);
    }

    fn failed(&self, _: &TypeKey, _: &autowire_di::DiError) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_observer_sees_every_construction() {
    let observer = Arc::new(RecordingObserver::default());
    let container = Container::builder(type_table())
        .with_observer(observer.clone())
        .build();
    bind_reference(&container);

    // Next + its injected Starter field
    container.instantiate("INext").unwrap();
    assert_eq!(observer.resolving.load(Ordering::SeqCst), 2);
    assert_eq!(observer.resolved.load(Ordering::SeqCst), 2);

    container.instantiate("SingleInterface").unwrap();
    container.instantiate("SingleInterface").unwrap();
    assert_eq!(observer.hits.load(Ordering::SeqCst), 1);

    // ParentClass needs `c`
    container.instantiate("ParentClass").unwrap_err();
    assert_eq!(observer.failed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_logging_observer_under_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("autowire_di=trace"))
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let container = Container::builder(type_table())
            .with_observer(Arc::new(LoggingObserver::with_prefix("[basics]")))
            .build();
        bind_reference(&container);

        let next = container.instantiate_as::<Next>("INext").unwrap();
        assert!(next.start.as_ref().unwrap().is::<Starter>());
        container.flush_bindings();
        assert!(container.instantiate("INext").is_err());
    });
}
