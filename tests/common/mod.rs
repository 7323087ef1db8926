//! Shared fixture graph for the integration tests.
#![allow(dead_code)]

use autowire_di::{
    Arguments, BindingSpec, Container, Instance, ParameterDescriptor, ReflectionError, Signature,
    TypeDescriptor, TypeTable, Value, VariantSpec,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ===== Start / Starter =====

#[derive(Debug)]
pub struct Start;
pub struct Starter;

// ===== Next =====

pub struct Next {
    pub start: Option<Instance>,
}

// ===== ParentClass / ChildClass =====

pub struct ParentClass {
    pub next: Instance,
    pub c: Value,
}

pub struct ChildClass {
    pub next: Instance,
    pub c: Value,
    pub start: Mutex<Option<Instance>>,
    pub starter: Option<Instance>,
}

// ===== Singleton fixtures =====

pub struct Single {
    pub id: Option<i64>,
}

pub struct SecondSingle {
    pub id: i64,
}

pub struct TestForSingle {
    pub single: Instance,
    pub second: Instance,
}

// ===== Parameter fixtures =====

pub struct SimpleParameter {
    pub c: Value,
    pub d: Option<Instance>,
}

pub struct InjectClassParameter {
    pub param: Value,
}

// ===== Cycles =====

pub struct CycleA;
pub struct CycleB;
pub struct SelfDependent;

/// Counts constructor calls of `Counted`
pub static COUNTED_BUILDS: AtomicUsize = AtomicUsize::new(0);

pub struct Counted {
    pub serial: usize,
}

fn this<T: 'static>(instance: &Instance) -> Result<&T, ReflectionError> {
    instance
        .downcast_ref::<T>()
        .ok_or_else(|| ReflectionError::new(format!("unexpected receiver {}", instance.type_name())))
}

fn parent_constructor() -> Signature {
    Signature::new()
        .param(ParameterDescriptor::typed("next", "INext"))
        .param(ParameterDescriptor::untyped("c"))
}

fn start_annotations() -> &'static str {
    "/**\n * @second\n * @var IStart\n */"
}

pub fn type_table() -> TypeTable {
    TypeTable::new()
        .with(TypeDescriptor::interface("IStart"))
        .with(TypeDescriptor::interface("INext"))
        .with(TypeDescriptor::abstract_class("AbstractStart").implements("IStart"))
        .with(TypeDescriptor::concrete("Start").implements("IStart").bare(|| Start))
        .with(TypeDescriptor::concrete("Starter").implements("IStart").bare(|| Starter))
        .with(
            TypeDescriptor::concrete("Next")
                .implements("INext")
                .bare(|| Next { start: None })
                .field(
                    "start",
                    "IStart",
                    "/**\n * @var IStart\n * @second\n */",
                    |next: &mut Next, value: Instance| next.start = Some(value),
                )
                .method("tryMe", Signature::new(), |this_, _| {
                    Ok(this::<Next>(this_)?
                        .start
                        .clone()
                        .map(Value::Object)
                        .unwrap_or_default())
                }),
        )
        .with(
            TypeDescriptor::concrete("ParentClass")
                .constructor(parent_constructor(), |args: &Arguments| {
                    Ok(ParentClass {
                        next: args.object("next")?.clone(),
                        c: args.required("c")?.clone(),
                    })
                })
                .method(
                    "getStarter",
                    Signature::new()
                        .param(ParameterDescriptor::typed("start", "IStart"))
                        .with_annotations("/**\n * @second \n * @param IStart $start\n * @return IStart\n */"),
                    |_, args| Ok(Value::Object(args.object("start")?.clone())),
                ),
        )
        .with(
            TypeDescriptor::concrete("ChildClass")
                .extends("ParentClass")
                .constructor(parent_constructor(), |args: &Arguments| {
                    Ok(ChildClass {
                        next: args.object("next")?.clone(),
                        c: args.required("c")?.clone(),
                        start: Mutex::new(None),
                        starter: None,
                    })
                })
                .field(
                    "starter",
                    "IStart",
                    start_annotations(),
                    |child: &mut ChildClass, value: Instance| child.starter = Some(value),
                )
                .method(
                    "hello",
                    Signature::new()
                        .param(ParameterDescriptor::typed("start", "IStart"))
                        .with_annotations("/**\n * @star\n * @param IStart $start\n * @return $this\n */"),
                    |this_, args| {
                        let child = this::<ChildClass>(this_)?;
                        *child.start.lock().unwrap() = Some(args.object("start")?.clone());
                        Ok(Value::Object(this_.clone()))
                    },
                )
                .method("getNext", Signature::new(), |this_, _| {
                    Ok(Value::Object(this::<ChildClass>(this_)?.next.clone()))
                })
                .method("getStart", Signature::new(), |this_, _| {
                    let child = this::<ChildClass>(this_)?;
                    let start = child.start.lock().unwrap().clone();
                    Ok(start.map(Value::Object).unwrap_or_default())
                })
                .non_public_method("testProtected"),
        )
        .with(TypeDescriptor::interface("SingleInterface"))
        .with(
            TypeDescriptor::concrete("Single")
                .implements("SingleInterface")
                .constructor(
                    Signature::new().param(ParameterDescriptor::untyped("id").optional()),
                    |args: &Arguments| Ok(Single { id: args.int("id") }),
                )
                .method("getId", Signature::new(), |this_, _| {
                    Ok(this::<Single>(this_)?.id.map(Value::Int).unwrap_or_default())
                }),
        )
        .with(
            TypeDescriptor::concrete("SecondSingle")
                .implements("SingleInterface")
                .constructor(
                    Signature::new().param(ParameterDescriptor::untyped("id")),
                    |args: &Arguments| {
                        let id = args
                            .int("id")
                            .ok_or_else(|| ReflectionError::new("id must be an integer"))?;
                        Ok(SecondSingle { id })
                    },
                )
                .method("getId", Signature::new(), |this_, _| {
                    Ok(Value::Int(this::<SecondSingle>(this_)?.id))
                }),
        )
        .with(
            TypeDescriptor::concrete("TestForSingle").constructor(
                Signature::new()
                    .param(ParameterDescriptor::typed("single", "SingleInterface"))
                    .param(ParameterDescriptor::typed("second", "SingleInterface"))
                    .with_annotations("/**\n * @singles $single\n * @someTest $second\n */"),
                |args: &Arguments| {
                    Ok(TestForSingle {
                        single: args.object("single")?.clone(),
                        second: args.object("second")?.clone(),
                    })
                },
            ),
        )
        .with(
            TypeDescriptor::concrete("SimpleParameter").constructor(
                Signature::new()
                    .param(ParameterDescriptor::untyped("c"))
                    .param(ParameterDescriptor::typed("d", "Next").optional()),
                |args: &Arguments| {
                    Ok(SimpleParameter {
                        c: args.required("c")?.clone(),
                        d: args.get("d").and_then(Value::as_object).cloned(),
                    })
                },
            ),
        )
        .with(
            TypeDescriptor::concrete("InjectClassParameter")
                .constructor(
                    Signature::new().param(ParameterDescriptor::untyped("param")),
                    |args: &Arguments| {
                        Ok(InjectClassParameter {
                            param: args.required("param")?.clone(),
                        })
                    },
                )
                .method("getClass", Signature::new(), |this_, _| {
                    Ok(this::<InjectClassParameter>(this_)?.param.clone())
                }),
        )
        .with(TypeDescriptor::concrete("CycleA").constructor(
            Signature::new().param(ParameterDescriptor::typed("b", "CycleB")),
            |_: &Arguments| Ok(CycleA),
        ))
        .with(TypeDescriptor::concrete("CycleB").constructor(
            Signature::new().param(ParameterDescriptor::typed("a", "CycleA")),
            |_: &Arguments| Ok(CycleB),
        ))
        .with(TypeDescriptor::concrete("SelfDependent").constructor(
            Signature::new().param(ParameterDescriptor::typed("me", "SelfDependent")),
            |_: &Arguments| Ok(SelfDependent),
        ))
        .with(TypeDescriptor::interface("ILoopA").extends("ILoopB"))
        .with(TypeDescriptor::interface("ILoopB").extends("ILoopA"))
        .with(TypeDescriptor::interface("ICounted"))
        .with(TypeDescriptor::concrete("Counted").implements("ICounted").bare(|| Counted {
            serial: COUNTED_BUILDS.fetch_add(1, Ordering::SeqCst),
        }))
}

/// Bindings every scenario starts from
pub fn bind_reference(container: &Container) {
    assert!(container.bind(
        "IStart",
        BindingSpec::tagged([("star", VariantSpec::new("Start")), ("second", VariantSpec::new("Starter"))]),
    ));
    assert!(container.bind("INext", "Next"));
    assert!(container.bind(
        "SingleInterface",
        BindingSpec::tagged([
            ("singles", VariantSpec::new("Single").singleton()),
            ("someTest", VariantSpec::new("SecondSingle").parameter("id", 400)),
        ]),
    ));
}

pub fn container() -> Container {
    let container = Container::new(type_table());
    bind_reference(&container);
    container
}

pub fn type_of(value: &Value) -> &str {
    value
        .as_object()
        .map(|i| i.type_name().as_str())
        .unwrap_or("<not an object>")
}
