//! # autowire-di
//!
//! Runtime auto-wiring dependency injection driven by type metadata.
//!
//! ## Features
//!
//! - **Interface bindings**: map an interface or abstract class to one concrete type
//! - **Tagged variants**: several implementations per interface, selected by the
//!   annotations of the callable or field that needs one
//! - **Argument auto-wiring**: constructor and method parameters are filled from
//!   caller overrides, preset parameters, bindings or direct construction
//! - **Field injection**: public fields with a declared type are populated after construction
//! - **Singletons**: the first constructed instance of a singleton-bound type is reused
//! - **Circular dependency detection**: cycles fail with the full resolution path
//!
//! ## Quick Start
//!
//! ```rust
//! use autowire_di::{
//!     BindingSpec, Container, ParameterDescriptor, Parameters, Signature,
//!     TypeDescriptor, TypeTable,
//! };
//!
//! struct Start { id: i64 }
//! struct Starter { id: i64 }
//! struct Runner { start: autowire_di::Instance }
//!
//! let table = TypeTable::new()
//!     .with(TypeDescriptor::interface("IStart"))
//!     .with(TypeDescriptor::concrete("Start").implements("IStart").constructor(
//!         Signature::new().param(ParameterDescriptor::untyped("id").optional()),
//!         |args| Ok(Start { id: args.int("id").unwrap_or(1) }),
//!     ))
//!     .with(TypeDescriptor::concrete("Starter").implements("IStart").constructor(
//!         Signature::new().param(ParameterDescriptor::untyped("id").optional()),
//!         |args| Ok(Starter { id: args.int("id").unwrap_or(2) }),
//!     ))
//!     .with(TypeDescriptor::concrete("Runner").constructor(
//!         Signature::new()
//!             .param(ParameterDescriptor::typed("start", "IStart"))
//!             .with_annotations("/** @second $start */"),
//!         |args| Ok(Runner { start: args.object("start")?.clone() }),
//!     ));
//!
//! let container = Container::new(table);
//! container.bind("IStart", BindingSpec::tagged([("star", "Start"), ("second", "Starter")]));
//!
//! // `@second` on the constructor selects the Starter variant
//! let runner = container.instantiate_as::<Runner>("Runner").unwrap();
//! assert_eq!(runner.start.type_name().as_str(), "Starter");
//!
//! // Without annotations the first registered variant wins
//! let start = container
//!     .instantiate_with("IStart", &Parameters::new().with("id", 40))
//!     .unwrap();
//! assert_eq!(start.downcast_ref::<Start>().unwrap().id, 40);
//! ```
//!
//! ## Metadata
//!
//! The container never inspects Rust types on its own. Every type it can build
//! is described through a [`MetadataProvider`]; [`TypeTable`] is the built-in
//! provider where types, constructors, methods and fields are registered
//! explicitly.
//!
//! ## Lifetimes
//!
//! - **Singleton**: created once per container, reused regardless of later overrides
//! - **Transient**: created fresh on every resolution

// Module declarations
pub mod binding;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod metadata;
pub mod observer;
pub mod singleton;
pub mod value;

// Internal modules
mod internal;
mod resolver;

// Re-exports
pub use binding::{Binding, BindingRegistry, BindingSpec, Variant, VariantSpec};
pub use config::{ContainerOptions, FlushMode};
pub use container::{Container, ContainerBuilder};
pub use descriptors::BindingDescriptor;
pub use error::{DiError, DiResult, ReflectionError};
pub use key::TypeKey;
pub use lifetime::Lifetime;
pub use metadata::{
    Annotation, Annotations, FieldDescriptor, MetadataProvider, ParameterDescriptor, Signature,
    TypeDescriptor, TypeKind, TypeTable, CONSTRUCTOR,
};
pub use observer::{DiObserver, LoggingObserver};
pub use singleton::SingletonCache;
pub use value::{Argument, Arguments, Instance, Parameters, Value};

#[cfg(feature = "config")]
pub use config::{binding_specs_from_json, ConfigError, ContainerConfig};
