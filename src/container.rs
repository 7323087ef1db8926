//! The resolution engine: bindings, construction, method invocation.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use crate::binding::{BindingRegistry, BindingSpec};
use crate::config::{ContainerOptions, FlushMode};
use crate::descriptors::BindingDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::StackGuard;
use crate::key::TypeKey;
use crate::metadata::{Annotations, MetadataProvider, TypeKind, CONSTRUCTOR};
use crate::observer::{DiObserver, Observers};
use crate::resolver::ArgumentResolver;
use crate::singleton::SingletonCache;
use crate::value::{AnyBox, Instance, Parameters, Value};

#[cfg(feature = "config")]
use crate::config::ContainerConfig;

/// Auto-wiring container.
///
/// Owns the binding registry and the singleton cache and resolves requests
/// against a [`MetadataProvider`]. Cloning is cheap and every clone shares the
/// same state, so one container can be handed to any number of threads.
///
/// # Examples
///
/// ```rust
/// use autowire_di::{
///     Container, ParameterDescriptor, Signature, TypeDescriptor, TypeTable, Value,
/// };
///
/// struct Next;
/// struct Greeter { next: std::sync::Arc<Next> }
///
/// let table = TypeTable::new()
///     .with(TypeDescriptor::interface("INext"))
///     .with(TypeDescriptor::concrete("Next").implements("INext").bare(|| Next))
///     .with(
///         TypeDescriptor::concrete("Greeter")
///             .constructor(
///                 Signature::new().param(ParameterDescriptor::typed("next", "INext")),
///                 |args| Ok(Greeter { next: args.downcast::<Next>("next")? }),
///             )
///             .method("hello", Signature::new(), |_, _| Ok(Value::from("hello"))),
///     );
///
/// let container = Container::new(table);
/// container.bind("INext", "Next");
///
/// let greeter = container.instantiate_as::<Greeter>("Greeter").unwrap();
/// let _next: &Next = &greeter.next;
/// assert_eq!(container.invoke_method("Greeter", "hello").unwrap(), Value::from("hello"));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    metadata: Arc<dyn MetadataProvider>,
    registry: RwLock<BindingRegistry>,
    singletons: SingletonCache,
    observers: Observers,
    options: ContainerOptions,
}

impl Container {
    /// Container with default options and no observers
    pub fn new(metadata: impl MetadataProvider + 'static) -> Self {
        Self::builder(metadata).build()
    }

    pub fn builder(metadata: impl MetadataProvider + 'static) -> ContainerBuilder {
        ContainerBuilder::from_shared(Arc::new(metadata))
    }

    /// Container with the options of `config` and its bindings applied
    #[cfg(feature = "config")]
    pub fn from_config(metadata: impl MetadataProvider + 'static, config: &ContainerConfig) -> Self {
        let container = Self::builder(metadata)
            .with_options(config.options.clone())
            .build();
        let applied = config.apply(&container);
        tracing::debug!(applied, "applied configured bindings");
        container
    }

    pub fn metadata(&self) -> &dyn MetadataProvider {
        &*self.inner.metadata
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    pub fn singletons(&self) -> &SingletonCache {
        &self.inner.singletons
    }

    /// Binds `abstract_type` to one concrete type or to tagged variants.
    ///
    /// Replaces any earlier binding of the same abstract type. Singleton
    /// variants get their cache slot reserved here. Returns `false` when the
    /// spec is rejected (see [`BindingRegistry::bind`]).
    pub fn bind(&self, abstract_type: &str, spec: impl Into<BindingSpec>) -> bool {
        let key = TypeKey::new(abstract_type);
        let reserved: Vec<TypeKey> = {
            let mut registry = self.inner.registry.write();
            if !registry.bind(&key, spec) {
                tracing::debug!(abstract_type = %key, "rejected binding");
                return false;
            }
            registry
                .get(&key)
                .map(|binding| {
                    binding
                        .variants()
                        .filter(|v| v.lifetime.is_singleton())
                        .map(|v| v.concrete.clone())
                        .collect()
                })
                .unwrap_or_default()
        };

        for concrete in &reserved {
            self.inner.singletons.reserve(concrete);
        }
        tracing::trace!(abstract_type = %key, singletons = reserved.len(), "bound");
        true
    }

    /// Applies [`bind`](Self::bind) per entry; returns how many were applied
    pub fn bind_many<I, K, S>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = (K, S)>,
        K: AsRef<str>,
        S: Into<BindingSpec>,
    {
        let mut applied = 0;
        for (abstract_type, spec) in entries {
            if self.bind(abstract_type.as_ref(), spec) {
                applied += 1;
            }
        }
        applied
    }

    /// Drops every binding.
    ///
    /// With [`FlushMode::BindingsOnly`] singleton slots, cached singletons and
    /// preset parameters survive; [`FlushMode::FullReset`] clears them too.
    pub fn flush_bindings(&self) {
        let mut registry = self.inner.registry.write();
        match self.inner.options.flush_mode {
            FlushMode::BindingsOnly => registry.flush_all(),
            FlushMode::FullReset => {
                registry.reset();
                self.inner.singletons.clear();
            }
        }
        tracing::debug!(mode = ?self.inner.options.flush_mode, "flushed bindings");
    }

    /// Builds `type_name`, resolving interfaces through their bindings
    pub fn instantiate(&self, type_name: &str) -> DiResult<Instance> {
        self.instantiate_with(type_name, &Parameters::new())
    }

    /// Like [`instantiate`](Self::instantiate) with caller overrides.
    ///
    /// Overrides are ignored when a singleton instance is already cached.
    pub fn instantiate_with(&self, type_name: &str, overrides: &Parameters) -> DiResult<Instance> {
        self.resolve(&TypeKey::new(type_name), overrides)
    }

    /// Builds `type_name` and downcasts the result
    pub fn instantiate_as<T: std::any::Any + Send + Sync>(&self, type_name: &str) -> DiResult<Arc<T>> {
        let instance = self.instantiate(type_name)?;
        instance
            .downcast::<T>()
            .ok_or_else(|| DiError::TypeMismatch(instance.type_name().clone()))
    }

    pub fn invoke_method(&self, type_name: &str, method: &str) -> DiResult<Value> {
        self.invoke_method_with(type_name, method, &Parameters::new())
    }

    /// Builds an instance of `type_name` and calls `method` on it.
    ///
    /// `overrides` feed both the construction and the method's own
    /// parameters. Calling [`CONSTRUCTOR`] is the same as
    /// [`instantiate_with`](Self::instantiate_with).
    pub fn invoke_method_with(&self, type_name: &str, method: &str, overrides: &Parameters) -> DiResult<Value> {
        let key = TypeKey::new(type_name);
        if method == CONSTRUCTOR {
            return self.resolve(&key, overrides).map(Value::Object);
        }

        let concrete = self.concrete_for(&key)?;
        let metadata = self.metadata();
        if !metadata.is_method_public(&concrete, method) {
            return Err(DiError::MethodNotFoundOrNotPublic {
                type_name: concrete,
                method: method.to_string(),
            });
        }
        let context = || format!("{}::{}", concrete, method);
        let signature = metadata
            .method_signature(&concrete, method)
            .map_err(|e| DiError::reflection(context(), e))?;

        let instance = self.construct(&concrete, overrides)?;
        let arguments = ArgumentResolver::new(self).resolve(&concrete, method, &signature, overrides)?;
        metadata
            .invoke(&instance, method, &arguments)
            .map_err(|e| DiError::reflection(context(), e))
    }

    /// Concrete type bound to `abstract_type`, chosen with `annotations` and
    /// `parameter`; `None` when nothing is bound
    pub fn resolve_concrete_type(
        &self,
        abstract_type: &str,
        annotations: Option<&Annotations>,
        parameter: Option<&str>,
    ) -> Option<TypeKey> {
        self.inner
            .registry
            .read()
            .resolve_concrete_type(abstract_type, annotations, parameter)
    }

    pub fn is_bound(&self, abstract_type: &str) -> bool {
        self.inner.registry.read().is_bound(abstract_type)
    }

    /// True iff the singleton cache holds a slot for `concrete`.
    ///
    /// Slots are reserved when a singleton variant is bound, or created by
    /// [`SingletonCache::set`]; construction consults the same slots.
    pub fn is_singleton(&self, concrete: &str) -> bool {
        self.inner.singletons.is_reserved(&TypeKey::new(concrete))
    }

    pub fn binding_descriptors(&self) -> Vec<BindingDescriptor> {
        BindingDescriptor::collect(&self.inner.registry.read())
    }

    pub(crate) fn injected(
        &self,
        abstract_type: &TypeKey,
        annotations: Option<&Annotations>,
        parameter: Option<&str>,
    ) -> DiResult<Option<TypeKey>> {
        self.inner
            .registry
            .read()
            .injected(self.metadata(), abstract_type, annotations, parameter)
    }

    pub(crate) fn is_instantiable(&self, name: &TypeKey) -> bool {
        BindingRegistry::is_instantiable(self.metadata(), name)
    }

    /// Resolves `name` to a concrete type and builds it
    pub(crate) fn resolve(&self, name: &TypeKey, overrides: &Parameters) -> DiResult<Instance> {
        let concrete = self.concrete_for(name)?;
        self.construct(&concrete, overrides)
    }

    /// Follows bindings from an abstract or interface name to a concrete type
    fn concrete_for(&self, name: &TypeKey) -> DiResult<TypeKey> {
        let mut current = name.clone();
        let mut chain: Vec<TypeKey> = Vec::new();
        loop {
            match self.metadata().type_kind(&current) {
                None => return Err(DiError::TypeNotFound(current)),
                Some(TypeKind::Concrete) => return Ok(current),
                Some(TypeKind::Abstract) | Some(TypeKind::Interface) => {
                    if chain.contains(&current) {
                        chain.push(current);
                        return Err(DiError::Circular(chain));
                    }
                    let next = self
                        .injected(&current, None, None)?
                        .ok_or_else(|| DiError::NotInjected(current.clone()))?;
                    chain.push(current);
                    current = next;
                }
            }
        }
    }

    /// Builds the concrete type `concrete`, honoring the singleton cache
    fn construct(&self, concrete: &TypeKey, overrides: &Parameters) -> DiResult<Instance> {
        let inner = &*self.inner;
        let singleton = inner.singletons.is_reserved(concrete);
        if singleton {
            if let Some(cached) = inner.singletons.get(concrete) {
                inner.observers.singleton_hit(concrete);
                return Ok(cached);
            }
        }

        let _guard = StackGuard::enter(concrete, inner.options.max_depth)?;
        inner.observers.resolving(concrete);
        let started = Instant::now();

        match self.build(concrete, overrides) {
            Ok(instance) => {
                let instance = if singleton {
                    let cached = inner.singletons.fill(concrete, instance);
                    tracing::trace!(type_name = %concrete, "singleton stored");
                    cached
                } else {
                    instance
                };
                inner.observers.resolved(concrete, started.elapsed());
                Ok(instance)
            }
            Err(error) => {
                inner.observers.failed(concrete, &error);
                Err(error)
            }
        }
    }

    fn build(&self, concrete: &TypeKey, overrides: &Parameters) -> DiResult<Instance> {
        let metadata = self.metadata();
        let parameters = match self.inner.registry.read().preset_parameters(concrete) {
            Some(presets) => presets.overlay(overrides),
            None => overrides.clone(),
        };

        let context = || format!("{}::{}", concrete, CONSTRUCTOR);
        let signature = metadata
            .constructor_signature(concrete)
            .map_err(|e| DiError::reflection(context(), e))?;

        let mut object = match signature {
            None => metadata
                .construct_without_args(concrete)
                .map_err(|e| DiError::reflection(context(), e))?,
            Some(signature) => {
                let arguments = ArgumentResolver::new(self).resolve(concrete, CONSTRUCTOR, &signature, &parameters)?;
                metadata
                    .construct(concrete, &arguments)
                    .map_err(|e| DiError::reflection(context(), e))?
            }
        };

        self.inject_fields(concrete, &mut object)?;
        Ok(Instance::from_boxed(concrete.clone(), object))
    }

    /// Fills public fields whose declared type is bound or constructible
    fn inject_fields(&self, concrete: &TypeKey, object: &mut AnyBox) -> DiResult<()> {
        let metadata = self.metadata();
        let fields = metadata
            .public_fields(concrete)
            .map_err(|e| DiError::reflection(concrete.as_str(), e))?;

        for field in fields {
            let Some(declared) = field.declared_type.as_ref() else {
                continue;
            };
            if !metadata.type_exists(declared) {
                continue;
            }
            let target = match self.injected(declared, Some(&field.annotations), None)? {
                Some(bound) => bound,
                None if self.is_instantiable(declared) => declared.clone(),
                None => continue,
            };
            let value = self.resolve(&target, &Parameters::new())?;
            metadata
                .set_public_field(concrete, object, &field.name, value)
                .map_err(|e| DiError::reflection(format!("{}::${}", concrete, field.name), e))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.inner.registry.read().len())
            .field("singletons", &self.inner.singletons.len())
            .field("options", &self.inner.options)
            .finish()
    }
}

/// Builder for [`Container`]
pub struct ContainerBuilder {
    metadata: Arc<dyn MetadataProvider>,
    options: ContainerOptions,
    observers: Observers,
}

impl ContainerBuilder {
    /// Builder over a provider that is shared with other owners
    pub fn from_shared(metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            metadata,
            options: ContainerOptions::default(),
            observers: Observers::new(),
        }
    }

    pub fn with_options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_flush_mode(mut self, mode: FlushMode) -> Self {
        self.options.flush_mode = mode;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    /// Adds an observer; observers are called in registration order
    pub fn with_observer(mut self, observer: Arc<dyn DiObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn build(self) -> Container {
        if self.observers.has_observers() {
            tracing::debug!("container built with resolution observers");
        }
        Container {
            inner: Arc::new(ContainerInner {
                metadata: self.metadata,
                registry: RwLock::new(BindingRegistry::new()),
                singletons: SingletonCache::new(),
                observers: self.observers,
                options: self.options.sanitized(),
            }),
        }
    }
}
