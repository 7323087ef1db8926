//! Registration-backed metadata provider.

use std::any::Any;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use indexmap::IndexMap;

use super::{Annotations, FieldDescriptor, MetadataProvider, Signature, TypeKind};
use crate::error::ReflectionError;
use crate::key::TypeKey;
use crate::value::{AnyBox, Arguments, Instance, Value};

type ConstructorFn = Arc<dyn Fn(&Arguments) -> Result<AnyBox, ReflectionError> + Send + Sync>;
type BareFn = Arc<dyn Fn() -> AnyBox + Send + Sync>;
type MethodFn = Arc<dyn Fn(&Instance, &Arguments) -> Result<Value, ReflectionError> + Send + Sync>;
type SetterFn = Arc<dyn Fn(&mut AnyBox, Instance) -> Result<(), ReflectionError> + Send + Sync>;

struct MethodEntry {
    public: bool,
    signature: Signature,
    body: Option<MethodFn>,
}

struct FieldEntry {
    descriptor: FieldDescriptor,
    setter: SetterFn,
}

/// Everything the container may know about one type.
///
/// # Examples
///
/// ```rust
/// use autowire_di::{ParameterDescriptor, Signature, TypeDescriptor, TypeTable, Value};
///
/// struct Mailer { host: String }
///
/// let table = TypeTable::new()
///     .with(TypeDescriptor::interface("MailerInterface"))
///     .with(
///         TypeDescriptor::concrete("Mailer")
///             .implements("MailerInterface")
///             .constructor(
///                 Signature::new().param(ParameterDescriptor::untyped("host")),
///                 |args| Ok(Mailer { host: args.str("host").unwrap_or("localhost").to_string() }),
///             )
///             .method("host", Signature::new(), |this, _| {
///                 Ok(Value::from(this.downcast_ref::<Mailer>().map(|m| m.host.clone()).unwrap_or_default()))
///             }),
///     );
/// assert_eq!(table.len(), 2);
/// ```
pub struct TypeDescriptor {
    name: TypeKey,
    kind: TypeKind,
    parent: Option<TypeKey>,
    interfaces: Vec<TypeKey>,
    constructor: Option<(Signature, ConstructorFn)>,
    bare: Option<BareFn>,
    methods: IndexMap<String, MethodEntry>,
    fields: Vec<FieldEntry>,
}

impl TypeDescriptor {
    fn with_kind(name: impl Into<TypeKey>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            interfaces: Vec::new(),
            constructor: None,
            bare: None,
            methods: IndexMap::new(),
            fields: Vec::new(),
        }
    }

    pub fn concrete(name: impl Into<TypeKey>) -> Self {
        Self::with_kind(name, TypeKind::Concrete)
    }

    pub fn abstract_class(name: impl Into<TypeKey>) -> Self {
        Self::with_kind(name, TypeKind::Abstract)
    }

    pub fn interface(name: impl Into<TypeKey>) -> Self {
        Self::with_kind(name, TypeKind::Interface)
    }

    pub fn name(&self) -> &TypeKey {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Parent class (or parent interface for interfaces)
    pub fn extends(mut self, parent: impl Into<TypeKey>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<TypeKey>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Public constructor
    pub fn constructor<T, F>(mut self, signature: Signature, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, ReflectionError> + Send + Sync + 'static,
    {
        let ctor: ConstructorFn = Arc::new(move |args: &Arguments| body(args).map(|v| Box::new(v) as AnyBox));
        self.constructor = Some((signature, ctor));
        self
    }

    /// How to build an instance when the type has no public constructor
    pub fn bare<T, F>(mut self, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.bare = Some(Arc::new(move || Box::new(body()) as AnyBox));
        self
    }

    /// Public method
    pub fn method<F>(mut self, name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&Instance, &Arguments) -> Result<Value, ReflectionError> + Send + Sync + 'static,
    {
        self.methods.insert(
            name.into(),
            MethodEntry {
                public: true,
                signature,
                body: Some(Arc::new(body)),
            },
        );
        self
    }

    /// Method that exists but may not be invoked through the container
    pub fn non_public_method(mut self, name: impl Into<String>) -> Self {
        self.methods.insert(
            name.into(),
            MethodEntry {
                public: false,
                signature: Signature::new(),
                body: None,
            },
        );
        self
    }

    /// Public field whose declared type makes it a candidate for injection.
    ///
    /// Fields are not inherited: the setter receives the object built for
    /// this exact type.
    pub fn field<T, F>(
        mut self,
        name: impl Into<String>,
        declared_type: impl Into<TypeKey>,
        annotations: impl Into<Annotations>,
        setter: F,
    ) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut T, Instance) + Send + Sync + 'static,
    {
        let name = name.into();
        let field_name = name.clone();
        let setter: SetterFn = Arc::new(move |target: &mut AnyBox, value: Instance| match target.downcast_mut::<T>() {
            Some(target) => {
                setter(target, value);
                Ok(())
            }
            None => Err(ReflectionError::new(format!(
                "field `{}` cannot be set on a value that is not a {}",
                field_name,
                std::any::type_name::<T>()
            ))),
        });
        self.fields.push(FieldEntry {
            descriptor: FieldDescriptor {
                name,
                declared_type: Some(declared_type.into()),
                annotations: annotations.into(),
            },
            setter,
        });
        self
    }
}

/// [`MetadataProvider`] built from explicitly registered [`TypeDescriptor`]s.
#[derive(Default)]
pub struct TypeTable {
    types: HashMap<TypeKey, TypeDescriptor>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Registers (or replaces) a type
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, name: &TypeKey) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn lookup(&self, name: &TypeKey) -> Result<&TypeDescriptor, ReflectionError> {
        self.types
            .get(name)
            .ok_or_else(|| ReflectionError::new(format!("class {} does not exist", name)))
    }

    /// Walks `name` and its parent classes; stops on unknown parents and loops
    fn find_method(&self, name: &TypeKey, method: &str) -> Option<&MethodEntry> {
        let mut current = self.types.get(name);
        let mut seen = HashSet::new();
        while let Some(desc) = current {
            if !seen.insert(&desc.name) {
                return None;
            }
            if let Some(entry) = desc.methods.get(method) {
                return Some(entry);
            }
            current = desc.parent.as_ref().and_then(|p| self.types.get(p));
        }
        None
    }
}

impl MetadataProvider for TypeTable {
    fn type_kind(&self, name: &TypeKey) -> Option<TypeKind> {
        self.types.get(name).map(|d| d.kind)
    }

    fn implements_or_subclasses(&self, concrete: &TypeKey, target: &TypeKey) -> bool {
        let mut queue: VecDeque<&TypeKey> = VecDeque::from([concrete]);
        let mut seen: HashSet<&TypeKey> = HashSet::new();
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name) {
                continue;
            }
            let Some(desc) = self.types.get(name) else {
                continue;
            };
            for supertype in desc.parent.iter().chain(desc.interfaces.iter()) {
                if supertype == target {
                    return true;
                }
                queue.push_back(supertype);
            }
        }
        false
    }

    fn constructor_signature(&self, name: &TypeKey) -> Result<Option<Signature>, ReflectionError> {
        Ok(self.lookup(name)?.constructor.as_ref().map(|(sig, _)| sig.clone()))
    }

    fn is_method_public(&self, name: &TypeKey, method: &str) -> bool {
        self.find_method(name, method).is_some_and(|m| m.public)
    }

    fn method_signature(&self, name: &TypeKey, method: &str) -> Result<Signature, ReflectionError> {
        self.find_method(name, method)
            .map(|m| m.signature.clone())
            .ok_or_else(|| ReflectionError::new(format!("method {}::{} does not exist", name, method)))
    }

    fn public_fields(&self, name: &TypeKey) -> Result<Vec<FieldDescriptor>, ReflectionError> {
        Ok(self
            .lookup(name)?
            .fields
            .iter()
            .map(|f| f.descriptor.clone())
            .collect())
    }

    fn construct(&self, name: &TypeKey, args: &Arguments) -> Result<AnyBox, ReflectionError> {
        let desc = self.lookup(name)?;
        if !desc.kind.is_concrete() {
            return Err(ReflectionError::new(format!("cannot instantiate {:?} type {}", desc.kind, name)));
        }
        match &desc.constructor {
            Some((_, ctor)) => ctor(args),
            None => Err(ReflectionError::new(format!("class {} has no public constructor", name))),
        }
    }

    fn construct_without_args(&self, name: &TypeKey) -> Result<AnyBox, ReflectionError> {
        let desc = self.lookup(name)?;
        if !desc.kind.is_concrete() {
            return Err(ReflectionError::new(format!("cannot instantiate {:?} type {}", desc.kind, name)));
        }
        match &desc.bare {
            Some(bare) => Ok(bare()),
            None => Err(ReflectionError::new(format!(
                "class {} has neither a public constructor nor a bare constructor",
                name
            ))),
        }
    }

    fn set_public_field(
        &self,
        name: &TypeKey,
        target: &mut AnyBox,
        field: &str,
        value: Instance,
    ) -> Result<(), ReflectionError> {
        let entry = self
            .lookup(name)?
            .fields
            .iter()
            .find(|f| f.descriptor.name == field)
            .ok_or_else(|| ReflectionError::new(format!("property {}::${} does not exist", name, field)))?;
        (entry.setter)(target, value)
    }

    fn invoke(&self, instance: &Instance, method: &str, args: &Arguments) -> Result<Value, ReflectionError> {
        let name = instance.type_name();
        match self.find_method(name, method) {
            Some(MethodEntry { public: true, body: Some(body), .. }) => body(instance, args),
            Some(_) => Err(ReflectionError::new(format!("method {}::{} is not public", name, method))),
            None => Err(ReflectionError::new(format!("method {}::{} does not exist", name, method))),
        }
    }
}
