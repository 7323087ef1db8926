//! Runtime values flowing through the container: live instances, raw data,
//! caller overrides and resolved argument sets.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::ReflectionError;
use crate::key::TypeKey;

/// Type-erased object storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;
pub(crate) type AnyBox = Box<dyn Any + Send + Sync>;

/// A live object produced by the container, tagged with its concrete type name.
///
/// Instances are shared: cloning an `Instance` clones the handle, not the
/// object. Use [`Instance::ptr_eq`] to test identity (singletons) and
/// [`Instance::downcast`] to recover the Rust type.
///
/// # Examples
///
/// ```rust
/// use autowire_di::Instance;
///
/// struct Mailer { host: String }
///
/// let a = Instance::new("Mailer", Mailer { host: "smtp.local".into() });
/// let b = a.clone();
/// assert!(Instance::ptr_eq(&a, &b));
/// assert_eq!(a.downcast_ref::<Mailer>().unwrap().host, "smtp.local");
/// assert!(a.downcast::<String>().is_none());
/// ```
#[derive(Clone)]
pub struct Instance {
    type_name: TypeKey,
    object: AnyArc,
}

impl Instance {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<TypeKey>, value: T) -> Self {
        Self {
            type_name: type_name.into(),
            object: Arc::new(value),
        }
    }

    pub(crate) fn from_boxed(type_name: TypeKey, object: AnyBox) -> Self {
        Self {
            type_name,
            object: Arc::from(object),
        }
    }

    /// Concrete type the instance was constructed as
    #[inline]
    pub fn type_name(&self) -> &TypeKey {
        &self.type_name
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::downcast::<T>(self.object.clone()).ok()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.object.is::<T>()
    }

    /// True when both handles point at the same object
    #[inline]
    pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
        Arc::ptr_eq(&a.object, &b.object)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .field("ptr", &Arc::as_ptr(&self.object))
            .finish()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Instance::ptr_eq(self, other)
    }
}

/// Raw data or a live object.
///
/// Constructor and method bodies receive their arguments as `Value`s and
/// methods return one.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Object(Instance),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Value::Object(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

#[cfg(feature = "config")]
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// A single override supplied by a caller or registered as a preset parameter.
///
/// `Argument::Type` asks the container to build whatever type the name refers
/// to and pass the result; it is honored only for parameters without a
/// declared type. Everything else is passed as a raw [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Value(Value),
    Type(TypeKey),
}

impl Argument {
    pub fn type_ref(name: impl Into<TypeKey>) -> Self {
        Argument::Type(name.into())
    }

    /// Null values count as "not supplied"
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Argument::Value(Value::Null))
    }
}

impl<T: Into<Value>> From<T> for Argument {
    fn from(v: T) -> Self {
        Argument::Value(v.into())
    }
}

/// Insertion-ordered map of named overrides.
///
/// # Examples
///
/// ```rust
/// use autowire_di::{Argument, Parameters};
///
/// let presets = Parameters::new().with("id", 400).with("name", "preset");
/// let caller = Parameters::new().with("id", 100).with_type("mailer", "SmtpMailer");
///
/// let merged = presets.overlay(&caller);
/// assert_eq!(merged.get("id"), Some(&Argument::from(100)));
/// assert_eq!(merged.get("name"), Some(&Argument::from("preset")));
/// assert_eq!(merged.get("mailer"), Some(&Argument::type_ref("SmtpMailer")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: IndexMap<String, Argument>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Argument>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_type(mut self, name: impl Into<String>, type_name: impl Into<TypeKey>) -> Self {
        self.insert(name, Argument::Type(type_name.into()));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Argument>) -> Option<Argument> {
        self.entries.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `self` with every entry of `top` laid over it; `top` wins on
    /// key collision.
    pub fn overlay(&self, top: &Parameters) -> Parameters {
        let mut merged = self.clone();
        for (name, value) in &top.entries {
            merged.entries.insert(name.clone(), value.clone());
        }
        merged
    }
}

impl<K: Into<String>, A: Into<Argument>> FromIterator<(K, A)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, A)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (k, a) in iter {
            params.insert(k, a);
        }
        params
    }
}

/// The resolved, named argument set handed to constructor and method bodies.
///
/// Optional parameters that could not be resolved are simply absent; the body
/// applies its own default.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: IndexMap<String, Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// The argument as a live object
    pub fn object(&self, name: &str) -> Result<&Instance, ReflectionError> {
        self.values
            .get(name)
            .and_then(Value::as_object)
            .ok_or_else(|| ReflectionError::new(format!("argument `{}` is not an object", name)))
    }

    /// The argument downcast to a concrete Rust type
    pub fn downcast<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ReflectionError> {
        self.object(name)?.downcast::<T>().ok_or_else(|| {
            ReflectionError::new(format!(
                "argument `{}` is not a {}",
                name,
                std::any::type_name::<T>()
            ))
        })
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    /// The argument, failing when it was not resolved
    pub fn required(&self, name: &str) -> Result<&Value, ReflectionError> {
        self.values
            .get(name)
            .ok_or_else(|| ReflectionError::new(format!("argument `{}` is missing", name)))
    }
}
