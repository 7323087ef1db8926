//! Type metadata consumed by the resolution engine.
//!
//! The engine never inspects Rust types itself. Everything it needs to know
//! about a type (its kind, its supertypes, constructor and method signatures,
//! public fields, and how to construct or call into it) comes from a
//! [`MetadataProvider`]. [`TypeTable`] is the built-in provider backed by
//! explicit registration.

use std::fmt;

use crate::error::ReflectionError;
use crate::key::TypeKey;
use crate::value::{AnyBox, Arguments, Instance, Value};

pub mod table;

pub use table::{TypeDescriptor, TypeTable};

/// Name of the constructor pseudo-method
pub const CONSTRUCTOR: &str = "__construct";

/// Capability flags of a known type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Concrete,
    Abstract,
    Interface,
}

impl TypeKind {
    /// Only concrete types can be constructed
    #[inline]
    pub fn is_concrete(self) -> bool {
        matches!(self, TypeKind::Concrete)
    }
}

/// One `@tag body` entry of a callable's or field's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub tag: String,
    pub body: String,
}

impl Annotation {
    /// True when `name` (or `$name`) appears as a whitespace-separated token
    /// of the body
    pub fn mentions(&self, name: &str) -> bool {
        self.body
            .split_whitespace()
            .any(|token| token.trim_start_matches('$') == name)
    }
}

/// Ordered `(tag, body)` metadata attached to a callable or field.
///
/// Used only to pick among the tagged variants of a binding.
///
/// # Examples
///
/// ```rust
/// use autowire_di::Annotations;
///
/// let parsed = Annotations::parse("/**\n * @second $start\n * @var IStart\n */");
/// assert!(parsed.has_tag("second"));
/// assert_eq!(parsed.body_of("var"), Some("IStart"));
///
/// let built = Annotations::new().with("second", "$start");
/// assert_eq!(built.body_of("second"), Some("$start"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    entries: Vec<Annotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from docblock-style text: every `@tag` starts an entry whose body
    /// runs to the end of its line.
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        for line in text.lines() {
            let mut rest = line;
            while let Some(at) = rest.find('@') {
                let after = &rest[at + 1..];
                let tag_len = after
                    .find(|c: char| c.is_whitespace() || c == '@' || c == '*')
                    .unwrap_or(after.len());
                let tag = &after[..tag_len];
                let tail = &after[tag_len..];
                let body_end = tail.find('@').unwrap_or(tail.len());
                let body = tail[..body_end].trim().trim_end_matches("*/").trim();
                if !tag.is_empty() {
                    entries.push(Annotation {
                        tag: tag.to_string(),
                        body: body.to_string(),
                    });
                }
                rest = &tail[body_end..];
            }
        }
        Self { entries }
    }

    pub fn with(mut self, tag: impl Into<String>, body: impl Into<String>) -> Self {
        self.push(tag, body);
        self
    }

    pub fn push(&mut self, tag: impl Into<String>, body: impl Into<String>) {
        self.entries.push(Annotation {
            tag: tag.into(),
            body: body.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.entries.iter().any(|a| a.tag == tag)
    }

    /// Body of the first entry carrying `tag`
    pub fn body_of(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.tag == tag)
            .map(|a| a.body.as_str())
    }

    /// True when any entry carrying `tag` mentions `name` in its body
    pub fn tag_mentions(&self, tag: &str, name: &str) -> bool {
        self.entries
            .iter()
            .any(|a| a.tag == tag && a.mentions(name))
    }
}

impl From<&str> for Annotations {
    fn from(text: &str) -> Self {
        Annotations::parse(text)
    }
}

/// A parameter of a constructor or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    /// Declared object type, `None` for raw-data parameters
    pub declared_type: Option<TypeKey>,
    /// Parameter has a default value the callable applies itself
    pub optional: bool,
}

impl ParameterDescriptor {
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: None,
            optional: false,
        }
    }

    pub fn typed(name: impl Into<String>, declared_type: impl Into<TypeKey>) -> Self {
        Self {
            name: name.into(),
            declared_type: Some(declared_type.into()),
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Parameters and metadata of a callable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub parameters: Vec<ParameterDescriptor>,
    pub annotations: Annotations,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn annotate(mut self, tag: impl Into<String>, body: impl Into<String>) -> Self {
        self.annotations.push(tag, body);
        self
    }

    pub fn with_annotations(mut self, annotations: impl Into<Annotations>) -> Self {
        self.annotations = annotations.into();
        self
    }
}

/// A public field eligible for injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub declared_type: Option<TypeKey>,
    pub annotations: Annotations,
}

/// Introspection and invocation capabilities the engine relies on.
///
/// Implementations must be cheap to query; the engine asks for kinds and
/// signatures on every resolution.
pub trait MetadataProvider: Send + Sync {
    /// Kind of a known type, `None` when the type does not exist
    fn type_kind(&self, name: &TypeKey) -> Option<TypeKind>;

    fn type_exists(&self, name: &TypeKey) -> bool {
        self.type_kind(name).is_some()
    }

    fn interface_exists(&self, name: &TypeKey) -> bool {
        self.type_kind(name) == Some(TypeKind::Interface)
    }

    fn is_abstract_or_interface(&self, name: &TypeKey) -> bool {
        matches!(
            self.type_kind(name),
            Some(TypeKind::Abstract) | Some(TypeKind::Interface)
        )
    }

    /// True when `concrete` implements the interface `target` or subclasses it
    fn implements_or_subclasses(&self, concrete: &TypeKey, target: &TypeKey) -> bool;

    /// Public constructor signature, `None` when the type has no public constructor
    fn constructor_signature(&self, name: &TypeKey) -> Result<Option<Signature>, ReflectionError>;

    fn is_method_public(&self, name: &TypeKey, method: &str) -> bool;

    fn method_signature(&self, name: &TypeKey, method: &str) -> Result<Signature, ReflectionError>;

    fn public_fields(&self, name: &TypeKey) -> Result<Vec<FieldDescriptor>, ReflectionError>;

    fn construct(&self, name: &TypeKey, args: &Arguments) -> Result<AnyBox, ReflectionError>;

    fn construct_without_args(&self, name: &TypeKey) -> Result<AnyBox, ReflectionError>;

    fn set_public_field(
        &self,
        name: &TypeKey,
        target: &mut AnyBox,
        field: &str,
        value: Instance,
    ) -> Result<(), ReflectionError>;

    fn invoke(&self, instance: &Instance, method: &str, args: &Arguments) -> Result<Value, ReflectionError>;
}

impl fmt::Debug for dyn MetadataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MetadataProvider")
    }
}
