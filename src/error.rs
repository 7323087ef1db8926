//! Error types for the auto-wiring container.

use thiserror::Error;

use crate::key::TypeKey;

/// Resolution errors
///
/// Every failure raised while instantiating a type or invoking a method is
/// reported through this enum. Nothing is recovered locally: a failure deep in
/// a dependency chain unwinds to the caller of
/// [`Container::instantiate`](crate::Container::instantiate) or
/// [`Container::invoke_method`](crate::Container::invoke_method).
///
/// # Examples
///
/// ```rust
/// use autowire_di::{Container, DiError, TypeTable};
///
/// let container = Container::new(TypeTable::new());
/// match container.instantiate("SomethingElse") {
///     Err(DiError::TypeNotFound(name)) => assert_eq!(name.as_str(), "SomethingElse"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use autowire_di::DiError;
///
/// let circular = DiError::Circular(vec!["A".into(), "B".into(), "A".into()]);
/// assert_eq!(circular.to_string(), "circular dependency: A -> B -> A");
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Requested name is neither a known concrete type nor a known interface
    #[error("class {0} does not exist")]
    TypeNotFound(TypeKey),
    /// Requested name is a known interface or abstract class without a binding
    #[error("interface {0} exists but is not injected")]
    NotInjected(TypeKey),
    /// A bound concrete type fails the capability check against its abstract type
    #[error("class {concrete} must implement {abstract_type}")]
    MustImplement {
        concrete: TypeKey,
        abstract_type: TypeKey,
    },
    /// Requested method is absent or not publicly invocable
    #[error("method {method} in {type_name} does not exist or is not public")]
    MethodNotFoundOrNotPublic { type_name: TypeKey, method: String },
    /// A non-optional parameter could not be resolved by any rule
    #[error("required parameter [{parameter}] in {type_name}::{method} is not specified")]
    RequiredParameterMissing {
        parameter: String,
        type_name: TypeKey,
        method: String,
    },
    /// Lower-level metadata failure, wrapped with the type/method being processed
    #[error("reflection failure in {context}: {source}")]
    Reflection {
        context: String,
        #[source]
        source: ReflectionError,
    },
    /// Circular dependency detected (includes path)
    #[error("circular dependency: {}", join_path(.0))]
    Circular(Vec<TypeKey>),
    /// Maximum construction depth exceeded
    #[error("max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Instance could not be downcast to the requested Rust type
    #[error("type mismatch for: {0}")]
    TypeMismatch(TypeKey),
}

impl DiError {
    pub(crate) fn reflection(context: impl Into<String>, source: ReflectionError) -> Self {
        DiError::Reflection {
            context: context.into(),
            source,
        }
    }
}

fn join_path(path: &[TypeKey]) -> String {
    path.iter()
        .map(TypeKey::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Failure reported by a [`MetadataProvider`](crate::MetadataProvider).
///
/// Constructor and method bodies registered in a
/// [`TypeTable`](crate::TypeTable) return this error too, typically through
/// the accessors on [`Arguments`](crate::Arguments).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ReflectionError {
    message: String,
}

impl ReflectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for container operations
pub type DiResult<T> = Result<T, DiError>;
