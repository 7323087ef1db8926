//! Type name keys for bindings, metadata lookup and the singleton cache.

use std::fmt;
use std::sync::Arc;

/// Normalized type name used as the lookup key everywhere in the container.
///
/// Names are compared after stripping one leading namespace separator, so
/// `\Foo`, `::Foo` and `Foo` all refer to the same type. Cloning is cheap
/// (the name is shared behind an `Arc`).
///
/// # Examples
///
/// ```rust
/// use autowire_di::TypeKey;
///
/// assert_eq!(TypeKey::new("\\App\\Mailer"), TypeKey::new("App\\Mailer"));
/// assert_eq!(TypeKey::new("::app::Mailer").as_str(), "app::Mailer");
/// assert!(TypeKey::new("\\").is_empty());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Arc<str>);

impl TypeKey {
    pub fn new(name: &str) -> Self {
        TypeKey(Arc::from(normalize_type_name(name)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Strips a single leading `\` or `::` from a type name.
pub fn normalize_type_name(name: &str) -> &str {
    name.strip_prefix('\\')
        .or_else(|| name.strip_prefix("::"))
        .unwrap_or(name)
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        TypeKey::new(name)
    }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self {
        TypeKey::new(&name)
    }
}

impl From<&String> for TypeKey {
    fn from(name: &String) -> Self {
        TypeKey::new(name)
    }
}

impl From<&TypeKey> for TypeKey {
    fn from(key: &TypeKey) -> Self {
        key.clone()
    }
}

impl PartialEq<str> for TypeKey {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == normalize_type_name(other)
    }
}

impl PartialEq<&str> for TypeKey {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == normalize_type_name(other)
    }
}
