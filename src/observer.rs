//! Diagnostic observers for resolution traceability.
//!
//! Observers receive a callback for every construction the container
//! performs, which makes it possible to follow how an object graph was wired
//! and where a resolution failed.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::TypeKey;

/// Observer trait for resolution events.
///
/// Calls are made synchronously on the resolving thread; keep implementations
/// lightweight.
///
/// # Examples
///
/// ```
/// use autowire_di::{Container, DiObserver, TypeKey, TypeTable};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct CountingObserver(AtomicUsize);
///
/// impl DiObserver for CountingObserver {
///     fn resolving(&self, _: &TypeKey) {}
///
///     fn resolved(&self, _: &TypeKey, _: Duration) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let counter = Arc::new(CountingObserver::default());
/// let container = Container::builder(TypeTable::new())
///     .with_observer(counter.clone())
///     .build();
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a concrete type is constructed
    fn resolving(&self, name: &TypeKey);

    /// Called after construction and field injection succeeded
    fn resolved(&self, name: &TypeKey, duration: Duration);

    /// Called when a cached singleton short-circuits construction
    fn singleton_hit(&self, _name: &TypeKey) {}

    /// Called when constructing `name` failed; the error still propagates
    fn failed(&self, _name: &TypeKey, _error: &DiError) {}
}

/// Container for registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, name: &TypeKey) {
        for observer in &self.observers {
            observer.resolving(name);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, name: &TypeKey, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(name, duration);
        }
    }

    #[inline]
    pub(crate) fn singleton_hit(&self, name: &TypeKey) {
        for observer in &self.observers {
            observer.singleton_hit(name);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, name: &TypeKey, error: &DiError) {
        for observer in &self.observers {
            observer.failed(name, error);
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// Progress is logged at `debug`, failures at `warn`.
///
/// ```
/// use autowire_di::{Container, LoggingObserver, TypeTable};
/// use std::sync::Arc;
///
/// let container = Container::builder(TypeTable::new())
///     .with_observer(Arc::new(LoggingObserver::with_prefix("[app-di]")))
///     .build();
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "[autowire-di]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, name: &TypeKey) {
        tracing::debug!(prefix = %self.prefix, type_name = %name, "resolving");
    }

    fn resolved(&self, name: &TypeKey, duration: Duration) {
        tracing::debug!(prefix = %self.prefix, type_name = %name, ?duration, "resolved");
    }

    fn singleton_hit(&self, name: &TypeKey) {
        tracing::debug!(prefix = %self.prefix, type_name = %name, "singleton cache hit");
    }

    fn failed(&self, name: &TypeKey, error: &DiError) {
        tracing::warn!(prefix = %self.prefix, type_name = %name, %error, "resolution failed");
    }
}
