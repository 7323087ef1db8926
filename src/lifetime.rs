//! Instance lifetime for bound variants.

/// Lifetime of the instances produced for a bound concrete type
///
/// A concrete type becomes a singleton when any binding variant naming it is
/// registered with [`Lifetime::Singleton`]. The mark is recorded at bind time
/// and outlives the binding itself (see [`FlushMode`](crate::FlushMode)).
///
/// # Examples
///
/// ```rust
/// use autowire_di::{BindingSpec, Lifetime, VariantSpec};
///
/// let spec = BindingSpec::tagged([
///     ("primary", VariantSpec::new("SmtpMailer").singleton()),
///     ("fallback", VariantSpec::new("NullMailer")),
/// ]);
/// let BindingSpec::Tagged(variants) = spec else { unreachable!() };
/// assert_eq!(variants[0].1.lifetime, Lifetime::Singleton);
/// assert_eq!(variants[1].1.lifetime, Lifetime::Transient);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// First successfully constructed instance is cached and reused for every
    /// later resolution, whatever arguments are supplied afterwards
    Singleton,
    /// New instance per resolution, never cached
    #[default]
    Transient,
}

impl Lifetime {
    #[inline]
    pub fn is_singleton(self) -> bool {
        matches!(self, Lifetime::Singleton)
    }
}
