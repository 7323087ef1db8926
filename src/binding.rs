//! Binding registry: abstract type → concrete variant(s).

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::lifetime::Lifetime;
use crate::metadata::{Annotations, MetadataProvider};
use crate::value::{Argument, Parameters};

/// Requested shape of one variant of a binding.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSpec {
    pub concrete: String,
    pub lifetime: Lifetime,
    pub parameters: Parameters,
}

impl VariantSpec {
    pub fn new(concrete: impl Into<String>) -> Self {
        Self {
            concrete: concrete.into(),
            lifetime: Lifetime::Transient,
            parameters: Parameters::new(),
        }
    }

    pub fn singleton(mut self) -> Self {
        self.lifetime = Lifetime::Singleton;
        self
    }

    /// Preset parameter applied whenever the concrete type is constructed
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Argument>) -> Self {
        self.parameters.insert(name, value);
        self
    }

    pub fn parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }
}

impl From<&str> for VariantSpec {
    fn from(concrete: &str) -> Self {
        VariantSpec::new(concrete)
    }
}

impl From<String> for VariantSpec {
    fn from(concrete: String) -> Self {
        VariantSpec::new(concrete)
    }
}

/// Requested shape of a binding passed to [`BindingRegistry::bind`].
///
/// # Examples
///
/// ```rust
/// use autowire_di::{BindingSpec, VariantSpec};
///
/// let single: BindingSpec = "Next".into();
/// let tagged = BindingSpec::tagged([
///     ("star", VariantSpec::new("Start")),
///     ("second", VariantSpec::new("Starter").singleton()),
/// ]);
/// assert!(matches!(single, BindingSpec::Single(_)));
/// assert!(matches!(tagged, BindingSpec::Tagged(ref v) if v.len() == 2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum BindingSpec {
    /// One unconditional variant
    Single(VariantSpec),
    /// Ordered `tag → variant` alternatives
    Tagged(Vec<(String, VariantSpec)>),
}

impl BindingSpec {
    pub fn tagged<I, K, V>(variants: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<VariantSpec>,
    {
        BindingSpec::Tagged(variants.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<&str> for BindingSpec {
    fn from(concrete: &str) -> Self {
        BindingSpec::Single(VariantSpec::new(concrete))
    }
}

impl From<String> for BindingSpec {
    fn from(concrete: String) -> Self {
        BindingSpec::Single(VariantSpec::new(concrete))
    }
}

impl From<VariantSpec> for BindingSpec {
    fn from(variant: VariantSpec) -> Self {
        BindingSpec::Single(variant)
    }
}

/// A validated alternative of a binding
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub tag: Option<String>,
    pub concrete: TypeKey,
    pub lifetime: Lifetime,
    pub parameters: Parameters,
}

impl Variant {
    fn from_spec(tag: Option<String>, spec: VariantSpec) -> Option<Self> {
        let concrete = TypeKey::new(&spec.concrete);
        if concrete.is_empty() {
            return None;
        }
        Some(Self {
            tag,
            concrete,
            lifetime: spec.lifetime,
            parameters: spec.parameters,
        })
    }
}

/// Stored binding for one abstract type
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Single(Variant),
    Tagged(IndexMap<String, Variant>),
}

impl Binding {
    /// Variants in registration order
    pub fn variants(&self) -> Box<dyn Iterator<Item = &Variant> + '_> {
        match self {
            Binding::Single(v) => Box::new(std::iter::once(v)),
            Binding::Tagged(map) => Box::new(map.values()),
        }
    }

    fn first(&self) -> Option<&Variant> {
        match self {
            Binding::Single(v) => Some(v),
            Binding::Tagged(map) => map.values().next(),
        }
    }
}

/// Registry of bindings and preset parameters.
///
/// Singleton status lives in the [`SingletonCache`](crate::SingletonCache):
/// binding a singleton variant through a container reserves its slot there.
///
/// Insertion order of bindings and of the variants inside a tagged binding is
/// preserved; the first registered variant is the fallback whenever no tag
/// matches.
///
/// # Examples
///
/// ```rust
/// use autowire_di::{Annotations, BindingRegistry, BindingSpec};
///
/// let mut registry = BindingRegistry::new();
/// assert!(registry.bind("IStart", BindingSpec::tagged([("star", "Start"), ("second", "Starter")])));
///
/// let second = Annotations::new().with("second", "");
/// assert_eq!(registry.resolve_concrete_type("IStart", Some(&second), None).unwrap(), "Starter");
/// assert_eq!(registry.resolve_concrete_type("IStart", None, None).unwrap(), "Start");
/// assert!(registry.resolve_concrete_type("INext", None, None).is_none());
/// ```
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: IndexMap<TypeKey, Binding>,
    presets: HashMap<TypeKey, Parameters>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `abstract_type` to `spec`, replacing any earlier binding.
    ///
    /// Returns `false` (and changes nothing) when the abstract name is empty,
    /// when a single binding names an empty concrete type, or when a tagged
    /// binding has no valid entry. Invalid entries of a tagged binding are
    /// skipped while the valid ones are applied.
    pub fn bind(&mut self, abstract_type: impl Into<TypeKey>, spec: impl Into<BindingSpec>) -> bool {
        let key = abstract_type.into();
        if key.is_empty() {
            return false;
        }

        let binding = match spec.into() {
            BindingSpec::Single(variant) => match Variant::from_spec(None, variant) {
                Some(v) => Binding::Single(v),
                None => return false,
            },
            BindingSpec::Tagged(entries) => {
                let mut variants = IndexMap::new();
                for (tag, spec) in entries {
                    if tag.is_empty() {
                        continue;
                    }
                    if let Some(v) = Variant::from_spec(Some(tag.clone()), spec) {
                        variants.insert(tag, v);
                    }
                }
                if variants.is_empty() {
                    return false;
                }
                Binding::Tagged(variants)
            }
        };

        for variant in binding.variants() {
            if !variant.parameters.is_empty() {
                self.presets
                    .insert(variant.concrete.clone(), variant.parameters.clone());
            }
        }
        self.bindings.insert(key, binding);
        true
    }

    /// Applies [`bind`](Self::bind) per entry; returns how many were applied
    pub fn bind_many<I, K, S>(&mut self, entries: I) -> usize
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

    pub fn get(&self, abstract_type: impl Into<TypeKey>) -> Option<&Binding> {
        self.bindings.get(&abstract_type.into())
    }

    pub fn is_bound(&self, abstract_type: impl Into<TypeKey>) -> bool {
        self.get(abstract_type).is_some()
    }

    /// Picks the concrete type bound to `abstract_type`.
    ///
    /// A tagged binding selects among the variants whose tag appears in
    /// `annotations`; when several match and `parameter` is given, the variant
    /// whose annotation body mentions the parameter wins. Without a usable
    /// match the first registered variant is returned.
    pub fn resolve_concrete_type(
        &self,
        abstract_type: impl Into<TypeKey>,
        annotations: Option<&Annotations>,
        parameter: Option<&str>,
    ) -> Option<TypeKey> {
        let binding = self.get(abstract_type)?;
        let variants = match binding {
            Binding::Single(v) => return Some(v.concrete.clone()),
            Binding::Tagged(map) => map,
        };

        let annotations = match annotations {
            Some(a) if !a.is_empty() => a,
            _ => return binding.first().map(|v| v.concrete.clone()),
        };

        let candidates: Vec<(&String, &Variant)> = variants
            .iter()
            .filter(|(tag, _)| annotations.has_tag(tag))
            .collect();

        let chosen = match (candidates.as_slice(), parameter) {
            ([], _) => binding.first(),
            ([(_, only)], _) => Some(*only),
            (many, Some(name)) => many
                .iter()
                .find(|(tag, _)| annotations.tag_mentions(tag, name))
                .or_else(|| many.first())
                .map(|(_, v)| *v),
            (many, None) => many.first().map(|(_, v)| *v),
        };
        chosen.map(|v| v.concrete.clone())
    }

    /// Preset parameters registered for a concrete type
    pub fn preset_parameters(&self, concrete: impl Into<TypeKey>) -> Option<&Parameters> {
        self.presets.get(&concrete.into())
    }

    /// Capability check: `concrete` is `abstract_type` itself, implements it
    /// or subclasses it
    pub fn validate_implements(
        metadata: &dyn MetadataProvider,
        concrete: &TypeKey,
        abstract_type: &TypeKey,
    ) -> DiResult<()> {
        if concrete == abstract_type || metadata.implements_or_subclasses(concrete, abstract_type) {
            Ok(())
        } else {
            Err(DiError::MustImplement {
                concrete: concrete.clone(),
                abstract_type: abstract_type.clone(),
            })
        }
    }

    /// Resolves the binding for `abstract_type` and validates it.
    ///
    /// `Ok(None)` when nothing is bound.
    pub fn injected(
        &self,
        metadata: &dyn MetadataProvider,
        abstract_type: &TypeKey,
        annotations: Option<&Annotations>,
        parameter: Option<&str>,
    ) -> DiResult<Option<TypeKey>> {
        match self.resolve_concrete_type(abstract_type, annotations, parameter) {
            Some(concrete) => {
                Self::validate_implements(metadata, &concrete, abstract_type)?;
                Ok(Some(concrete))
            }
            None => Ok(None),
        }
    }

    /// False for unknown, abstract and interface types
    pub fn is_instantiable(metadata: &dyn MetadataProvider, name: &TypeKey) -> bool {
        metadata.type_kind(name).is_some_and(|k| k.is_concrete())
    }

    /// Clears bindings only; presets survive
    pub fn flush_all(&mut self) {
        self.bindings.clear();
    }

    /// Clears bindings and presets
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.presets.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeKey, &Binding)> {
        self.bindings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_names() {
        let mut registry = BindingRegistry::new();
        assert!(!registry.bind("", "Test"));
        assert!(!registry.bind("\\", "Test"));
        assert!(!registry.bind("ITest", ""));
        assert!(!registry.bind("ITest", BindingSpec::tagged([("", "Test")])));
        assert!(!registry.bind("ITest", BindingSpec::tagged([("hello", "")])));
        assert!(registry.is_empty());
    }

    #[test]
    fn tagged_binding_keeps_valid_entries() {
        let mut registry = BindingRegistry::new();
        assert!(registry.bind(
            "ITest",
            BindingSpec::tagged([("first", "Test"), ("", "Broken"), ("third", "TestThird")])
        ));
        let Some(Binding::Tagged(map)) = registry.get("ITest") else {
            panic!("expected tagged binding");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), ["first", "third"]);
    }

    #[test]
    fn leading_separator_is_ignored() {
        let mut registry = BindingRegistry::new();
        registry.bind("\\ITest", "\\Test");
        assert_eq!(registry.resolve_concrete_type("ITest", None, None).unwrap(), "Test");
    }

    #[test]
    fn parameter_name_breaks_ties_between_matched_tags() {
        let mut registry = BindingRegistry::new();
        registry.bind("IStart", BindingSpec::tagged([("star", "Start"), ("second", "Starter")]));
        let annotations = Annotations::new().with("star", "$start").with("second", "$other");

        let pick = |p| registry.resolve_concrete_type("IStart", Some(&annotations), p).unwrap();
        assert_eq!(pick(Some("other")), "Starter");
        assert_eq!(pick(Some("start")), "Start");
        assert_eq!(pick(Some("unrelated")), "Start");
        assert_eq!(pick(None), "Start");
    }

    #[test]
    fn flush_keeps_presets() {
        let mut registry = BindingRegistry::new();
        registry.bind(
            "ISingle",
            BindingSpec::tagged([("one", VariantSpec::new("Single").singleton().parameter("id", 4))]),
        );
        registry.flush_all();
        assert!(registry.is_empty());
        assert!(registry.preset_parameters("Single").is_some());

        registry.reset();
        assert!(registry.preset_parameters("Single").is_none());
    }
}
