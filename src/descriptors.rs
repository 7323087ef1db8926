//! Binding descriptors for introspection and diagnostics.

use crate::binding::{Binding, BindingRegistry};
use crate::key::TypeKey;
use crate::lifetime::Lifetime;

/// One variant of a registered binding, flattened for inspection.
///
/// A single binding yields one descriptor without a tag; a tagged binding
/// yields one descriptor per tag, in registration order.
///
/// # Use Cases
///
/// - **Debugging**: see which concrete type each interface resolves to
/// - **Validation**: check at startup that every expected interface is bound
/// - **Health checks**: report singleton-bound types
///
/// # Examples
///
/// ```rust
/// use autowire_di::{BindingSpec, Container, Lifetime, TypeTable, VariantSpec};
///
/// let container = Container::new(TypeTable::new());
/// container.bind("INext", "Next");
/// container.bind("IStart", BindingSpec::tagged([
///     ("star", VariantSpec::new("Start")),
///     ("second", VariantSpec::new("Starter").singleton().parameter("id", 7)),
/// ]));
///
/// let descriptors = container.binding_descriptors();
/// assert_eq!(descriptors.len(), 3);
///
/// let next = &descriptors[0];
/// assert_eq!(next.abstract_type, "INext");
/// assert!(!next.is_tagged());
///
/// let starter = descriptors.iter().find(|d| d.tag() == Some("second")).unwrap();
/// assert_eq!(starter.concrete, "Starter");
/// assert_eq!(starter.lifetime, Lifetime::Singleton);
/// assert!(starter.has_parameters);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDescriptor {
    pub abstract_type: TypeKey,
    pub tag: Option<String>,
    pub concrete: TypeKey,
    pub lifetime: Lifetime,
    /// Preset parameters were registered with this variant
    pub has_parameters: bool,
}

impl BindingDescriptor {
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_tagged(&self) -> bool {
        self.tag.is_some()
    }

    pub(crate) fn collect(registry: &BindingRegistry) -> Vec<BindingDescriptor> {
        registry
            .iter()
            .flat_map(|(abstract_type, binding)| {
                let abstract_type = abstract_type.clone();
                let tagged = matches!(binding, Binding::Tagged(_));
                binding
                    .variants()
                    .map(move |variant| BindingDescriptor {
                        abstract_type: abstract_type.clone(),
                        tag: if tagged { variant.tag.clone() } else { None },
                        concrete: variant.concrete.clone(),
                        lifetime: variant.lifetime,
                        has_parameters: !variant.parameters.is_empty(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
