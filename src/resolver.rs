//! Argument resolution for constructors and methods.

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::key::TypeKey;
use crate::metadata::{ParameterDescriptor, Signature};
use crate::value::{Argument, Arguments, Parameters, Value};

/// Turns a callable's parameter list plus caller overrides into the named
/// argument set the callable receives.
///
/// Every parameter is settled by the first rule that applies:
///
/// 1. untyped parameter with an [`Argument::Type`] override: build the named
///    type ([`DiError::TypeNotFound`] when it does not exist)
/// 2. override whose shape fits the parameter: pass it through
/// 3. declared type with a binding: build the bound concrete type, selected
///    with the callable's annotations and the parameter name
/// 4. declared type that is itself constructible: build it
/// 5. optional parameter: leave it out
/// 6. otherwise [`DiError::RequiredParameterMissing`]
pub(crate) struct ArgumentResolver<'c> {
    container: &'c Container,
}

impl<'c> ArgumentResolver<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self { container }
    }

    pub(crate) fn resolve(
        &self,
        type_name: &TypeKey,
        method: &str,
        signature: &Signature,
        overrides: &Parameters,
    ) -> DiResult<Arguments> {
        let mut arguments = Arguments::new();
        for parameter in &signature.parameters {
            match self.resolve_one(parameter, signature, overrides)? {
                Some(value) => arguments.insert(parameter.name.as_str(), value),
                None if parameter.optional => {}
                None => {
                    return Err(DiError::RequiredParameterMissing {
                        parameter: parameter.name.clone(),
                        type_name: type_name.clone(),
                        method: method.to_string(),
                    })
                }
            }
        }
        Ok(arguments)
    }

    fn resolve_one(
        &self,
        parameter: &ParameterDescriptor,
        signature: &Signature,
        overrides: &Parameters,
    ) -> DiResult<Option<Value>> {
        let metadata = self.container.metadata();
        let supplied = overrides.get(&parameter.name).filter(|a| !a.is_null());

        match (&parameter.declared_type, supplied) {
            (None, Some(Argument::Type(target))) => {
                if !metadata.type_exists(target) {
                    return Err(DiError::TypeNotFound(target.clone()));
                }
                tracing::trace!(parameter = %parameter.name, %target, "building type named by override");
                return self.container.resolve(target, &Parameters::new()).map(|i| Some(Value::Object(i)));
            }
            (None, Some(Argument::Value(value))) if !value.is_object() => {
                return Ok(Some(value.clone()));
            }
            (Some(declared), Some(Argument::Value(Value::Object(instance))))
                if instance.type_name() == declared
                    || metadata.implements_or_subclasses(instance.type_name(), declared) =>
            {
                return Ok(Some(Value::Object(instance.clone())));
            }
            _ => {}
        }

        let Some(declared) = &parameter.declared_type else {
            return Ok(None);
        };

        if let Some(concrete) =
            self.container
                .injected(declared, Some(&signature.annotations), Some(&parameter.name))?
        {
            return self.container.resolve(&concrete, &Parameters::new()).map(|i| Some(Value::Object(i)));
        }

        if self.container.is_instantiable(declared) {
            return self.container.resolve(declared, &Parameters::new()).map(|i| Some(Value::Object(i)));
        }

        Ok(None)
    }
}
