//! Container configuration.
//!
//! [`ContainerOptions`] tunes engine behavior and can be read from the
//! environment. With the `config` feature, [`ContainerConfig`] additionally
//! loads options and bindings from JSON or YAML documents.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::internal::circular::MAX_DEPTH;

/// What [`Container::flush_bindings`](crate::Container::flush_bindings) clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum FlushMode {
    /// Bindings only; singleton slots, cached singletons and preset
    /// parameters survive
    #[default]
    BindingsOnly,
    /// Everything: bindings, preset parameters and the singleton cache
    FullReset,
}

impl FlushMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bindings" | "bindings_only" => Some(FlushMode::BindingsOnly),
            "full" | "full_reset" => Some(FlushMode::FullReset),
            _ => None,
        }
    }
}

/// Engine options
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    pub flush_mode: FlushMode,
    /// Maximum number of nested constructions before resolution fails
    pub max_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            flush_mode: FlushMode::BindingsOnly,
            max_depth: MAX_DEPTH,
        }
    }
}

impl ContainerOptions {
    pub const FLUSH_MODE_VAR: &'static str = "AUTOWIRE_FLUSH_MODE";
    pub const MAX_DEPTH_VAR: &'static str = "AUTOWIRE_MAX_DEPTH";

    /// Reads `AUTOWIRE_FLUSH_MODE` (`bindings` | `full`) and
    /// `AUTOWIRE_MAX_DEPTH`; missing or malformed values keep the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(raw) = lookup(Self::FLUSH_MODE_VAR) {
            match FlushMode::parse(&raw) {
                Some(mode) => options.flush_mode = mode,
                None => tracing::warn!(value = %raw, "ignoring unknown {}", Self::FLUSH_MODE_VAR),
            }
        }
        if let Some(raw) = lookup(Self::MAX_DEPTH_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => options.max_depth = depth,
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", Self::MAX_DEPTH_VAR),
            }
        }
        options
    }

    pub fn flush_mode(mut self, mode: FlushMode) -> Self {
        self.flush_mode = mode;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Replaces a zero depth limit, which would reject every construction,
    /// with the default
    pub(crate) fn sanitized(mut self) -> Self {
        if self.max_depth == 0 {
            tracing::warn!(default = MAX_DEPTH, "max_depth must be positive; using the default");
            self.max_depth = MAX_DEPTH;
        }
        self
    }
}

#[cfg(feature = "config")]
pub use document::{binding_specs_from_json, ConfigError, ContainerConfig};

#[cfg(feature = "config")]
mod document {
    use serde::{Deserialize, Serialize};
    use serde_json::{Map, Value as Json};
    use thiserror::Error;

    use super::ContainerOptions;
    use crate::binding::{BindingSpec, VariantSpec};
    use crate::container::Container;
    use crate::lifetime::Lifetime;
    use crate::value::{Argument, Parameters, Value};

    /// Failure to read a configuration document
    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("invalid JSON configuration: {0}")]
        Json(#[from] serde_json::Error),
        #[error("invalid YAML configuration: {0}")]
        Yaml(#[from] serde_yaml::Error),
        #[error("invalid configuration: max_depth must be positive")]
        ZeroMaxDepth,
    }

    /// Options and bindings loaded from a document.
    ///
    /// ```
    /// use autowire_di::{Container, ContainerConfig, FlushMode, TypeTable};
    ///
    /// let config = ContainerConfig::from_yaml_str(r#"
    /// options:
    ///   flush_mode: full_reset
    /// bindings:
    ///   INext: Next
    ///   IStart:
    ///     star: Start
    ///     second: { name: Starter, single: true }
    /// "#).unwrap();
    /// assert_eq!(config.options.flush_mode, FlushMode::FullReset);
    ///
    /// let container = Container::from_config(TypeTable::new(), &config);
    /// assert!(container.is_singleton("Starter"));
    /// ```
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ContainerConfig {
        pub options: ContainerOptions,
        pub bindings: Map<String, Json>,
    }

    impl ContainerConfig {
        pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
            serde_json::from_str::<Self>(text)?.validated()
        }

        pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
            serde_yaml::from_str::<Self>(text)?.validated()
        }

        fn validated(self) -> Result<Self, ConfigError> {
            if self.options.max_depth == 0 {
                return Err(ConfigError::ZeroMaxDepth);
            }
            Ok(self)
        }

        /// Binding entries with a usable shape, in document order
        pub fn binding_specs(&self) -> Vec<(String, BindingSpec)> {
            specs_from_map(&self.bindings)
        }

        /// Binds every usable entry; returns how many were applied
        pub fn apply(&self, container: &Container) -> usize {
            container.bind_many(self.binding_specs())
        }
    }

    /// Converts a loosely shaped `{ abstract: spec }` object into binding
    /// specs, skipping entries that are neither a type name nor a tag map.
    pub fn binding_specs_from_json(value: &Json) -> Vec<(String, BindingSpec)> {
        match value {
            Json::Object(map) => specs_from_map(map),
            _ => Vec::new(),
        }
    }

    fn specs_from_map(map: &Map<String, Json>) -> Vec<(String, BindingSpec)> {
        map.iter()
            .filter_map(|(abstract_type, spec)| {
                let spec = match spec {
                    Json::String(concrete) => BindingSpec::from(concrete.as_str()),
                    Json::Object(tags) => BindingSpec::Tagged(
                        tags.iter()
                            .filter_map(|(tag, variant)| variant_from_json(variant).map(|v| (tag.clone(), v)))
                            .collect(),
                    ),
                    _ => return None,
                };
                Some((abstract_type.clone(), spec))
            })
            .collect()
    }

    fn variant_from_json(value: &Json) -> Option<VariantSpec> {
        match value {
            Json::String(concrete) => Some(VariantSpec::new(concrete.as_str())),
            Json::Object(fields) => {
                let concrete = ["name", "type", "class"]
                    .iter()
                    .find_map(|k| fields.get(*k).and_then(Json::as_str))?;
                let singleton = ["single", "singleton"]
                    .iter()
                    .any(|k| fields.get(*k).and_then(Json::as_bool).unwrap_or(false));
                let parameters = match fields.get("parameters") {
                    Some(Json::Object(params)) => params
                        .iter()
                        .map(|(name, v)| (name.clone(), argument_from_json(v)))
                        .collect(),
                    _ => Parameters::new(),
                };
                Some(VariantSpec {
                    concrete: concrete.to_string(),
                    lifetime: if singleton { Lifetime::Singleton } else { Lifetime::Transient },
                    parameters,
                })
            }
            _ => None,
        }
    }

    fn argument_from_json(value: &Json) -> Argument {
        if let Json::Object(fields) = value {
            if fields.len() == 1 {
                if let Some(Json::String(type_name)) = fields.get("$type") {
                    return Argument::type_ref(type_name.as_str());
                }
            }
        }
        Argument::Value(Value::from(value.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_lookup_overrides_defaults() {
        let options = ContainerOptions::from_lookup(|key| match key {
            ContainerOptions::FLUSH_MODE_VAR => Some("full".to_string()),
            ContainerOptions::MAX_DEPTH_VAR => Some("16".to_string()),
            _ => None,
        });
        assert_eq!(options.flush_mode, FlushMode::FullReset);
        assert_eq!(options.max_depth, 16);
    }

    #[test]
    fn malformed_env_values_keep_defaults() {
        let options = ContainerOptions::from_lookup(|key| match key {
            ContainerOptions::FLUSH_MODE_VAR => Some("sometimes".to_string()),
            ContainerOptions::MAX_DEPTH_VAR => Some("-3".to_string()),
            _ => None,
        });
        assert_eq!(options, ContainerOptions::default());
    }

    #[test]
    fn zero_depth_is_sanitized() {
        let options = ContainerOptions::default().max_depth(0).sanitized();
        assert_eq!(options.max_depth, MAX_DEPTH);
        assert_eq!(ContainerOptions::default().max_depth(7).sanitized().max_depth, 7);
    }
}
