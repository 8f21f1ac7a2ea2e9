//! Name → adapter factory lookup.
//!
//! Replaces importing backends by name at runtime: every adapter the binary
//! can use is registered up front, either built in, declared as an external
//! program in `rcs.toml`, or registered by a library user.

use std::collections::BTreeMap;
use std::fmt;

use super::command::CommandAdapter;
use super::echo::{self, EchoAdapter};
use super::Adapter;
use crate::config::RcsConfig;
use crate::error::RcsError;

type Factory = Box<dyn Fn() -> Box<dyn Adapter>>;

/// Table of constructible adapters, keyed by name.
pub struct AdapterRegistry {
    factories: BTreeMap<String, Factory>,
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AdapterRegistry {
    /// A registry with no adapters at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the built-in adapters (`echo`).
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(echo::NAME, || Box::new(EchoAdapter));
        registry
    }

    /// Built-ins plus every `[adapters.<name>]` declared in `config`.
    ///
    /// A declared adapter with the same name as a built-in replaces it.
    #[must_use]
    pub fn with_config(config: &RcsConfig) -> Self {
        let mut registry = Self::builtin();
        for (name, declared) in &config.adapters {
            let name = name.clone();
            let declared = declared.clone();
            registry.register(name.clone(), move || {
                Box::new(CommandAdapter::new(name.clone(), declared.clone()))
            });
        }
        registry
    }

    /// Register (or replace) an adapter factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Adapter> + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            tracing::debug!(adapter = %name, "adapter registration replaced");
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Construct a fresh, unconfigured adapter.
    ///
    /// # Errors
    /// Returns [`RcsError::UnknownAdapter`] listing the available names.
    pub fn create(&self, name: &str) -> Result<Box<dyn Adapter>, RcsError> {
        self.factories.get(name).map(|factory| factory()).ok_or_else(|| {
            RcsError::UnknownAdapter {
                name: name.to_owned(),
                available: self.names().map(str::to_owned).collect(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{AdapterConfigError, AdapterOptions, BackendError, Inference};
    use crate::config::CommandAdapterConfig;

    struct Shouting;

    impl Adapter for Shouting {
        fn name(&self) -> &str {
            "shouting"
        }

        fn configure(&mut self, _: &AdapterOptions) -> Result<(), AdapterConfigError> {
            Ok(())
        }

        fn infer(&self, prompt: &str, intent: &str) -> Result<Inference, BackendError> {
            Ok(Inference {
                understanding: intent.to_uppercase(),
                action: prompt.to_uppercase(),
            })
        }
    }

    #[test]
    fn builtin_has_echo() {
        let registry = AdapterRegistry::builtin();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["echo"]);
        let adapter = registry.create("echo").unwrap();
        assert_eq!(adapter.name(), "echo");
    }

    #[test]
    fn unknown_name_lists_available() {
        let registry = AdapterRegistry::builtin();
        match registry.create("gpt-9") {
            Err(RcsError::UnknownAdapter { name, available }) => {
                assert_eq!(name, "gpt-9");
                assert_eq!(available, vec!["echo".to_owned()]);
            }
            Err(other) => panic!("expected UnknownAdapter, got {other:?}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn user_registered_adapter_is_constructible() {
        let mut registry = AdapterRegistry::builtin();
        registry.register("shouting", || Box::new(Shouting));
        assert!(registry.contains("shouting"));
        let adapter = registry.create("shouting").unwrap();
        let out = adapter.infer("do it", "sort").unwrap();
        assert_eq!(out.action, "DO IT");
    }

    #[test]
    fn config_declared_adapters_are_registered() {
        let mut config = RcsConfig::default();
        config.adapters.insert(
            "local".to_owned(),
            CommandAdapterConfig {
                command: vec!["true".to_owned()],
                requires_api_key: false,
                cwd: None,
            },
        );
        let registry = AdapterRegistry::with_config(&config);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["echo", "local"]);
        assert_eq!(registry.create("local").unwrap().name(), "local");
    }

    #[test]
    fn each_create_is_a_fresh_instance() {
        let mut config = RcsConfig::default();
        config.adapters.insert(
            "needs-key".to_owned(),
            CommandAdapterConfig {
                command: vec!["true".to_owned()],
                requires_api_key: true,
                cwd: None,
            },
        );
        let registry = AdapterRegistry::with_config(&config);
        let mut first = registry.create("needs-key").unwrap();
        first
            .configure(&AdapterOptions {
                api_key: Some("k".to_owned()),
                ..Default::default()
            })
            .unwrap();
        let second = registry.create("needs-key").unwrap();
        assert!(matches!(
            second.infer("p", "i"),
            Err(BackendError::NotConfigured { .. })
        ));
    }
}
