//! Adapter options and their precedence.
//!
//! Options are resolved once by the driver, before an adapter is configured.
//! Precedence, highest first:
//!
//! 1. explicit command-line arguments,
//! 2. the process environment (`RCS_API_KEY`, `RCS_MODEL`),
//! 3. the `[adapter]` section of `rcs.toml`.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::AdapterSection;

/// Environment variable holding the backend credential.
pub const API_KEY_ENV: &str = "RCS_API_KEY";

/// Environment variable holding the backend model name.
pub const MODEL_ENV: &str = "RCS_MODEL";

/// Options handed to [`Adapter::configure`](super::Adapter::configure).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Backend credential, if any.
    pub api_key: Option<String>,
    /// Backend model name, if any.
    pub model: Option<String>,
    /// Free-form `key=value` parameters.
    pub params: BTreeMap<String, String>,
}

// The api key must never end up in logs.
impl fmt::Debug for AdapterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("params", &self.params)
            .finish()
    }
}

impl AdapterOptions {
    /// Fill unset fields from the environment, read through `lookup`.
    ///
    /// Empty values, explicit or from the environment, count as unset.
    #[must_use]
    pub fn with_env_defaults(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
        self.api_key = self.api_key.filter(|k| !k.is_empty());
        self.model = self.model.filter(|m| !m.is_empty());
        if self.api_key.is_none() {
            self.api_key = read(API_KEY_ENV);
        }
        if self.model.is_none() {
            self.model = read(MODEL_ENV);
        }
        self
    }

    /// Fill unset fields from the config file section. Parameters set
    /// explicitly win over parameters from the file.
    #[must_use]
    pub fn with_config_defaults(mut self, section: &AdapterSection) -> Self {
        if self.model.is_none() {
            self.model.clone_from(&section.model);
        }
        for (key, value) in &section.params {
            self.params
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    /// Apply the full precedence chain: `self` (explicit), then the
    /// environment, then the config file.
    #[must_use]
    pub fn resolve(
        self,
        lookup: impl Fn(&str) -> Option<String>,
        section: &AdapterSection,
    ) -> Self {
        self.with_env_defaults(lookup).with_config_defaults(section)
    }
}

/// Parse a `key=value` command-line parameter.
///
/// # Errors
/// Returns a message when `=` is missing or the key is empty.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn section(model: Option<&str>) -> AdapterSection {
        AdapterSection {
            model: model.map(str::to_owned),
            params: BTreeMap::from([("temperature".to_owned(), "0".to_owned())]),
        }
    }

    #[test]
    fn explicit_values_beat_environment() {
        let explicit = AdapterOptions {
            api_key: Some("cli-key".to_owned()),
            model: Some("cli-model".to_owned()),
            ..Default::default()
        };
        let opts = explicit.with_env_defaults(env(&[
            (API_KEY_ENV, "env-key"),
            (MODEL_ENV, "env-model"),
        ]));
        assert_eq!(opts.api_key.as_deref(), Some("cli-key"));
        assert_eq!(opts.model.as_deref(), Some("cli-model"));
    }

    #[test]
    fn environment_fills_unset_values() {
        let opts = AdapterOptions::default()
            .with_env_defaults(env(&[(API_KEY_ENV, "env-key"), (MODEL_ENV, "env-model")]));
        assert_eq!(opts.api_key.as_deref(), Some("env-key"));
        assert_eq!(opts.model.as_deref(), Some("env-model"));
    }

    #[test]
    fn empty_environment_values_are_ignored() {
        let opts = AdapterOptions::default().with_env_defaults(env(&[(API_KEY_ENV, "")]));
        assert_eq!(opts.api_key, None);
    }

    #[test]
    fn empty_explicit_api_key_falls_back_to_environment() {
        let explicit = AdapterOptions {
            api_key: Some(String::new()),
            ..Default::default()
        };
        let opts = explicit.clone().with_env_defaults(env(&[(API_KEY_ENV, "env-key")]));
        assert_eq!(opts.api_key.as_deref(), Some("env-key"));

        let opts = explicit.with_env_defaults(env(&[]));
        assert_eq!(opts.api_key, None);
    }

    #[test]
    fn environment_beats_config_file() {
        let opts = AdapterOptions::default()
            .resolve(env(&[(MODEL_ENV, "env-model")]), &section(Some("file-model")));
        assert_eq!(opts.model.as_deref(), Some("env-model"));
    }

    #[test]
    fn config_file_is_last_resort() {
        let opts = AdapterOptions::default().resolve(env(&[]), &section(Some("file-model")));
        assert_eq!(opts.model.as_deref(), Some("file-model"));
        assert_eq!(opts.api_key, None);
        assert_eq!(opts.params.get("temperature").map(String::as_str), Some("0"));
    }

    #[test]
    fn explicit_params_beat_file_params() {
        let explicit = AdapterOptions {
            params: BTreeMap::from([("temperature".to_owned(), "0.7".to_owned())]),
            ..Default::default()
        };
        let opts = explicit.resolve(env(&[]), &section(None));
        assert_eq!(opts.params.get("temperature").map(String::as_str), Some("0.7"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let opts = AdapterOptions {
            api_key: Some("sk-very-secret".to_owned()),
            ..Default::default()
        };
        let shown = format!("{opts:?}");
        assert!(!shown.contains("sk-very-secret"));
        assert!(shown.contains("<redacted>"));
    }

    #[test]
    fn parse_param_splits_on_first_equals() {
        assert_eq!(
            parse_param("stop=a=b").unwrap(),
            ("stop".to_owned(), "a=b".to_owned())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }
}
