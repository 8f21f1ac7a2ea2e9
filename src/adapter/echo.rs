//! Baseline adapter: understands by repeating the intent, acts by echoing the
//! prompt. Only useful for smoke tests and as a reference score.

use super::{Adapter, AdapterConfigError, AdapterOptions, BackendError, Inference};

/// Registry name of the echo adapter.
pub const NAME: &str = "echo";

/// Prefix put in front of the echoed prompt.
pub const ACTION_PREFIX: &str = "(echo) ";

#[derive(Clone, Copy, Debug, Default)]
pub struct EchoAdapter;

impl Adapter for EchoAdapter {
    fn name(&self) -> &str {
        NAME
    }

    fn configure(&mut self, _options: &AdapterOptions) -> Result<(), AdapterConfigError> {
        Ok(())
    }

    fn infer(&self, prompt: &str, intent: &str) -> Result<Inference, BackendError> {
        Ok(Inference {
            understanding: intent.to_owned(),
            action: format!("{ACTION_PREFIX}{}", prompt.trim()),
        })
    }
}
