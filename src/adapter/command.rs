//! Adapter backed by an external program.
//!
//! The program is declared in `rcs.toml`:
//!
//! ```toml
//! [adapters.local-llm]
//! command = ["python3", "scripts/local_llm.py"]
//! requires_api_key = true
//! ```
//!
//! For every task it is spawned once, receives one JSON object on stdin,
//!
//! ```json
//! {"prompt": "...", "intent": "..."}
//! ```
//!
//! and must print one JSON object on stdout:
//!
//! ```json
//! {"understanding": "...", "action": "..."}
//! ```
//!
//! Resolved options reach the program through its environment:
//! `RCS_API_KEY`, `RCS_MODEL`, and `RCS_PARAM_<KEY>` for each parameter
//! (key uppercased). Unset options are removed from the inherited
//! environment.

use std::io::Write as _;
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::instrument;

use super::options::{API_KEY_ENV, MODEL_ENV};
use super::{Adapter, AdapterConfigError, AdapterOptions, BackendError, Inference};
use crate::config::CommandAdapterConfig;

/// Prefix of the per-parameter environment variables.
pub const PARAM_ENV_PREFIX: &str = "RCS_PARAM_";

#[derive(Serialize)]
struct Request<'a> {
    prompt: &'a str,
    intent: &'a str,
}

/// Runs a configured program once per task.
#[derive(Clone, Debug)]
pub struct CommandAdapter {
    name: String,
    config: CommandAdapterConfig,
    env: Option<Vec<(String, Option<String>)>>,
}

impl CommandAdapter {
    #[must_use]
    pub fn new(name: impl Into<String>, config: CommandAdapterConfig) -> Self {
        Self {
            name: name.into(),
            config,
            env: None,
        }
    }

    fn program(&self) -> &str {
        self.config.command.first().map_or("", String::as_str)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(self.config.command.iter().skip(1))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.config.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in self.env.iter().flatten() {
            match value {
                Some(v) => cmd.env(key, v),
                None => cmd.env_remove(key),
            };
        }
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> BackendError {
        BackendError::Spawn {
            program: self.program().to_owned(),
            source,
        }
    }
}

fn param_env_name(key: &str) -> Option<String> {
    let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then(|| format!("{PARAM_ENV_PREFIX}{}", key.to_ascii_uppercase()))
}

impl Adapter for CommandAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, options: &AdapterOptions) -> Result<(), AdapterConfigError> {
        if self.config.command.is_empty() || self.program().is_empty() {
            return Err(AdapterConfigError::EmptyCommand {
                adapter: self.name.clone(),
            });
        }
        if self.config.requires_api_key && options.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(AdapterConfigError::MissingCredential {
                adapter: self.name.clone(),
            });
        }

        let mut env = vec![
            (
                API_KEY_ENV.to_owned(),
                options.api_key.clone().filter(|k| !k.is_empty()),
            ),
            (MODEL_ENV.to_owned(), options.model.clone()),
        ];
        for (key, value) in &options.params {
            let Some(name) = param_env_name(key) else {
                return Err(AdapterConfigError::InvalidOption {
                    adapter: self.name.clone(),
                    option: key.clone(),
                    reason: "parameter names may only contain letters, digits and '_'".to_owned(),
                });
            };
            env.push((name, Some(value.clone())));
        }

        tracing::debug!(
            adapter = %self.name,
            program = self.program(),
            params = options.params.len(),
            "command adapter configured"
        );
        self.env = Some(env);
        Ok(())
    }

    #[instrument(skip_all, fields(adapter = %self.name))]
    fn infer(&self, prompt: &str, intent: &str) -> Result<Inference, BackendError> {
        if self.env.is_none() {
            return Err(BackendError::NotConfigured {
                adapter: self.name.clone(),
            });
        }
        let program = self.program().to_owned();

        let request = serde_json::to_vec(&Request { prompt, intent }).map_err(|e| {
            BackendError::Protocol {
                program: program.clone(),
                detail: format!("could not encode request: {e}"),
            }
        })?;

        let mut child = self.command().spawn().map_err(|e| self.spawn_error(e))?;
        let stdin = child.stdin.take();

        // stdin is fed from its own thread while stdout and stderr are
        // drained, so a program that streams output as it reads cannot fill
        // a pipe and stall both sides. The child is always reaped before
        // any error is returned.
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(&request),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer.join().unwrap_or_else(|_| {
                Err(std::io::Error::other("stdin writer thread panicked"))
            });
            (written, output)
        });
        let output = output.map_err(|e| self.spawn_error(e))?;
        // A program that ignores its input may exit before we finish
        // writing; its exit status decides the outcome, not the pipe.
        if let Err(e) = written
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(self.spawn_error(e));
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or_else(|| "a signal".to_owned(), |c| format!("code {c}"));
            return Err(BackendError::Exited {
                program,
                status,
                stderr,
            });
        }
        if !stderr.is_empty() {
            tracing::debug!(stderr = %stderr, "adapter wrote to stderr");
        }

        let inference: Inference = serde_json::from_slice(&output.stdout).map_err(|e| {
            BackendError::Protocol {
                program: program.clone(),
                detail: e.to_string(),
            }
        })?;
        Ok(Inference {
            understanding: inference.understanding.trim().to_owned(),
            action: inference.action.trim().to_owned(),
        })
    }
}
