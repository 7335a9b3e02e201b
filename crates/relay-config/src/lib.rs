#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod openrouter;
pub mod telemetry;

use serde::Deserialize;

pub use openrouter::*;
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level relay configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// OpenRouter connection settings
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    /// Model used when the caller does not name one
    #[serde(default = "default_model")]
    pub model: String,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openrouter: OpenRouterConfig::default(),
            model: default_model(),
            telemetry: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

/// Model used when neither the config file nor the command line names one
pub const DEFAULT_MODEL: &str = "x-ai/grok-code-fast-1";
