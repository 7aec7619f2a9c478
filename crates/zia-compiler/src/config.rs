//! Workspace run configuration.

use crate::engine::EngineFlags;
use serde::{Deserialize, Serialize};
use zia_codegen::GeneratorOptions;
use zia_eval::InterpreterConfig;

/// Which executor runs generated programs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// The native engine. Unavailable until it signals ready.
    Native,
    /// The built-in direct interpreter.
    #[default]
    Interpreter,
}

/// Everything a [`crate::Workspace`] needs to generate and run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub backend: Backend,
    pub generator: GeneratorOptions,
    pub interpreter: InterpreterConfig,
    pub engine: EngineFlags,
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
