//! The workspace: one block graph and everything derived from it.

use crate::config::{Backend, RunConfig};
use crate::engine::{EngineSlot, NativeEngine};
use crate::error::{LoadWarning, ProjectResult};
use crate::library;
use crate::persist::{self, ProjectDocument};
use serde::Serialize;
use std::fmt;
use zia_codegen::{generate_with, GenerateResult, NameTable, SourceProgram};
use zia_eval::{Clock, InputProvider, Interpreter, OutputLog, StopSwitch, SystemClock};
use zia_types::BlockGraph;

/// Shown when there is nothing to run.
pub const EMPTY_PROGRAM: &str = "⚠️ Aucun programme à exécuter. Ajoutez des blocs!";

/// Result of [`Workspace::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "result", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The graph generated no code.
    Empty,
    /// The native engine's output, verbatim.
    Native(String),
    /// The direct interpreter's log.
    Interpreted(OutputLog),
    /// The native backend is selected but still loading; the program was
    /// generated and nothing ran.
    EngineLoading(SourceProgram),
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str(EMPTY_PROGRAM),
            Self::Native(text) => f.write_str(text),
            Self::Interpreted(log) => write!(f, "{log}"),
            Self::EngineLoading(program) => write!(f, "✅ Code généré avec succès!\n\n{program}"),
        }
    }
}

/// Owns the graph, the result of the last generation pass and run state.
///
/// Editing through [`Workspace::edit`] drops the cached generation, so a
/// stale name table or program is never served.
#[derive(Debug, Default)]
pub struct Workspace {
    graph: BlockGraph,
    config: RunConfig,
    generation: Option<GenerateResult>,
    stop: StopSwitch,
    engine: EngineSlot,
}

impl Workspace {
    pub fn new(config: RunConfig) -> Self {
        Self::with_graph(BlockGraph::new(), config)
    }

    pub fn with_graph(graph: BlockGraph, config: RunConfig) -> Self {
        Self {
            graph,
            config,
            generation: None,
            stop: StopSwitch::new(),
            engine: EngineSlot::Loading,
        }
    }

    /// Load a project document. Repairs are returned alongside.
    pub fn from_project(
        json: &str,
        config: RunConfig,
    ) -> ProjectResult<(Self, Vec<LoadWarning>)> {
        let loaded = persist::load_str(json)?;
        Ok((Self::with_graph(loaded.graph, config), loaded.warnings))
    }

    /// Start from a built-in example.
    pub fn from_example(
        name: &str,
        config: RunConfig,
    ) -> ProjectResult<(Self, Vec<LoadWarning>)> {
        let mut workspace = Self::new(config);
        let warnings = workspace.load_example(name)?;
        Ok((workspace, warnings))
    }

    /// Replace the graph with a built-in example. On error the workspace
    /// is left as it was.
    pub fn load_example(&mut self, name: &str) -> ProjectResult<Vec<LoadWarning>> {
        let example = library::example(name)?;
        let loaded = persist::load(&example.document()?)?;
        self.graph = loaded.graph;
        self.generation = None;
        tracing::info!(example = example.name, "example loaded");
        Ok(loaded.warnings)
    }

    pub fn to_project(&self) -> ProjectDocument {
        persist::save(&self.graph)
    }

    pub fn to_json(&self) -> ProjectResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_project())?)
    }

    pub fn graph(&self) -> &BlockGraph {
        &self.graph
    }

    /// Mutable access to the graph. Invalidates the last generation.
    pub fn edit(&mut self) -> &mut BlockGraph {
        self.generation = None;
        &mut self.graph
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RunConfig) {
        if config.generator != self.config.generator {
            self.generation = None;
        }
        self.config = config;
    }

    // ══════════════════════════════════════════════════════════════════════
    // Generation
    // ══════════════════════════════════════════════════════════════════════

    /// Run a generation pass and keep its result.
    pub fn generate(&mut self) -> &GenerateResult {
        let result = generate_with(&self.graph, &self.config.generator);
        self.generation.insert(result)
    }

    pub fn last_generation(&self) -> Option<&GenerateResult> {
        self.generation.as_ref()
    }

    /// Identifiers chosen by the last generation pass.
    pub fn names(&self) -> Option<&NameTable> {
        self.generation.as_ref().map(|g| &g.names)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Execution
    // ══════════════════════════════════════════════════════════════════════

    /// Deliver the native engine's ready signal.
    pub fn engine_ready(&mut self, engine: Box<dyn NativeEngine>) {
        self.engine.ready(engine);
    }

    pub fn engine(&self) -> &EngineSlot {
        &self.engine
    }

    /// A switch that stops the interpreter run in progress, and only that
    /// run.
    pub fn stop_switch(&self) -> StopSwitch {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Generate, then run on the configured backend, pausing on the wall
    /// clock.
    pub fn run(&mut self, input: impl InputProvider) -> RunOutcome {
        self.run_with(input, &mut SystemClock::new())
    }

    pub fn run_with(&mut self, input: impl InputProvider, clock: &mut impl Clock) -> RunOutcome {
        let program = self.generate().program.clone();
        if program.lines().iter().all(|line| line.trim().is_empty()) {
            return RunOutcome::Empty;
        }
        let source = program.text();
        tracing::debug!(backend = ?self.config.backend, lines = program.len(), "run");

        match self.config.backend {
            Backend::Native => match self.engine.interpret(&source, self.config.engine) {
                Some(output) => RunOutcome::Native(output),
                None => RunOutcome::EngineLoading(program),
            },
            Backend::Interpreter => {
                let interpreter =
                    Interpreter::with_stop_switch(self.config.interpreter, self.stop.clone());
                RunOutcome::Interpreted(interpreter.execute_with(&source, input, clock))
            }
        }
    }
}
