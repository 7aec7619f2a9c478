//! The interpreter loop as an explicit state machine.
//!
//! ```text
//!        start(source)
//!             │
//!             ▼
//!   ┌──── step(now) ◄──────────────┐
//!   │         │                    │
//!   │   stop? end of lines? ──► Finished(log)
//!   │         │
//!   │   classify + execute line ── Continue
//!   │         │
//!   │   attendre(s) ──────────► WaitUntil(now + s)
//!   │                                │
//!   └── now ≥ deadline: "terminée" ◄─┘
//! ```
//!
//! A host drives a [`Run`] by calling [`Run::step`] until it finishes,
//! sleeping (or yielding to its own scheduler) whenever it is told to wait.
//! [`Interpreter::execute`] does exactly that against a [`Clock`].

use crate::env::Environment;
use crate::expr::evaluate;
use crate::log::{LogKind, OutputLog};
use crate::recognizer::{classify, Statement};
use crate::value::{format_number, Value};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

// ══════════════════════════════════════════════════════════════════════════════
// Configuration and host seams
// ══════════════════════════════════════════════════════════════════════════════

/// Interpreter options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Halt on the first unsupported construct instead of skipping it.
    pub strict: bool,
}

/// Stop flag of a single run. Clones observe the same flag; once stopped
/// it stays stopped.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Stops whichever run its interpreter started most recently.
///
/// Every run gets its own [`StopHandle`]; the switch only follows the
/// latest one, so stopping never reaches an older or a later run.
#[derive(Debug, Clone, Default)]
pub struct StopSwitch(Arc<Mutex<StopHandle>>);

impl StopSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the current run. A no-op once that run has finished.
    pub fn stop(&self) {
        self.current().stop();
    }

    /// Flag of the current run.
    pub fn current(&self) -> StopHandle {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Install a fresh flag for a new run and return it.
    fn arm(&self) -> StopHandle {
        let fresh = StopHandle::new();
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = fresh.clone();
        fresh
    }
}

/// Host-supplied answers for `demander`. `None` reads as an empty answer.
pub trait InputProvider {
    fn answer(&mut self, prompt: &str) -> Option<String>;
}

impl<F> InputProvider for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn answer(&mut self, prompt: &str) -> Option<String> {
        self(prompt)
    }
}

/// Answers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputProvider for NoInput {
    fn answer(&mut self, _prompt: &str) -> Option<String> {
        None
    }
}

/// Replays a fixed list of answers in order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    answers: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }
}

impl InputProvider for ScriptedInput {
    fn answer(&mut self, _prompt: &str) -> Option<String> {
        self.answers.pop_front()
    }
}

/// Time source for [`Interpreter::execute_with`]. Times are offsets from
/// an arbitrary origin fixed by the clock.
pub trait Clock {
    fn now(&self) -> Duration;
    fn sleep_until(&mut self, deadline: Duration);
}

/// Wall-clock time; sleeps the current thread.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&mut self, deadline: Duration) {
        std::thread::sleep(deadline.saturating_sub(self.now()));
    }
}

/// A clock that jumps straight to each deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualClock {
    now: Duration,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep_until(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Run
// ══════════════════════════════════════════════════════════════════════════════

/// Outcome of one [`Run::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A statement ran; call again.
    Continue,
    /// Paused; call again once `now` reaches the deadline.
    WaitUntil(Duration),
    /// The run is over. Later calls return the same log.
    Finished(OutputLog),
}

/// One execution of a program, advanced a statement at a time.
pub struct Run<'a> {
    lines: Vec<String>,
    cursor: usize,
    env: Environment,
    log: OutputLog,
    config: InterpreterConfig,
    stop: StopHandle,
    input: Box<dyn InputProvider + 'a>,
    waiting: Option<Duration>,
    finished: bool,
}

impl<'a> Run<'a> {
    fn new(
        source: &str,
        config: InterpreterConfig,
        stop: StopHandle,
        input: Box<dyn InputProvider + 'a>,
    ) -> Self {
        Self {
            lines: prepare(source),
            cursor: 0,
            env: Environment::new(),
            log: OutputLog::new(),
            config,
            stop,
            input,
            waiting: None,
            finished: false,
        }
    }

    /// Advance by at most one statement. A pending pause completes on the
    /// first call with `now` at or past its deadline; the stop flag is only
    /// consulted between statements.
    pub fn step(&mut self, now: Duration) -> Step {
        if self.finished {
            return Step::Finished(self.log.clone());
        }

        if let Some(deadline) = self.waiting {
            if now < deadline {
                return Step::WaitUntil(deadline);
            }
            self.waiting = None;
            self.log.push(LogKind::Resume, "Attente terminée");
            self.cursor += 1;
            return Step::Continue;
        }

        if self.stop.is_stopped() || self.cursor >= self.lines.len() {
            return self.finish();
        }

        let index = self.cursor;
        let line = self.lines[index].clone();
        match classify(&line) {
            Ok(statement) => {
                tracing::trace!(line = index, recognizer = statement.label(), "statement");
                self.execute(statement, now)
            }
            Err(err) => {
                tracing::trace!(line = index, error = %err, "runtime fault");
                self.log.push(LogKind::Error, format!("Erreur: {err}"));
                self.cursor += 1;
                Step::Continue
            }
        }
    }

    pub fn log(&self) -> &OutputLog {
        &self.log
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Flag that stops this run and no other.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn into_log(self) -> OutputLog {
        self.log
    }

    fn execute(&mut self, statement: Statement, now: Duration) -> Step {
        match statement {
            Statement::Declare { name, expr } => {
                let value = evaluate(&expr, &self.env);
                self.log
                    .push(LogKind::Declaration, format!("Variable {name} = {value}"));
                self.env.define(&name, value);
            }
            Statement::Output { exprs } => {
                let shown: Vec<String> = exprs
                    .iter()
                    .map(|e| evaluate(e, &self.env).to_string())
                    .collect();
                self.log.push(LogKind::Output, shown.join(" "));
            }
            Statement::Input { name, prompt } => {
                let prompt = evaluate(&prompt, &self.env).to_string();
                let answer = self.input.answer(&prompt).unwrap_or_default();
                self.log.push(LogKind::Prompt, prompt);
                self.log.push(LogKind::Answer, format!("Réponse: {answer}"));
                self.log.push(
                    LogKind::Declaration,
                    format!("Variable {name} = \"{answer}\""),
                );
                self.env.define(&name, Value::Text(answer));
            }
            Statement::Pause { expr } => {
                let seconds = evaluate(&expr, &self.env).to_number();
                self.log.push(
                    LogKind::Pause,
                    format!("Attente de {} seconde(s)...", format_number(seconds)),
                );
                let deadline = now.saturating_add(pause_length(seconds));
                self.waiting = Some(deadline);
                return Step::WaitUntil(deadline);
            }
            Statement::Unsupported(construct) => {
                self.log.push(LogKind::Unsupported, construct.message());
                if self.config.strict {
                    return self.finish();
                }
            }
            Statement::Structural => {}
        }
        self.cursor += 1;
        Step::Continue
    }

    fn finish(&mut self) -> Step {
        self.finished = true;
        Step::Finished(self.log.clone())
    }
}

/// Non-blank lines, trimmed, one trailing `;` removed.
fn prepare(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_suffix(';').unwrap_or(line).trim_end().to_string())
        .collect()
}

/// NaN and negative delays are immediate.
fn pause_length(seconds: f64) -> Duration {
    if seconds > 0.0 {
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Interpreter
// ══════════════════════════════════════════════════════════════════════════════

/// Entry point for running Zia source directly.
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
    switch: StopSwitch,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        Self {
            config,
            switch: StopSwitch::new(),
        }
    }

    /// An interpreter that reports each new run to an existing switch.
    pub fn with_stop_switch(config: InterpreterConfig, switch: StopSwitch) -> Self {
        Self { config, switch }
    }

    pub fn config(&self) -> InterpreterConfig {
        self.config
    }

    /// Begin a fresh run with its own stop flag. Earlier runs keep theirs,
    /// stopped or not.
    pub fn start<'a>(&self, source: &str, input: impl InputProvider + 'a) -> Run<'a> {
        let stop = self.switch.arm();
        Run::new(source, self.config, stop, Box::new(input))
    }

    /// Ask the most recently started run to end after its current statement.
    pub fn stop(&self) {
        self.switch.stop();
    }

    /// A switch another task can use to stop the current run.
    pub fn stop_switch(&self) -> StopSwitch {
        self.switch.clone()
    }

    /// Run to completion on the wall clock.
    pub fn execute(&self, source: &str, input: impl InputProvider) -> OutputLog {
        self.execute_with(source, input, &mut SystemClock::new())
    }

    /// Run to completion, waiting on `clock` at each pause.
    pub fn execute_with(
        &self,
        source: &str,
        input: impl InputProvider,
        clock: &mut impl Clock,
    ) -> OutputLog {
        let mut run = self.start(source, input);
        loop {
            match run.step(clock.now()) {
                Step::Continue => {}
                Step::WaitUntil(deadline) => clock.sleep_until(deadline),
                Step::Finished(log) => return log,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_strips_blank_lines_and_semicolons() {
        assert_eq!(
            prepare("  var x = 1;  \n\n   \nafficher x ;\n"),
            vec!["var x = 1", "afficher x"]
        );
    }

    #[test]
    fn test_pause_length() {
        assert_eq!(pause_length(1.5), Duration::from_millis(1500));
        assert_eq!(pause_length(-2.0), Duration::ZERO);
        assert_eq!(pause_length(f64::NAN), Duration::ZERO);
    }

    #[test]
    fn test_step_reports_wait_then_resumes() {
        let interpreter = Interpreter::default();
        let mut run = interpreter.start("attendre(2)", NoInput);
        let deadline = Duration::from_secs(2);
        assert_eq!(run.step(Duration::ZERO), Step::WaitUntil(deadline));
        assert_eq!(run.step(Duration::from_secs(1)), Step::WaitUntil(deadline));
        assert_eq!(run.step(deadline), Step::Continue);
        assert!(matches!(run.step(deadline), Step::Finished(_)));
        assert!(run.is_finished());
        assert_eq!(
            run.log().lines(),
            vec!["⏰ Attente de 2 seconde(s)...", "✅ Attente terminée"]
        );
    }

    #[test]
    fn test_closure_input_provider() {
        let interpreter = Interpreter::default();
        let log = interpreter.execute_with(
            "var n = demander(\"Nom ?\")",
            |prompt: &str| Some(format!("<{prompt}>")),
            &mut VirtualClock::new(),
        );
        assert_eq!(log.entries()[1].message, "Réponse: <Nom ?>");
    }

    #[test]
    fn test_each_run_gets_its_own_flag() {
        let interpreter = Interpreter::default();
        let first = interpreter.start("", NoInput);
        interpreter.stop();
        let second = interpreter.start("", NoInput);
        assert!(first.stop_handle().is_stopped());
        assert!(!second.stop_handle().is_stopped());
        assert!(!interpreter.stop_switch().current().is_stopped());
    }
}
