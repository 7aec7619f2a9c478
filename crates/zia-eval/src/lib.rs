//! Zia direct interpreter.
//!
//! Runs generated Zia source line by line without the native engine. Each
//! non-blank line is classified by an ordered set of recognizers
//! (declaration, output, input, pause, unsupported construct) and executed
//! against a flat variable environment. The only result of a run is its
//! [`OutputLog`].
//!
//! Unsupported constructs and unparsable lines are reported in the log and
//! never abort the run, except that strict mode halts on the first
//! unsupported construct.
//!
//! ```
//! use zia_eval::{Interpreter, InterpreterConfig, NoInput};
//!
//! let log = Interpreter::new(InterpreterConfig::default())
//!     .execute("var x = 2 + 3;\nafficher x;", NoInput);
//! assert_eq!(log.to_string(), "📦 Variable x = 5\n📺 5");
//! ```

pub mod env;
pub mod error;
pub mod expr;
pub mod log;
pub mod machine;
pub mod recognizer;
pub mod value;

pub use env::Environment;
pub use error::{EvalError, EvalResult};
pub use expr::evaluate;
pub use log::{LogEntry, LogKind, OutputLog};
pub use machine::{
    Clock, InputProvider, Interpreter, InterpreterConfig, NoInput, Run, ScriptedInput, Step,
    StopHandle, StopSwitch, SystemClock, VirtualClock,
};
pub use recognizer::{classify, Construct, Statement};
pub use value::Value;
