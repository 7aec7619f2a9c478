//! The native engine seam.
//!
//! The native engine is an external compiler/runtime for Zia source. It
//! becomes usable only after an out-of-band "ready" signal; until then the
//! slot reports [`EngineSlot::Loading`]. Whatever the engine returns is
//! shown to the user as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The engine's three toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineFlags {
    /// Dump bytecode alongside the result.
    pub bytecode: bool,
    /// Run the type evaluator before execution.
    pub type_eval: bool,
    /// Enable the garbage collector.
    pub gc: bool,
}

/// A native implementation of the Zia language.
pub trait NativeEngine {
    /// Run `source` and return the engine's textual result verbatim.
    fn interpret(&mut self, source: &str, flags: EngineFlags) -> String;
}

impl<F> NativeEngine for F
where
    F: FnMut(&str, EngineFlags) -> String,
{
    fn interpret(&mut self, source: &str, flags: EngineFlags) -> String {
        self(source, flags)
    }
}

/// Readiness of the native engine.
#[derive(Default)]
pub enum EngineSlot {
    #[default]
    Loading,
    Ready(Box<dyn NativeEngine>),
}

impl EngineSlot {
    /// Record the ready signal. A second signal replaces the engine.
    pub fn ready(&mut self, engine: Box<dyn NativeEngine>) {
        tracing::info!("native engine ready");
        *self = Self::Ready(engine);
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The engine's result, or `None` while still loading.
    pub fn interpret(&mut self, source: &str, flags: EngineFlags) -> Option<String> {
        match self {
            Self::Loading => None,
            Self::Ready(engine) => Some(engine.interpret(source, flags)),
        }
    }
}

impl fmt::Debug for EngineSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("Loading"),
            Self::Ready(_) => f.write_str("Ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_until_ready() {
        let mut slot = EngineSlot::default();
        assert!(!slot.is_ready());
        assert_eq!(slot.interpret("afficher(1)", EngineFlags::default()), None);

        slot.ready(Box::new(|source: &str, flags: EngineFlags| {
            format!("{}|{}", source.len(), flags.gc)
        }));
        assert!(slot.is_ready());
        let flags = EngineFlags {
            gc: true,
            ..EngineFlags::default()
        };
        assert_eq!(slot.interpret("abc", flags), Some("3|true".to_string()));
    }

    #[test]
    fn test_flags_read_partial_json() {
        let flags: EngineFlags = serde_json::from_str(r#"{"bytecode": true}"#).unwrap();
        assert!(flags.bytecode);
        assert!(!flags.type_eval);
    }
}
