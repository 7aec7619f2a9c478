//! The run log: the interpreter's only observable result.

use serde::Serialize;
use std::fmt;

/// What a log entry records. Each kind carries a fixed icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Declaration,
    Output,
    Prompt,
    Answer,
    Pause,
    Resume,
    Unsupported,
    Error,
}

impl LogKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Declaration => "📦",
            Self::Output => "📺",
            Self::Prompt => "❓",
            Self::Answer => "✏️",
            Self::Pause => "⏰",
            Self::Resume => "✅",
            Self::Unsupported => "⚠️",
            Self::Error => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.icon(), self.message)
    }
}

/// Ordered entries of one run. Displays one entry per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OutputLog(Vec<LogEntry>);

impl OutputLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, kind: LogKind, message: impl Into<String>) {
        self.0.push(LogEntry::new(kind, message));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Each entry rendered as `icon message`.
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().map(LogEntry::to_string).collect()
    }
}

impl fmt::Display for OutputLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_lines() {
        let mut log = OutputLog::new();
        log.push(LogKind::Declaration, "Variable x = 5");
        log.push(LogKind::Output, "5");
        assert_eq!(log.to_string(), "📦 Variable x = 5\n📺 5");
        assert_eq!(log.lines(), vec!["📦 Variable x = 5", "📺 5"]);
    }

    #[test]
    fn test_serializes_as_entry_list() {
        let mut log = OutputLog::new();
        log.push(LogKind::Resume, "Attente terminée");
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "kind": "resume", "message": "Attente terminée" }])
        );
    }
}
