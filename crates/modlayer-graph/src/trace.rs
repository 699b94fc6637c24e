//! Optional human-readable trace of resolution decisions.
//!
//! A resolver with a sink emits one line per root located, per `requires`
//! edge walked, and per service-binding edge discovered. Sinks only observe;
//! they never influence the outcome.

use std::sync::Arc;

use parking_lot::Mutex;

/// Receives trace lines from a resolver.
pub trait TraceSink: Send {
    fn trace(&mut self, line: &str);
}

/// Forwards trace lines to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn trace(&mut self, line: &str) {
        tracing::info!(target: "modlayer::trace", "{}", line);
    }
}

/// Shared in-memory buffer of trace lines.
///
/// Clones share the same buffer, so a caller can keep one handle and give
/// another to the resolver.
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    lines: Arc<Mutex<Vec<String>>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines recorded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl TraceSink for TraceLog {
    fn trace(&mut self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
