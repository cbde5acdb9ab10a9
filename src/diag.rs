//! Per-file and per-repository problems that do not abort a run.

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  BinaryFile { repo: String, path: String },
  FileSkipped { repo: String, path: String, reason: String },
  RepoSkipped { repo: String, reason: String },
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Diagnostic::BinaryFile { repo, path } => write!(f, "{}: binary file skipped: {}", repo, path),
      Diagnostic::FileSkipped { repo, path, reason } => write!(f, "{}: {}: {}", repo, path, reason),
      Diagnostic::RepoSkipped { repo, reason } => write!(f, "{}: repository skipped: {}", repo, reason),
    }
  }
}

pub trait DiagnosticSink: Send + Sync {
  fn report(&self, diagnostic: Diagnostic);
}

/// Routes diagnostics to tracing. File-level messages are only warnings when asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
  pub warn: bool,
}

impl DiagnosticSink for TracingSink {
  fn report(&self, diagnostic: Diagnostic) {
    match &diagnostic {
      Diagnostic::RepoSkipped { .. } => error!("{}", diagnostic),
      _ if self.warn => warn!("{}", diagnostic),
      _ => debug!("{}", diagnostic),
    }
  }
}

/// Collects diagnostics in memory (tests and library callers).
#[derive(Debug, Default)]
pub struct MemorySink {
  items: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
  pub fn take(&self) -> Vec<Diagnostic> {
    match self.items.lock() {
      Ok(mut items) => std::mem::take(&mut *items),
      Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    }
  }
}

impl DiagnosticSink for MemorySink {
  fn report(&self, diagnostic: Diagnostic) {
    match self.items.lock() {
      Ok(mut items) => items.push(diagnostic),
      Err(poisoned) => poisoned.into_inner().push(diagnostic),
    }
  }
}
