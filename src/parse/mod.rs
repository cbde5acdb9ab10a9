// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn raw git blame/log/shortlog text into structured records; one parser per message shape
// role: parsing/namespace
// outputs: Chunk sequences, shortlog entries, typed ParseError values
// invariants:
// - Parsers are pure (no IO); every rejected line yields a ParseError naming its 1-based line number
// - Boundary blame blocks and binary numstat entries never become chunks
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod blame;
pub mod log;
pub mod shortlog;

use thiserror::Error;

pub use blame::{parse_blame_incremental, BlameParse};
pub use log::{normalize_rename, parse_numstat_log, LogParse};
pub use shortlog::{parse_shortlog, ShortlogEntry};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
  #[error("line {line}: unexpected {context} output: {text:?}")]
  UnexpectedLine { context: &'static str, line: usize, text: String },
  #[error("line {line}: invalid number {text:?}")]
  BadNumber { line: usize, text: String },
  #[error("line {line}: commit {sha} has no author")]
  MissingAuthor { line: usize, sha: String },
  #[error("line {line}: file stat before any commit header: {text:?}")]
  OrphanStat { line: usize, text: String },
  #[error("blame block for commit {sha} is missing its filename line")]
  Unterminated { sha: String },
}

pub(crate) fn parse_number<T: std::str::FromStr>(text: &str, line: usize) -> Result<T, ParseError> {
  text.trim().parse::<T>().map_err(|_| ParseError::BadNumber { line, text: text.to_string() })
}
