use once_cell::sync::Lazy;
use regex::Regex;

use super::{parse_number, ParseError};
use crate::model::{Churn, Chunk};

static BRACE_RENAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]*) => ([^{}]*)\}").unwrap());

/// `\0<name>\0<email>\0<committer-time>` as produced by `gitio::log_numstat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHeader {
  pub name: String,
  pub email: Option<String>,
  pub ctime: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
  pub insertions: u64,
  pub deletions: u64,
  pub path: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogParse {
  pub chunks: Vec<Chunk>,
  /// Paths whose numstat entry was `-\t-` (binary); reported, never counted.
  pub binary_files: Vec<String>,
}

pub fn parse_commit_header(raw: &str, line: usize) -> Result<CommitHeader, ParseError> {
  let parts: Vec<&str> = raw.split('\u{0}').collect();
  if parts.len() != 4 || !parts[0].is_empty() {
    return Err(ParseError::UnexpectedLine { context: "log header", line, text: raw.to_string() });
  }
  Ok(CommitHeader {
    name: parts[1].to_string(),
    email: Some(parts[2].to_string()).filter(|e| !e.is_empty()),
    ctime: parse_number::<i64>(parts[3], line)?,
  })
}

/// Path of a binary numstat entry (`-\t-\t<path>`), if `raw` is one.
pub fn binary_stat_path(raw: &str) -> Option<&str> {
  raw.strip_prefix("-\t-\t")
}

pub fn parse_stat_line(raw: &str, line: usize) -> Result<FileStat, ParseError> {
  let mut parts = raw.splitn(3, '\t');
  match (parts.next(), parts.next(), parts.next()) {
    (Some(ins), Some(del), Some(path)) if !path.is_empty() => Ok(FileStat {
      insertions: parse_number(ins, line)?,
      deletions: parse_number(del, line)?,
      path: normalize_rename(path),
    }),
    _ => Err(ParseError::UnexpectedLine { context: "numstat", line, text: raw.to_string() }),
  }
}

/// Reduce git's rename notation to the destination path.
///
/// `src/{old => new}/a.rs` → `src/new/a.rs`, `a/{ => b}/c` → `a/b/c`, `old.rs => new.rs` → `new.rs`.
pub fn normalize_rename(path: &str) -> String {
  if BRACE_RENAME.is_match(path) {
    let replaced = BRACE_RENAME.replace_all(path, "$2");
    let mut out = replaced.replace("//", "/");
    if out.starts_with('/') && !path.starts_with('/') {
      out.remove(0);
    }
    return out;
  }
  match path.split_once(" => ") {
    Some((_, dest)) => dest.to_string(),
    None => path.to_string(),
  }
}

/// Parse `git log --numstat` output with NUL-separated commit headers.
///
/// Each accepted stat contributes `churn.loc_of(ins, del)` lines for the preceding header's
/// author. Entries rejected by `accept` are skipped entirely; binary entries are collected
/// into `binary_files` when accepted. Any other unexpected line is an error.
pub fn parse_numstat_log<F>(text: &str, churn: Churn, accept: F) -> Result<LogParse, ParseError>
where
  F: Fn(&str) -> bool,
{
  let mut out = LogParse::default();
  let mut header: Option<CommitHeader> = None;

  for (idx, raw) in text.lines().enumerate() {
    let line = idx + 1;
    if raw.is_empty() {
      continue;
    }
    if raw.starts_with('\u{0}') {
      header = Some(parse_commit_header(raw, line)?);
      continue;
    }
    if let Some(path) = binary_stat_path(raw) {
      let path = normalize_rename(path);
      if accept(&path) {
        out.binary_files.push(path);
      }
      continue;
    }

    let stat = parse_stat_line(raw, line)?;
    let Some(commit) = header.as_ref() else {
      return Err(ParseError::OrphanStat { line, text: raw.to_string() });
    };
    if !churn.counts_churn() || !accept(&stat.path) {
      continue;
    }
    out.chunks.push(Chunk {
      lines: churn.loc_of(stat.insertions, stat.deletions),
      file: stat.path,
      name: commit.name.clone(),
      email: commit.email.clone(),
      ctime: Some(commit.ctime),
    });
  }

  Ok(out)
}
