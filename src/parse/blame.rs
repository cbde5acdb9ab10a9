use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{parse_number, ParseError};
use crate::model::Chunk;

// <sha> <orig-line> <final-line> <line-count>
static BLOCK_HEADER: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^([0-9a-f]{40}|[0-9a-f]{64}) (\d+) (\d+) (\d+)$").unwrap());

/// Commit metadata; `--incremental` prints it only the first time a commit appears.
#[derive(Debug, Default, Clone)]
struct CommitMeta {
  author: Option<String>,
  mail: Option<String>,
  ctime: Option<i64>,
  boundary: bool,
}

struct Block {
  sha: String,
  lines: u64,
  header_line: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlameParse {
  pub chunks: Vec<Chunk>,
  /// Lines owned by boundary commits; attributed to nobody.
  pub boundary_lines: u64,
}

fn strip_mail(value: &str) -> Option<String> {
  let mail = value.trim().trim_start_matches('<').trim_end_matches('>');
  if mail.is_empty() { None } else { Some(mail.to_string()) }
}

/// Parse `git blame --incremental` output into one chunk per non-boundary block.
///
/// Each chunk is attributed to the block's `filename`, which may differ from the path
/// that was blamed when move/copy detection followed lines into another file.
pub fn parse_blame_incremental(text: &str) -> Result<BlameParse, ParseError> {
  let mut commits: HashMap<String, CommitMeta> = HashMap::new();
  let mut current: Option<Block> = None;
  let mut out = BlameParse::default();

  for (idx, raw) in text.lines().enumerate() {
    let line = idx + 1;
    if raw.is_empty() {
      continue;
    }

    let Some(block) = current.as_ref() else {
      let caps = BLOCK_HEADER.captures(raw).ok_or_else(|| ParseError::UnexpectedLine {
        context: "blame",
        line,
        text: raw.to_string(),
      })?;
      let sha = caps[1].to_string();
      let lines = parse_number::<u64>(&caps[4], line)?;
      commits.entry(sha.clone()).or_default();
      current = Some(Block { sha, lines, header_line: line });
      continue;
    };

    let (key, value) = raw.split_once(' ').unwrap_or((raw, ""));

    if key == "filename" {
      let meta = commits.get(&block.sha).cloned().unwrap_or_default();
      if meta.boundary {
        out.boundary_lines += block.lines;
      } else {
        let name = meta.author.ok_or_else(|| ParseError::MissingAuthor {
          line: block.header_line,
          sha: block.sha.clone(),
        })?;
        out.chunks.push(Chunk {
          file: value.to_string(),
          name,
          email: meta.mail,
          lines: block.lines,
          ctime: meta.ctime,
        });
      }
      current = None;
      continue;
    }

    let meta = commits.entry(block.sha.clone()).or_default();
    match key {
      "author" => meta.author = Some(value.to_string()),
      "author-mail" => meta.mail = strip_mail(value),
      "committer-time" => meta.ctime = Some(parse_number::<i64>(value, line)?),
      "boundary" => meta.boundary = true,
      // author-time, summary, previous, committer, ...
      _ => {}
    }
  }

  if let Some(block) = current {
    return Err(ParseError::Unterminated { sha: block.sha });
  }
  Ok(out)
}
