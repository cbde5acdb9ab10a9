use once_cell::sync::Lazy;
use regex::Regex;

use super::{parse_number, ParseError};

static SHORTLOG_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\s+(.*?)\s*<(.*)>\s*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortlogEntry {
  pub commits: u64,
  pub name: String,
  pub email: String,
}

/// Parse `git shortlog -s -e` output (`<count>\t<name> <<email>>` per line).
pub fn parse_shortlog(text: &str) -> Result<Vec<ShortlogEntry>, ParseError> {
  let mut out = Vec::new();
  for (idx, raw) in text.lines().enumerate() {
    let line = idx + 1;
    if raw.trim().is_empty() {
      continue;
    }
    let caps = SHORTLOG_LINE.captures(raw).ok_or_else(|| ParseError::UnexpectedLine {
      context: "shortlog",
      line,
      text: raw.to_string(),
    })?;
    out.push(ShortlogEntry {
      commits: parse_number(&caps[1], line)?,
      name: caps[2].to_string(),
      email: caps[3].to_string(),
    });
  }
  Ok(out)
}
