use std::collections::HashSet;

use anyhow::{Context, Result};
use regex::Regex;

#[derive(Debug, Clone)]
pub enum PathMatcher {
  Regex(Regex),
  Exact(HashSet<String>),
}

impl PathMatcher {
  pub fn matches(&self, path: &str) -> bool {
    match self {
      PathMatcher::Regex(re) => re.is_match(path),
      PathMatcher::Exact(set) => set.contains(path),
    }
  }
}

/// Include/exclude file selection. An absent include accepts everything.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
  include: Option<PathMatcher>,
  exclude: Option<PathMatcher>,
}

/// Split on commas not preceded by a backslash; `\,` becomes a literal comma.
pub fn split_escaped_commas(s: &str) -> Vec<String> {
  let mut parts = Vec::new();
  let mut current = String::new();
  let mut chars = s.chars().peekable();
  while let Some(c) = chars.next() {
    match c {
      '\\' if chars.peek() == Some(&',') => {
        chars.next();
        current.push(',');
      }
      ',' => parts.push(std::mem::take(&mut current)),
      _ => current.push(c),
    }
  }
  parts.push(current);
  parts
}

fn matcher(spec: Option<&str>, no_regex: bool, flag: &str) -> Result<Option<PathMatcher>> {
  let Some(spec) = spec.filter(|s| !s.is_empty()) else { return Ok(None) };
  if no_regex {
    let set: HashSet<String> = split_escaped_commas(spec).into_iter().filter(|p| !p.is_empty()).collect();
    return Ok(Some(PathMatcher::Exact(set)));
  }
  // with regexes a comma is an alternative, same as `|`
  let pattern = split_escaped_commas(spec).join("|");
  let re = Regex::new(&pattern).with_context(|| format!("{}: invalid regex {:?}", flag, spec))?;
  Ok(Some(PathMatcher::Regex(re)))
}

impl FileFilter {
  pub fn new(include: Option<&str>, exclude: Option<&str>, no_regex: bool) -> Result<Self> {
    Ok(Self {
      include: matcher(include, no_regex, "--incl")?,
      exclude: matcher(exclude, no_regex, "--excl")?,
    })
  }

  pub fn accepts(&self, path: &str) -> bool {
    let included = self.include.as_ref().map_or(true, |m| m.matches(path));
    let excluded = self.exclude.as_ref().is_some_and(|m| m.matches(path));
    included && !excluded
  }
}
