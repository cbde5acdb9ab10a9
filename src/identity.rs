// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve raw (name, email) pairs from git output into the final author key
// role: aggregation/identity
// inputs: name→canonical map, email→canonical-name map, display mode, shortlog emails
// outputs: One string key per author used by AuthorStats
// invariants:
// - order is fixed: name map, then email map, then display projection
// - the same resolver is used for chunks and commit counts so both land on one key
// - a missing email falls back to the first email shortlog reported for that raw name
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{bail, Result};

/// What the author column shows (and therefore what authors are merged on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowMode {
  #[default]
  Name,
  Email,
  NameEmail,
}

impl FromStr for ShowMode {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    let parts: Vec<&str> = s.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    Ok(match parts.as_slice() {
      ["name"] => ShowMode::Name,
      ["email"] => ShowMode::Email,
      ["name", "email"] | ["email", "name"] => ShowMode::NameEmail,
      _ => bail!("--show: expected name, email or name,email (got {:?})", s),
    })
  }
}

#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
  show: ShowMode,
  name_map: HashMap<String, String>,
  email_map: HashMap<String, String>,
  known_emails: HashMap<String, String>,
}

impl IdentityResolver {
  pub fn new(show: ShowMode, name_map: HashMap<String, String>, email_map: HashMap<String, String>) -> Self {
    Self { show, name_map, email_map, known_emails: HashMap::new() }
  }

  /// Remember an email for `name`. The first one seen wins; an author with several
  /// emails keeps whichever shortlog listed first.
  pub fn learn_email(&mut self, name: &str, email: &str) {
    if email.is_empty() {
      return;
    }
    self.known_emails.entry(name.to_string()).or_insert_with(|| email.to_string());
  }

  pub fn canonical_name(&self, name: &str, email: Option<&str>) -> String {
    let mut canonical = self.name_map.get(name).cloned().unwrap_or_else(|| name.to_string());
    if let Some(mapped) = email.and_then(|e| self.email_map.get(e)) {
      canonical = mapped.clone();
    }
    canonical
  }

  pub fn resolve(&self, name: &str, email: Option<&str>) -> String {
    let email = email
      .filter(|e| !e.is_empty())
      .or_else(|| self.known_emails.get(name).map(String::as_str));
    let canonical = self.canonical_name(name, email);
    match (self.show, email) {
      (ShowMode::Name, _) | (_, None) => canonical,
      (ShowMode::Email, Some(e)) => e.to_string(),
      (ShowMode::NameEmail, Some(e)) => format!("{} <{}>", canonical, e),
    }
  }
}

/// Parse repeated `KEY=VALUE` pairs into a map; the last duplicate wins.
pub fn parse_pairs(pairs: &[String], flag: &str) -> Result<HashMap<String, String>> {
  let mut map = HashMap::new();
  for pair in pairs {
    match pair.split_once('=') {
      Some((k, v)) if !k.trim().is_empty() && !v.trim().is_empty() => {
        map.insert(k.trim().to_string(), v.trim().to_string());
      }
      _ => bail!("{}: expected KEY=VALUE, got {:?}", flag, pair),
    }
  }
  Ok(map)
}
