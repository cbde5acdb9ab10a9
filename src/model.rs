// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the aggregation model (chunks, author records, churn/cost/sort selectors) shared by parsing, aggregation and rendering
// role: model/types
// outputs: Plain structs with type-directed merge; selector enums parsed from CLI strings
// invariants:
// - AuthorRecord.loc equals the sum of every chunk added to it (never negative: u64)
// - files is a set; merge unions it, ctimes concatenates, integers add
// - by_ext is only populated when per-type breakdown is requested
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::util::fext;

/// Key used in `by_ext` for files without an extension.
pub const NO_EXT: &str = "._None_ext";

/// One contiguous block of lines (or one numstat entry) attributed to one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
  pub file: String,
  pub name: String,
  pub email: Option<String>,
  pub lines: u64,
  pub ctime: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorRecord {
  pub loc: u64,
  pub files: BTreeSet<String>,
  pub commits: u64,
  pub ctimes: Vec<i64>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub by_ext: BTreeMap<String, u64>,
}

impl AuthorRecord {
  pub fn add_chunk(&mut self, chunk: &Chunk, bytype: bool) {
    self.loc += chunk.lines;
    self.files.insert(chunk.file.clone());
    if let Some(ts) = chunk.ctime {
      self.ctimes.push(ts);
    }
    if bytype {
      *self.by_ext.entry(ext_key(&chunk.file)).or_insert(0) += chunk.lines;
    }
  }

  /// Additive merge: integers add, sets union, sequences concatenate.
  pub fn merge(&mut self, other: AuthorRecord) {
    self.loc += other.loc;
    self.commits += other.commits;
    self.files.extend(other.files);
    self.ctimes.extend(other.ctimes);
    for (ext, loc) in other.by_ext {
      *self.by_ext.entry(ext).or_insert(0) += loc;
    }
  }
}

/// Final author identity → record. Ordered so that ties in the sort step are reproducible.
pub type AuthorStats = BTreeMap<String, AuthorRecord>;

pub fn ext_key(path: &str) -> String {
  match fext(path) {
    Some(ext) => format!(".{}", ext),
    None => NO_EXT.to_string(),
  }
}

/// Which components `loc` counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Churn {
  pub surviving: bool,
  pub insertions: bool,
  pub deletions: bool,
}

impl Churn {
  pub const SURVIVING: Churn = Churn { surviving: true, insertions: false, deletions: false };
  pub const INS_DEL: Churn = Churn { surviving: false, insertions: true, deletions: true };

  /// Surviving lines come from blame; anything else walks the log.
  pub fn uses_blame(&self) -> bool {
    self.surviving
  }

  pub fn counts_churn(&self) -> bool {
    self.insertions || self.deletions
  }

  /// Lines contributed by one numstat entry.
  pub fn loc_of(&self, insertions: u64, deletions: u64) -> u64 {
    let mut loc = 0;
    if self.insertions {
      loc += insertions;
    }
    if self.deletions {
      loc += deletions;
    }
    loc
  }
}

impl FromStr for Churn {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    let mut churn = Churn::default();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
      match part {
        "surv" | "surviving" => churn.surviving = true,
        "ins" | "insertions" => churn.insertions = true,
        "del" | "deletions" => churn.deletions = true,
        other => bail!("--loc: unknown type {:?} (expected surv, ins, del)", other),
      }
    }
    if churn == Churn::default() {
      bail!("--loc: expected at least one of surv, ins, del");
    }
    if churn.surviving && churn.counts_churn() {
      bail!("--loc: surv cannot be combined with ins/del");
    }
    Ok(churn)
  }
}

/// Enabled time-cost estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CostMethods {
  pub hours: bool,
  pub months: bool,
}

impl CostMethods {
  pub fn any(&self) -> bool {
    self.hours || self.months
  }
}

impl FromStr for CostMethods {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    let mut cost = CostMethods::default();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
      match part {
        "hour" | "hours" | "commit" | "commits" => cost.hours = true,
        "month" | "months" | "cocomo" => cost.months = true,
        other => bail!("--cost: unknown method {:?} (expected hours, months)", other),
      }
    }
    Ok(cost)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
  Loc,
  Commits,
  Files,
  Ctimes,
  Hours,
  Months,
  /// Per-extension loc, e.g. `.rs`.
  Ext(String),
}

impl FromStr for SortKey {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    Ok(match s {
      "loc" => SortKey::Loc,
      "commits" | "coms" => SortKey::Commits,
      "files" | "fils" => SortKey::Files,
      "ctimes" => SortKey::Ctimes,
      "hours" | "hrs" => SortKey::Hours,
      "months" | "mths" => SortKey::Months,
      ext if ext.len() > 1 && ext.starts_with('.') => SortKey::Ext(ext.to_string()),
      other => bail!(
        "--sort argument ({}) unrecognised; expected loc, commits, files, hours, months, ctimes or .<ext>",
        other
      ),
    })
  }
}
