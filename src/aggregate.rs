// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fold parsed chunks and commit counts into per-author statistics and repository totals
// role: aggregation
// inputs: Chunks from blame/log parsing, shortlog entries, an IdentityResolver
// outputs: AuthorStats (BTreeMap keyed by resolved author) and Totals
// invariants:
// - an author appears iff it owns at least one chunk or one counted commit
// - totals.loc/commits/files are sums of the per-author values (files may double count shared files)
// - merging is additive and order independent
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cost;
use crate::identity::IdentityResolver;
use crate::model::{AuthorRecord, AuthorStats, Chunk, CostMethods};
use crate::parse::ShortlogEntry;

pub struct Aggregator<'a> {
  resolver: &'a IdentityResolver,
  bytype: bool,
  stats: AuthorStats,
}

impl<'a> Aggregator<'a> {
  pub fn new(resolver: &'a IdentityResolver, bytype: bool) -> Self {
    Self { resolver, bytype, stats: AuthorStats::new() }
  }

  pub fn add_chunk(&mut self, chunk: &Chunk) {
    let author = self.resolver.resolve(&chunk.name, chunk.email.as_deref());
    self.stats.entry(author).or_default().add_chunk(chunk, self.bytype);
  }

  pub fn add_chunks<'c>(&mut self, chunks: impl IntoIterator<Item = &'c Chunk>) {
    for chunk in chunks {
      self.add_chunk(chunk);
    }
  }

  /// Credit shortlog commit counts; authors with commits but no surviving lines get a zero-loc record.
  pub fn add_commit_counts(&mut self, entries: &[ShortlogEntry]) {
    for entry in entries {
      let email = Some(entry.email.as_str()).filter(|e| !e.is_empty());
      let author = self.resolver.resolve(&entry.name, email);
      self.stats.entry(author).or_default().commits += entry.commits;
    }
  }

  pub fn finish(self) -> AuthorStats {
    self.stats
  }
}

pub fn merge_stats(into: &mut AuthorStats, other: AuthorStats) {
  for (author, record) in other {
    match into.get_mut(&author) {
      Some(existing) => existing.merge(record),
      None => {
        into.insert(author, record);
      }
    }
  }
}

pub fn merge_all(all: impl IntoIterator<Item = AuthorStats>) -> AuthorStats {
  let mut out = AuthorStats::new();
  for stats in all {
    merge_stats(&mut out, stats);
  }
  out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
  pub loc: u64,
  pub commits: u64,
  pub files: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hours: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub months: Option<f64>,
  #[serde(skip_serializing_if = "BTreeMap::is_empty")]
  pub by_ext: BTreeMap<String, u64>,
}

pub fn author_hours(record: &AuthorRecord) -> f64 {
  cost::hours(&record.ctimes)
}

pub fn author_months(record: &AuthorRecord) -> f64 {
  cost::cocomo_months(record.loc)
}

pub fn totals(stats: &AuthorStats, cost: CostMethods) -> Totals {
  let mut t = Totals::default();
  for record in stats.values() {
    t.loc += record.loc;
    t.commits += record.commits;
    t.files += record.files.len() as u64;
    for (ext, loc) in &record.by_ext {
      *t.by_ext.entry(ext.clone()).or_insert(0) += loc;
    }
  }
  if cost.hours {
    t.hours = Some(stats.values().map(author_hours).sum());
  }
  if cost.months {
    t.months = Some(stats.values().map(author_months).sum());
  }
  t
}
