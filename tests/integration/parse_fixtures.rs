use git_fame::aggregate::Aggregator;
use git_fame::identity::IdentityResolver;
use git_fame::model::Churn;
use git_fame::parse::{parse_blame_incremental, parse_numstat_log, parse_shortlog};
use test_support::read_fixture_text;

#[test]
fn blame_fixture_attributes_lines_and_drops_boundary() {
  let text = read_fixture_text("blame_incremental.txt");
  let parsed = parse_blame_incremental(&text).unwrap();

  assert_eq!(parsed.boundary_lines, 2);
  assert_eq!(parsed.chunks.len(), 3);

  let lines_for = |name: &str| -> u64 { parsed.chunks.iter().filter(|c| c.name == name).map(|c| c.lines).sum() };
  assert_eq!(lines_for("Alice"), 5);
  assert_eq!(lines_for("Bob"), 3);
  assert_eq!(lines_for("Old Timer"), 0);

  // the cached block reuses the first block's metadata
  let last = parsed.chunks.last().unwrap();
  assert_eq!(last.email.as_deref(), Some("alice@example.com"));
  assert_eq!(last.ctime, Some(1754989200));
  assert!(parsed.chunks.iter().all(|c| c.file == "src/lib.rs"));
}

#[test]
fn numstat_fixture_counts_churn_and_renames() {
  let text = read_fixture_text("numstat.log");
  let parsed = parse_numstat_log(&text, Churn::INS_DEL, |_| true).unwrap();

  assert_eq!(parsed.binary_files, vec!["logo.bin".to_string()]);
  assert_eq!(parsed.chunks.len(), 5);
  assert_eq!(parsed.chunks.last().map(|c| c.file.as_str()), Some("docs/manual.md"));

  let agg_resolver = IdentityResolver::default();
  let mut agg = Aggregator::new(&agg_resolver, true);
  agg.add_chunks(&parsed.chunks);
  let stats = agg.finish();
  assert_eq!(stats["Alice"].loc, 6);
  assert_eq!(stats["Bob"].loc, 5);
  assert_eq!(stats["Bob"].by_ext.get(".md"), Some(&2));
}

#[test]
fn numstat_fixture_respects_the_path_filter() {
  let text = read_fixture_text("numstat.log");
  let parsed = parse_numstat_log(&text, Churn::INS_DEL, |p| p.ends_with(".rs")).unwrap();
  assert_eq!(parsed.chunks.iter().map(|c| c.lines).sum::<u64>(), 7);
  assert!(parsed.binary_files.is_empty());
}

#[test]
fn shortlog_fixture_feeds_commit_counts() {
  let text = read_fixture_text("shortlog.txt");
  let entries = parse_shortlog(&text).unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0].name, "Alice");
  assert_eq!(entries[0].email, "alice@example.com");

  let resolver = IdentityResolver::default();
  let mut agg = Aggregator::new(&resolver, false);
  agg.add_commit_counts(&entries);
  let stats = agg.finish();
  assert_eq!(stats["Alice"].commits, 2);
  assert_eq!(stats["Bob"].commits, 2);
  assert_eq!(stats["Bob"].loc, 0);
}
