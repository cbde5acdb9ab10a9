use std::path::Path;

use predicates::prelude::*;
use serde_json::Value;
use test_support::{cmd_bin, fixture_repo};

fn fame(repo: &Path, args: &[&str]) -> assert_cmd::Command {
  let mut cmd = cmd_bin("git-fame");
  cmd.env_remove("RUST_LOG").arg(repo).arg("-s").args(args);
  cmd
}

fn json_report(repo: &Path, args: &[&str]) -> Value {
  let args: Vec<&str> = args.iter().copied().chain(["--format", "json"]).collect();
  let out = fame(repo, &args).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).expect("json report")
}

fn column(report: &Value, name: &str) -> usize {
  report["columns"]
    .as_array()
    .unwrap()
    .iter()
    .position(|c| c == name)
    .unwrap_or_else(|| panic!("missing column {name}"))
}

fn row<'a>(report: &'a Value, author: &str) -> &'a Value {
  let idx = column(report, "Author");
  report["data"]
    .as_array()
    .unwrap()
    .iter()
    .find(|r| r[idx] == author)
    .unwrap_or_else(|| panic!("missing author {author}"))
}

fn authors(report: &Value) -> Vec<String> {
  let idx = column(report, "Author");
  report["data"].as_array().unwrap().iter().map(|r| r[idx].as_str().unwrap().to_string()).collect()
}

#[test]
fn surviving_lines_by_default() {
  let repo = fixture_repo();
  let report = json_report(repo.path(), &[]);

  assert_eq!(report["total"]["loc"], 11);
  assert_eq!(report["total"]["commits"], 4);
  assert_eq!(report["total"]["files"], 4);
  assert_eq!(report["columns"], serde_json::json!(["Author", "loc", "coms", "fils", "distribution"]));
  assert_eq!(report["data"][0], serde_json::json!(["Alice", 6, 2, 2, "54.5/50.0/50.0"]));
  assert_eq!(report["data"][1], serde_json::json!(["Bob", 5, 2, 2, "45.5/50.0/50.0"]));
}

#[test]
fn churn_counts_insertions_and_deletions() {
  let repo = fixture_repo();
  let report = json_report(repo.path(), &["--loc", "ins,del"]);
  let alice = row(&report, "Alice");
  assert_eq!(alice[column(&report, "loc")], 6);
  assert_eq!(alice[column(&report, "coms")], 2);
  assert_eq!(alice[column(&report, "fils")], 2);
}

#[test]
fn cost_adds_hours_and_months() {
  let repo = fixture_repo();
  let report = json_report(repo.path(), &["--cost", "hours,months"]);
  assert_eq!(report["columns"][1], "hrs");
  assert_eq!(report["columns"][2], "mths");
  // every author has a single working session: 2h each
  assert_eq!(report["total"]["hours"].as_f64(), Some(4.0));
  let months = report["total"]["months"].as_f64().unwrap();
  assert!(months > 0.0 && months < 0.1, "months = {months}");
}

#[test]
fn bytype_adds_extension_columns() {
  let repo = fixture_repo();
  let report = json_report(repo.path(), &["-t", "--sort", ".rs"]);
  let rs = column(&report, ".rs");
  let md = column(&report, ".md");
  assert!(md < rs, "extension columns are sorted");
  assert_eq!(report["total"][".rs"], 7);
  assert_eq!(report["total"][".md"], 4);

  let alice = row(&report, "Alice");
  assert_eq!(alice[rs], 4);
  assert_eq!(alice[md], 2);
  let bob = row(&report, "Bob");
  assert_eq!(bob[rs], 3);
  assert_eq!(bob[md], 2);
}

#[test]
fn min_filters_rows_but_not_totals() {
  let repo = fixture_repo();
  let report = json_report(repo.path(), &["--enum", "--min", "6"]);
  assert_eq!(report["columns"][0], "#");
  assert_eq!(report["data"], serde_json::json!([[1, "Alice", 6, 2, 2, "54.5/50.0/50.0"]]));
  assert_eq!(report["total"]["loc"], 11);
}

#[test]
fn sort_ties_keep_author_order() {
  let repo = fixture_repo();
  let report = json_report(repo.path(), &["--sort", "commits"]);
  assert_eq!(authors(&report), vec!["Alice", "Bob"]);
}

#[test]
fn include_and_exclude_filters() {
  let repo = fixture_repo();

  let report = json_report(repo.path(), &["--excl", "^docs/"]);
  assert_eq!(report["total"]["loc"], 9);
  assert_eq!(row(&report, "Bob")[column(&report, "fils")], 1);

  let report = json_report(repo.path(), &["--incl", r"\.rs$"]);
  assert_eq!(report["total"]["loc"], 7);
  assert_eq!(report["total"]["files"], 2);

  let report = json_report(repo.path(), &["-n", "--incl", "README.md"]);
  assert_eq!(report["total"]["loc"], 2);
  // commit counts come from the whole history
  assert_eq!(row(&report, "Bob")[column(&report, "coms")], 2);
  assert_eq!(row(&report, "Bob")[column(&report, "loc")], 0);
}

#[test]
fn show_modes_change_identities() {
  let repo = fixture_repo();

  let report = json_report(repo.path(), &["-e"]);
  assert_eq!(authors(&report), vec!["alice@example.com", "bob@example.com"]);

  let report = json_report(repo.path(), &["--show", "name,email"]);
  assert_eq!(authors(&report), vec!["Alice <alice@example.com>", "Bob <bob@example.com>"]);
}

#[test]
fn author_maps_rename_and_merge() {
  let repo = fixture_repo();

  let report = json_report(repo.path(), &["--map-name", "Bob=Robert"]);
  assert_eq!(authors(&report), vec!["Alice", "Robert"]);

  let report = json_report(repo.path(), &["--map-email", "bob@example.com=Alice"]);
  // src/lib.rs is shared, so the merged author touches three files
  assert_eq!(report["data"], serde_json::json!([["Alice", 11, 4, 3, " 100/ 100/ 100"]]));
}

#[test]
fn branch_selects_an_older_tree() {
  let repo = fixture_repo();
  let report = json_report(repo.path(), &["--branch", "HEAD~3"]);
  assert_eq!(report["data"], serde_json::json!([["Alice", 6, 1, 2, " 100/ 100/ 100"]]));
}

#[test]
fn delimited_formats_expand_distribution() {
  let repo = fixture_repo();

  let out = fame(repo.path(), &["--format", "csv"]).output().unwrap();
  assert!(out.status.success());
  let csv = String::from_utf8_lossy(&out.stdout);
  let mut lines = csv.lines();
  assert_eq!(lines.next(), Some("Author,loc,coms,fils,loc_dist,coms_dist,fils_dist"));
  assert_eq!(lines.next(), Some("Alice,6,2,2,54.5,50.0,50.0"));
  assert_eq!(lines.next(), Some("Bob,5,2,2,45.5,50.0,50.0"));

  fame(repo.path(), &["--format", "tsv"])
    .assert()
    .success()
    .stdout(predicate::str::starts_with("Author\tloc\tcoms\tfils\tloc_dist"));
}

#[test]
fn yaml_and_styled_formats() {
  let repo = fixture_repo();

  fame(repo.path(), &["--format", "yaml"])
    .assert()
    .success()
    .stdout(predicate::str::contains("total:").and(predicate::str::contains("- Alice")));

  fame(repo.path(), &["--format", "md"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Total loc: 11").and(predicate::str::contains("| Alice")));
}

#[test]
fn binary_files_are_reported_on_request() {
  let repo = fixture_repo();

  fame(repo.path(), &["--warn-binary"])
    .assert()
    .success()
    .stderr(predicate::str::contains("binary file skipped: logo.bin"));

  fame(repo.path(), &[]).assert().success().stderr(predicate::str::contains("logo.bin").not());
}
