use predicates::prelude::*;
use test_support::{cmd_bin, fixture_repo, tempdir};

fn fame() -> assert_cmd::Command {
  let mut cmd = cmd_bin("git-fame");
  cmd.env_remove("RUST_LOG").arg("-s");
  cmd
}

#[test]
fn bad_sort_key_fails_before_touching_git() {
  // not a repository: the option error must win
  let dir = tempdir();
  fame()
    .arg(dir.path())
    .args(["--sort", "badSortArg"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--sort argument (badSortArg) unrecognised"));
}

#[test]
fn unknown_format_is_rejected() {
  let repo = fixture_repo();
  fame()
    .arg(repo.path())
    .args(["--format", "html5"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown backend"));
}

#[test]
fn extension_sort_needs_bytype() {
  let repo = fixture_repo();
  fame()
    .arg(repo.path())
    .args(["--sort", ".rs"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("needs --bytype"));
}

#[test]
fn surviving_and_churn_cannot_mix() {
  let repo = fixture_repo();
  fame().arg(repo.path()).args(["--loc", "surv,ins"]).assert().failure();
}

#[test]
fn non_repository_fails() {
  let dir = tempdir();
  fame().arg(dir.path()).assert().failure().stderr(predicate::str::contains("not a git repository"));
}

#[test]
fn unknown_branch_fails() {
  let repo = fixture_repo();
  fame().arg(repo.path()).args(["--branch", "no-such-branch"]).assert().failure();
}
