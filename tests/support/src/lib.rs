//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support" }
//! ```
//!
//! Then in tests:
//! ```rust
//! use test_support::{init_tracing, fixture_repo};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let _repo = fixture_repo();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};
use std::process::Command;

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Insta snapshot settings for the current test.
///
/// - Centralizes snapshot files in `tests/snapshots` (relative to the test source file)
/// - Omits `Expression:` in snapshot headers for cleaner diffs
///
/// Settings are thread-local; keep the guard alive for the duration of the assertions.
#[must_use = "snapshot settings only apply while the guard is alive"]
pub fn init_insta() -> insta::internals::SettingsBindDropGuard {
    let mut settings = insta::Settings::clone_current();
    settings.set_snapshot_path("../snapshots");
    settings.set_omit_expression(true);
    settings.bind_to_scope()
}

/// Return the path to the repository's `tests/fixtures` directory.
///
/// Uses the package directory (where `Cargo.toml` lives), so it's stable regardless
/// of the runner's working directory (cargo vs nextest).
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures")
}

/// Read a UTF-8 text fixture into a string.
pub fn read_fixture_text<P: AsRef<Path>>(rel_path: P) -> String {
    let path = fixtures_dir().join(rel_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
///
/// Example:
/// ```no_run
/// use test_support::cmd_bin;
///
/// let out = cmd_bin("git-fame").arg("--help").output().unwrap();
/// assert!(out.status.success());
/// ```
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// Run `git` in `repo`, panicking on failure.
pub fn run(repo: &Path, args: &[&str]) {
    let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
    assert!(status.success(), "git {:?} failed", args);
}

/// Commit everything staged as `name <email>` at `date` (author and committer alike).
pub fn commit_as(repo: &Path, name: &str, email: &str, date: &str, msg: &str) {
    let env = [
        ("GIT_AUTHOR_NAME", name),
        ("GIT_AUTHOR_EMAIL", email),
        ("GIT_AUTHOR_DATE", date),
        ("GIT_COMMITTER_NAME", name),
        ("GIT_COMMITTER_EMAIL", email),
        ("GIT_COMMITTER_DATE", date),
    ];

    let status = Command::new("git")
        .args(["commit", "-q", "-m", msg])
        .current_dir(repo)
        .envs(env.iter().cloned())
        .status()
        .unwrap();

    assert!(status.success(), "commit {:?} failed", msg);
}

fn write(repo: &Path, rel: &str, contents: &[u8]) {
    let path = repo.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

fn init_repo() -> tempfile::TempDir {
    let dir = tempdir();
    run(dir.path(), &["init", "-q", "-b", "main"]);
    run(dir.path(), &["config", "user.name", "Fixture Bot"]);
    run(dir.path(), &["config", "user.email", "fixture@example.com"]);
    run(dir.path(), &["config", "commit.gpgsign", "false"]);
    dir
}

/// Two-author fixture repository.
///
/// 1. Alice adds `src/lib.rs` (4 lines) and `README.md` (2 lines)
/// 2. Bob appends 3 lines to `src/lib.rs` and adds `docs/guide.md` (2 lines)
/// 3. Alice adds the binary `logo.bin`
/// 4. Bob renames `docs/guide.md` to `docs/manual.md`
///
/// At HEAD: Alice owns 6 surviving lines, Bob 5; both have 2 commits.
pub fn fixture_repo() -> tempfile::TempDir {
    let dir = init_repo();
    let repo = dir.path();

    write(repo, "src/lib.rs", b"pub fn one() -> u32 {\n    1\n}\n// end\n");
    write(repo, "README.md", b"# Fixture\nA small repository.\n");
    run(repo, &["add", "."]);
    commit_as(repo, "Alice", "alice@example.com", "2025-08-12T09:00:00+00:00", "feat: initial library");

    write(
        repo,
        "src/lib.rs",
        b"pub fn one() -> u32 {\n    1\n}\n// end\npub fn two() -> u32 {\n    2\n}\n",
    );
    write(repo, "docs/guide.md", b"# Guide\nRead me.\n");
    run(repo, &["add", "."]);
    commit_as(repo, "Bob", "bob@example.com", "2025-08-12T10:00:00+00:00", "feat: add two and a guide");

    write(repo, "logo.bin", &[0x89, 0x50, 0x4e, 0x47, 0x00, 0x00, 0x01, 0xff, 0x00]);
    run(repo, &["add", "."]);
    commit_as(repo, "Alice", "alice@example.com", "2025-08-13T09:30:00+00:00", "chore: add logo");

    run(repo, &["mv", "docs/guide.md", "docs/manual.md"]);
    commit_as(repo, "Bob", "bob@example.com", "2025-08-13T10:00:00+00:00", "docs: rename guide");

    dir
}

/// Repository with a single commit by `name <email>` adding `file` with `lines` lines.
pub fn single_author_repo(name: &str, email: &str, file: &str, lines: usize) -> tempfile::TempDir {
    let dir = tempdir();
    single_author_repo_at(dir.path(), name, email, file, lines);
    dir
}

/// Same as [`single_author_repo`], created at `path` (used to build trees of repositories).
pub fn single_author_repo_at(path: &Path, name: &str, email: &str, file: &str, lines: usize) {
    std::fs::create_dir_all(path).unwrap();
    run(path, &["init", "-q", "-b", "main"]);
    run(path, &["config", "commit.gpgsign", "false"]);
    let body: String = (0..lines).map(|i| format!("line {}\n", i)).collect();
    write(path, file, body.as_bytes());
    run(path, &["add", "."]);
    commit_as(path, name, email, "2025-08-14T12:00:00+00:00", "initial");
}
