use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::parse::log::binary_stat_path;
use crate::util::run_git;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("spawning git {args:?}: {source}")]
    Spawn {
        args: Vec<String>,
        #[source]
        source: std::io::Error,
    },
    #[error("git {args:?} exited with status {status}: {stderr}")]
    Failed { args: Vec<String>, status: i32, stderr: String },
}

/// Flags forwarded to blame/log/shortlog.
#[derive(Debug, Clone)]
pub struct GitOptions {
    pub branch: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub ignore_whitespace: bool,
    pub detect_moves: bool,
    pub detect_copies: bool,
    pub ignore_rev: Option<String>,
    pub ignore_revs_file: Option<String>,
}

impl Default for GitOptions {
    fn default() -> Self {
        Self {
            branch: "HEAD".into(),
            since: None,
            until: None,
            ignore_whitespace: false,
            detect_moves: false,
            detect_copies: false,
            ignore_rev: None,
            ignore_revs_file: None,
        }
    }
}

impl GitOptions {
    fn date_bounds(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(since) = &self.since { args.push(format!("--since={}", since)); }
        if let Some(until) = &self.until { args.push(format!("--until={}", until)); }
        args
    }

    fn diff_flags(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.ignore_whitespace { args.push("-w".into()); }
        if self.detect_moves { args.push("-M".into()); }
        // twice so that file creation also looks for copies
        if self.detect_copies { args.extend(["-C".into(), "-C".into()]); }
        args
    }
}

fn base_args(sub: &str) -> Vec<String> {
    vec!["-c".into(), "core.quotepath=off".into(), sub.into()]
}

fn git(repo: &str, args: Vec<String>) -> Result<String, GitError> {
    debug!(repo, cmd = %args.join(" "), "running git");
    run_git(repo, &args)
}

/// Fails when `repo` is not a work tree or `branch` does not resolve to a commit.
pub fn verify_repo(repo: &str, branch: &str) -> Result<(), GitError> {
    let mut args = base_args("rev-parse");
    args.push("--is-inside-work-tree".into());
    git(repo, args)?;
    let mut args = base_args("rev-parse");
    args.extend(["--verify".into(), "--quiet".into(), format!("{}^{{commit}}", branch)]);
    git(repo, args)?;
    Ok(())
}

/// Every tracked path at `branch`.
pub fn list_files(repo: &str, branch: &str) -> Result<Vec<String>, GitError> {
    let mut args = base_args("ls-tree");
    args.extend(["-r".into(), "--name-only".into(), branch.into()]);
    let out = git(repo, args)?;
    Ok(out.lines().map(|l| l.trim_end()).filter(|s| !s.is_empty()).map(|s| s.to_string()).collect())
}

/// Object id of the empty tree in this repository's hash format.
fn empty_tree(repo: &str) -> Result<String, GitError> {
    // stdin is closed, so this hashes zero bytes
    let mut args = base_args("hash-object");
    args.extend(["-t".into(), "tree".into(), "--stdin".into()]);
    Ok(git(repo, args)?.trim().to_string())
}

/// Paths at `branch` that git treats as binary (`-\t-` in a numstat against the empty tree).
///
/// Decided by content and `.gitattributes`, never by whether a file has non-blank lines.
pub fn binary_files(repo: &str, branch: &str) -> Result<HashSet<String>, GitError> {
    let empty = empty_tree(repo)?;
    let mut args = base_args("diff");
    args.extend([
        "--numstat".into(),
        "--no-renames".into(),
        "--no-textconv".into(),
        "--no-color".into(),
        empty,
        branch.into(),
        "--".into(),
    ]);
    let out = git(repo, args)?;
    Ok(out.lines().filter_map(binary_stat_path).map(|p| p.to_string()).collect())
}

/// `git blame --incremental` for one file at `opts.branch`.
pub fn blame_incremental(repo: &str, file: &str, opts: &GitOptions) -> Result<String, GitError> {
    let mut args = base_args("blame");
    args.extend(["--incremental".into(), "--root".into()]);
    args.extend(opts.diff_flags());
    args.extend(opts.date_bounds());
    if let Some(rev) = &opts.ignore_rev { args.push(format!("--ignore-rev={}", rev)); }
    if let Some(path) = &opts.ignore_revs_file { args.push(format!("--ignore-revs-file={}", path)); }
    args.extend([opts.branch.clone(), "--".into(), file.into()]);
    git(repo, args)
}

/// Whole-history log with a NUL-separated author header and numstat lines per commit.
pub fn log_numstat(repo: &str, opts: &GitOptions) -> Result<String, GitError> {
    let mut args = base_args("log");
    args.extend(["--format=%x00%aN%x00%aE%x00%ct".into(), "--numstat".into(), "--no-color".into()]);
    args.extend(opts.diff_flags());
    args.extend(opts.date_bounds());
    args.extend([opts.branch.clone(), "--".into()]);
    git(repo, args)
}

/// Per-author commit counts.
pub fn shortlog(repo: &str, opts: &GitOptions) -> Result<String, GitError> {
    let mut args = base_args("shortlog");
    args.extend(["-s".into(), "-e".into()]);
    args.extend(opts.date_bounds());
    args.extend([opts.branch.clone(), "--".into()]);
    git(repo, args)
}
