// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for running git, discovering repositories, file extensions, terminal width, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; paths; clap CommandFactory
// outputs: Raw git stdout, repository lists, extension strings, man page text
// side_effects: run_git invokes subprocesses; find_git_repos reads directories
// invariants:
// - run_git never panics; non-zero exits surface as GitError::Failed with stderr
// - find_git_repos returns a sorted list and never descends into a found repository
// errors: run_git surfaces command + exit status + stderr
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::process::Command;

use clap::CommandFactory;
use tracing::trace;

use crate::gitio::GitError;

/// Width assumed when stdout is not a terminal.
pub const DEFAULT_TERM_WIDTH: usize = 256;

pub fn run_git(repo: &str, args: &[String]) -> Result<String, GitError> {
  trace!(repo, ?args, "git");
  let out = Command::new("git")
    .args(args)
    .current_dir(repo)
    .output()
    .map_err(|source| GitError::Spawn { args: args.to_vec(), source })?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    Err(GitError::Failed {
      args: args.to_vec(),
      status: out.status.code().unwrap_or(-1),
      stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
    })
  }
}

/// Extension of the file name component, if any (`a/b.tar.gz` → `gz`, `.gitignore` → none).
pub fn fext(path: &str) -> Option<&str> {
  Path::new(path).extension().and_then(|e| e.to_str()).filter(|e| !e.is_empty())
}

/// Current stdout width, or `DEFAULT_TERM_WIDTH` for pipes.
pub fn terminal_width() -> usize {
  console::Term::stdout()
    .size_checked()
    .map(|(_rows, cols)| cols as usize)
    .filter(|w| *w > 0)
    .unwrap_or(DEFAULT_TERM_WIDTH)
}

const SKIP_SCAN_DIRS: &[&str] = &[
  "node_modules", "vendor", "target", "dist", "build", "__pycache__",
];

/// Recursively finds git repository roots under `root`.
/// Stops descending into a directory once a `.git` entry is found.
pub fn find_git_repos(root: &Path) -> Vec<PathBuf> {
  if root.join(".git").exists() {
    return vec![root.to_path_buf()];
  }
  let mut repos = Vec::new();
  scan_for_repos(root, 0, &mut repos);
  repos.sort();
  repos
}

fn scan_for_repos(dir: &Path, depth: usize, repos: &mut Vec<PathBuf>) {
  if depth > 8 {
    return;
  }
  let Ok(entries) = std::fs::read_dir(dir) else { return };
  for entry in entries.flatten() {
    let path = entry.path();
    if !path.is_dir() {
      continue;
    }
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.starts_with('.') || SKIP_SCAN_DIRS.contains(&name) {
      continue;
    }
    if path.join(".git").exists() {
      repos.push(path);
    } else {
      scan_for_repos(&path, depth + 1, repos);
    }
  }
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
