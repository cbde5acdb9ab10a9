// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate per-repository passes (shortlog, blame or log, aggregation) and merge them across repositories
// role: processing/orchestrator
// inputs: EffectiveConfig, repository list, DiagnosticSink
// outputs: Merged AuthorStats; the rendered report string from run()
// side_effects: Spawns git subprocesses; draws an optional progress bar on stderr
// invariants:
// - workers never share aggregation state: each returns a value, one thread folds them in input order
// - per-file git failures are reported and skipped; malformed git output aborts the repository pass
// - with several repositories a failing one is reported and dropped; with one it aborts the run
// errors: Repository failures carry the repository path as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::aggregate::{merge_all, Aggregator};
use crate::cli::EffectiveConfig;
use crate::diag::{Diagnostic, DiagnosticSink};
use crate::filter::FileFilter;
use crate::gitio::{self, GitError, GitOptions};
use crate::identity::IdentityResolver;
use crate::model::{AuthorStats, Chunk, Churn};
use crate::params;
use crate::parse::{parse_blame_incremental, parse_numstat_log, parse_shortlog, BlameParse, ParseError};
use crate::render;

#[derive(Debug, Clone)]
pub struct RepoParams {
  pub git: GitOptions,
  pub filter: FileFilter,
  pub churn: Churn,
  pub bytype: bool,
  pub prefix_gitdir: bool,
  pub show_progress: bool,
}

/// Why one file's blame did not make it into the totals.
#[derive(Debug)]
pub enum FileFailure {
  Skipped(GitError),
  Malformed(ParseError),
}

fn progress_bar(len: u64, msg: String, visible: bool) -> ProgressBar {
  if !visible {
    return ProgressBar::hidden();
  }
  let pb = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
  pb.set_style(
    ProgressStyle::default_bar()
      .template("{msg} {bar:30.cyan/blue} {pos}/{len}")
      .unwrap_or_else(|_| ProgressStyle::default_bar()),
  );
  pb.set_message(msg);
  pb
}

fn blame_file(repo: &str, file: &str, opts: &GitOptions) -> Result<BlameParse, FileFailure> {
  let text = gitio::blame_incremental(repo, file, opts).map_err(FileFailure::Skipped)?;
  parse_blame_incremental(&text).map_err(FileFailure::Malformed)
}

fn with_prefix(mut chunk: Chunk, repo: &str, prefix: bool) -> Chunk {
  if prefix {
    chunk.file = format!("{}/{}", repo.trim_end_matches('/'), chunk.file);
  }
  chunk
}

/// Surviving-line chunks for every selected text file at the branch tip.
fn blame_chunks(repo: &str, params: &RepoParams, sink: &dyn DiagnosticSink) -> Result<Vec<Chunk>> {
  let branch = &params.git.branch;
  let listed = gitio::list_files(repo, branch).with_context(|| format!("{}: listing files", repo))?;
  let binary = gitio::binary_files(repo, branch).with_context(|| format!("{}: detecting binary files", repo))?;

  let mut files = Vec::new();
  for file in listed.into_iter().filter(|f| params.filter.accepts(f)) {
    if binary.contains(&file) {
      sink.report(Diagnostic::BinaryFile { repo: repo.to_string(), path: file });
    } else {
      files.push(file);
    }
  }
  debug!(repo, files = files.len(), "blaming");

  let pb = progress_bar(files.len() as u64, format!("Blame {}", repo), params.show_progress);
  let results: Vec<(String, Result<BlameParse, FileFailure>)> = files
    .par_iter()
    .map(|file| {
      let res = blame_file(repo, file, &params.git);
      pb.inc(1);
      (file.clone(), res)
    })
    .collect();
  pb.finish_and_clear();

  let mut chunks = Vec::new();
  for (file, res) in results {
    match res {
      Ok(parsed) => {
        if parsed.boundary_lines > 0 {
          debug!(repo, file = %file, lines = parsed.boundary_lines, "boundary lines dropped");
        }
        chunks.extend(parsed.chunks);
      }
      Err(FileFailure::Skipped(err)) => {
        sink.report(Diagnostic::FileSkipped { repo: repo.to_string(), path: file, reason: err.to_string() });
      }
      Err(FileFailure::Malformed(err)) => {
        return Err(anyhow::Error::new(err).context(format!("{}: malformed blame output for {}", repo, file)));
      }
    }
  }
  Ok(chunks)
}

/// Churn chunks from one walk over the log.
fn log_chunks(repo: &str, params: &RepoParams, sink: &dyn DiagnosticSink) -> Result<Vec<Chunk>> {
  let text = gitio::log_numstat(repo, &params.git).with_context(|| format!("{}: git log", repo))?;
  let parsed = parse_numstat_log(&text, params.churn, |path| params.filter.accepts(path))
    .with_context(|| format!("{}: malformed log output", repo))?;
  for path in parsed.binary_files {
    sink.report(Diagnostic::BinaryFile { repo: repo.to_string(), path });
  }
  Ok(parsed.chunks)
}

/// Full pipeline for one repository.
pub fn process_repo(
  repo: &str,
  params: &RepoParams,
  resolver: &IdentityResolver,
  sink: &dyn DiagnosticSink,
) -> Result<AuthorStats> {
  gitio::verify_repo(repo, &params.git.branch)
    .with_context(|| format!("{}: not a git repository or unknown ref {:?}", repo, params.git.branch))?;

  let shortlog = gitio::shortlog(repo, &params.git).with_context(|| format!("{}: git shortlog", repo))?;
  let commits = parse_shortlog(&shortlog).with_context(|| format!("{}: malformed shortlog output", repo))?;

  let mut resolver = resolver.clone();
  for entry in &commits {
    resolver.learn_email(&entry.name, &entry.email);
  }

  let chunks = if params.churn.uses_blame() {
    blame_chunks(repo, params, sink)?
  } else {
    log_chunks(repo, params, sink)?
  };

  let mut agg = Aggregator::new(&resolver, params.bytype);
  for chunk in chunks {
    agg.add_chunk(&with_prefix(chunk, repo, params.prefix_gitdir));
  }
  agg.add_commit_counts(&commits);
  let stats = agg.finish();
  info!(repo, authors = stats.len(), "repository processed");
  Ok(stats)
}

/// Process every repository on the current rayon pool and merge the results.
pub fn process_repos(
  repos: &[String],
  params: &RepoParams,
  resolver: &IdentityResolver,
  sink: &dyn DiagnosticSink,
) -> Result<AuthorStats> {
  if let [repo] = repos {
    return process_repo(repo, params, resolver, sink);
  }

  // one bar for the whole run instead of one per repository
  let inner = RepoParams { show_progress: false, ..params.clone() };
  let pb = progress_bar(repos.len() as u64, "Repositories".to_string(), params.show_progress);
  let results: Vec<(&String, Result<AuthorStats>)> = repos
    .par_iter()
    .map(|repo| {
      let res = process_repo(repo, &inner, resolver, sink);
      pb.inc(1);
      (repo, res)
    })
    .collect();
  pb.finish_and_clear();

  let mut processed = Vec::with_capacity(results.len());
  for (repo, res) in results {
    match res {
      Ok(stats) => processed.push(stats),
      Err(err) => sink.report(Diagnostic::RepoSkipped { repo: repo.clone(), reason: format!("{:#}", err) }),
    }
  }
  if processed.is_empty() {
    bail!("none of the {} repositories could be processed", repos.len());
  }
  Ok(merge_all(processed))
}

/// Resolve repositories, process them on a pool of `cfg.processes` threads and render the report.
pub fn run(cfg: &EffectiveConfig, sink: &dyn DiagnosticSink) -> Result<String> {
  let repos = params::resolve_repos(cfg)?;
  let repo_params = params::build_repo_params(cfg);
  let resolver = params::build_resolver(cfg);

  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(cfg.processes)
    .build()
    .context("building worker pool")?;
  let stats = pool.install(|| process_repos(&repos, &repo_params, &resolver, sink))?;

  render::render(&stats, &params::build_render_options(cfg))
}
