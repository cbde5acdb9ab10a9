use std::path::Path;

use anyhow::{bail, Result};

use crate::cli::EffectiveConfig;
use crate::identity::IdentityResolver;
use crate::processor::RepoParams;
use crate::render::RenderOptions;
use crate::util;

pub fn build_repo_params(cfg: &EffectiveConfig) -> RepoParams {
  RepoParams {
    git: cfg.git.clone(),
    filter: cfg.filter.clone(),
    churn: cfg.churn,
    bytype: cfg.bytype,
    prefix_gitdir: cfg.prefix_gitdir,
    show_progress: cfg.show_progress,
  }
}

pub fn build_resolver(cfg: &EffectiveConfig) -> IdentityResolver {
  IdentityResolver::new(cfg.show, cfg.name_map.clone(), cfg.email_map.clone())
}

pub fn build_render_options(cfg: &EffectiveConfig) -> RenderOptions {
  RenderOptions {
    sort: cfg.sort.clone(),
    min: cfg.min,
    enumerate: cfg.enumerate,
    cost: cfg.cost,
    bytype: cfg.bytype,
    format: cfg.format,
    term_width: cfg.term_width,
  }
}

/// Repositories to process, in argument order without duplicates.
/// With `recurse`, each GITDIR is searched for repositories instead.
pub fn resolve_repos(cfg: &EffectiveConfig) -> Result<Vec<String>> {
  let mut repos: Vec<String> = Vec::new();
  for dir in &cfg.gitdirs {
    let found: Vec<String> = if cfg.recurse {
      util::find_git_repos(Path::new(dir)).iter().map(|p| p.to_string_lossy().to_string()).collect()
    } else {
      vec![dir.clone()]
    };
    for repo in found {
      if !repos.contains(&repo) {
        repos.push(repo);
      }
    }
  }
  if repos.is_empty() {
    bail!("no git repositories found under {}", cfg.gitdirs.join(", "));
  }
  Ok(repos)
}
