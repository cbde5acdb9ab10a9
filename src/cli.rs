use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgAction, Parser};

use crate::filter::FileFilter;
use crate::gitio::GitOptions;
use crate::identity::{parse_pairs, ShowMode};
use crate::model::{Churn, CostMethods, SortKey};
use crate::render::OutputFormat;
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "git-fame",
    version,
    about = "Pretty-print per-author contribution statistics for git repositories",
    long_about = None
)]
pub struct Cli {
  /// Git repositories (with --recurse: folders to search for repositories)
  #[arg(value_name = "GITDIR", default_value = ".")]
  pub gitdirs: Vec<PathBuf>,

  /// Branch or tag to analyse
  #[arg(long, default_value = "HEAD")]
  pub branch: String,

  /// Only count commits after this date (git approxidate ok)
  #[arg(long)]
  pub since: Option<String>,

  /// Only count commits before this date (git approxidate ok)
  #[arg(long)]
  pub until: Option<String>,

  /// Sort key: loc, commits, files, hours, months, ctimes, or an extension such as .rs (needs --bytype)
  #[arg(long, default_value = "loc")]
  pub sort: String,

  /// What loc counts: surv(iving), or ins(ertions) and/or del(etions) [default: surv, or ins,del with --cost]
  #[arg(long)]
  pub loc: Option<String>,

  /// Exclude files matching this regex (comma separated list with --no-regex)
  #[arg(long)]
  pub excl: Option<String>,

  /// Include only files matching this regex (comma separated list with --no-regex)
  #[arg(long)]
  pub incl: Option<String>,

  /// Treat --incl/--excl as exact path lists; `\,` escapes a comma
  #[arg(short = 'n', long)]
  pub no_regex: bool,

  /// Ignore whitespace when attributing lines
  #[arg(short = 'w', long = "ignore-whitespace")]
  pub ignore_whitespace: bool,

  /// Detect lines moved or copied within a file
  #[arg(short = 'M')]
  pub detect_moves: bool,

  /// Detect lines moved or copied from other files
  #[arg(short = 'C')]
  pub detect_copies: bool,

  /// Ignore this revision when blaming
  #[arg(long)]
  pub ignore_rev: Option<String>,

  /// Ignore the revisions listed in this file when blaming
  #[arg(long)]
  pub ignore_revs_file: Option<String>,

  /// Author identity to show and merge on: name, email, or name,email
  #[arg(long, default_value = "name")]
  pub show: String,

  /// Shortcut for --show=email
  #[arg(short = 'e', long)]
  pub show_email: bool,

  /// Rename an author (repeatable)
  #[arg(long = "map-name", value_name = "OLD=NEW")]
  pub map_name: Vec<String>,

  /// Attribute an email to a canonical author name (repeatable)
  #[arg(long = "map-email", value_name = "EMAIL=NAME")]
  pub map_email: Vec<String>,

  /// Time cost estimates: hours (from commit times) and/or months (COCOMO)
  #[arg(long)]
  pub cost: Option<String>,

  /// Break loc down by file extension
  #[arg(short = 't', long)]
  pub bytype: bool,

  /// Hide authors whose sort value is below this
  #[arg(long, default_value_t = 0.0)]
  pub min: f64,

  /// Number the output rows
  #[arg(long = "enum")]
  pub enumerate: bool,

  /// Output format: grid, json, yaml, csv, tsv, md, psql, rst, ascii, modern, rounded, sharp, plain
  #[arg(long, default_value = "grid")]
  pub format: String,

  /// Log binary and unblameable files as warnings
  #[arg(long)]
  pub warn_binary: bool,

  /// Search each GITDIR for repositories
  #[arg(short = 'r', long)]
  pub recurse: bool,

  /// Prefix file paths with their repository path
  #[arg(long)]
  pub prefix_gitdir: bool,

  /// Worker threads (default: number of CPUs)
  #[arg(short = 'j', long)]
  pub processes: Option<usize>,

  /// Hide the progress bar
  #[arg(short = 's', long)]
  pub silent_progress: bool,

  /// More logging (-v info, -vv debug, -vvv trace)
  #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
  pub verbose: u8,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Clone)]
pub struct EffectiveConfig {
  pub gitdirs: Vec<String>,
  pub recurse: bool,
  pub git: GitOptions,
  pub filter: FileFilter,
  pub churn: Churn,
  pub cost: CostMethods,
  pub show: ShowMode,
  pub name_map: HashMap<String, String>,
  pub email_map: HashMap<String, String>,
  pub sort: SortKey,
  pub min: f64,
  pub enumerate: bool,
  pub bytype: bool,
  pub format: OutputFormat,
  pub warn_binary: bool,
  pub prefix_gitdir: bool,
  pub processes: usize, // 0 = one per CPU
  pub show_progress: bool,
  pub verbosity: u8,
  pub term_width: usize,
}

/// Validate every option up front so configuration errors never reach git.
pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let cost: CostMethods = match &cli.cost {
    Some(s) => s.parse()?,
    None => CostMethods::default(),
  };
  let churn: Churn = match &cli.loc {
    Some(s) => s.parse()?,
    None if cost.hours => Churn::INS_DEL,
    None if cost.months => Churn { insertions: true, ..Churn::default() },
    None => Churn::SURVIVING,
  };

  let sort: SortKey = cli.sort.parse()?;
  if matches!(sort, SortKey::Ext(_)) && !cli.bytype {
    bail!("--sort {} needs --bytype", cli.sort);
  }
  if !cli.min.is_finite() || cli.min < 0.0 {
    bail!("--min must be a non-negative number (got {})", cli.min);
  }

  let show = if cli.show_email { ShowMode::Email } else { cli.show.parse()? };
  let format: OutputFormat = cli.format.parse()?;
  let filter = FileFilter::new(cli.incl.as_deref(), cli.excl.as_deref(), cli.no_regex)?;
  let name_map = parse_pairs(&cli.map_name, "--map-name")?;
  let email_map = parse_pairs(&cli.map_email, "--map-email")?;

  let processes = match cli.processes {
    Some(0) => bail!("--processes must be at least 1"),
    Some(n) => n,
    None => 0,
  };

  let git = GitOptions {
    branch: cli.branch,
    since: cli.since,
    until: cli.until,
    ignore_whitespace: cli.ignore_whitespace,
    detect_moves: cli.detect_moves,
    detect_copies: cli.detect_copies,
    ignore_rev: cli.ignore_rev,
    ignore_revs_file: cli.ignore_revs_file,
  };

  Ok(EffectiveConfig {
    gitdirs: cli.gitdirs.iter().map(|p| p.to_string_lossy().to_string()).collect(),
    recurse: cli.recurse,
    git,
    filter,
    churn,
    cost,
    show,
    name_map,
    email_map,
    sort,
    min: cli.min,
    enumerate: cli.enumerate,
    bytype: cli.bytype,
    format,
    warn_binary: cli.warn_binary,
    prefix_gitdir: cli.prefix_gitdir,
    processes,
    show_progress: !cli.silent_progress && console::user_attended_stderr(),
    verbosity: cli.verbose,
    term_width: util::DEFAULT_TERM_WIDTH, // NOTE: main replaces this with the detected width
  })
}
