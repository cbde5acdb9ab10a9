use anyhow::Result;
use clap::Parser;

use git_fame::cli::{normalize, Cli};
use git_fame::diag::TracingSink;
use git_fame::{logging, processor, util};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  logging::init_tracing(cli.verbose);

  // Phase 1: validate options before touching any repository
  let mut cfg = normalize(cli)?;
  cfg.term_width = util::terminal_width();

  // Phase 2: process repositories and render
  let sink = TracingSink { warn: cfg.warn_binary };
  let report = processor::run(&cfg, &sink)?;
  println!("{}", report);
  Ok(())
}
