//! Per-author contribution statistics for git repositories.
//!
//! The pipeline is `gitio` (run git) → `parse` (typed records) → `aggregate`
//! (per-author folds, merged across repositories) → `render` (sorted report).
//! `processor::run` wires them together for an `EffectiveConfig`.

pub mod aggregate;
pub mod cli;
pub mod cost;
pub mod diag;
pub mod filter;
pub mod gitio;
pub mod identity;
pub mod logging;
pub mod model;
pub mod params;
pub mod parse;
pub mod processor;
pub mod render;
pub mod util;
