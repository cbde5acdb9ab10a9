// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn AuthorStats into a sorted, filtered report and encode it as grid/styled text, JSON/YAML or CSV/TSV
// role: metrics/formatter
// inputs: AuthorStats, RenderOptions (sort key, min, enum, cost, bytype, format, terminal width)
// outputs: One report string for stdout
// invariants:
// - totals are computed from the unfiltered stats; the min filter only drops rows
// - row order is decided here (stable descending sort), never by arrival order
// - 100.0 renders as " 100" so distribution cells keep their width
// errors: unknown backend names are rejected by OutputFormat::from_str before any git call
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use serde::{Serialize, Serializer};
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};

use crate::aggregate::{self, author_hours, author_months, Totals};
use crate::model::{AuthorRecord, AuthorStats, CostMethods, SortKey};
use crate::util::DEFAULT_TERM_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
  Markdown,
  Psql,
  Rst,
  Ascii,
  Modern,
  Rounded,
  Sharp,
  Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
  /// Aligned `+---+` table with a `=` header rule.
  #[default]
  Grid,
  Json,
  Yaml,
  Csv,
  Tsv,
  Styled(TableStyle),
}

impl OutputFormat {
  /// Human-oriented backends get the totals preamble.
  pub fn is_text(&self) -> bool {
    matches!(self, OutputFormat::Grid | OutputFormat::Styled(_))
  }
}

impl FromStr for OutputFormat {
  type Err = anyhow::Error;

  fn from_str(s: &str) -> Result<Self> {
    Ok(match s.to_ascii_lowercase().as_str() {
      "grid" => OutputFormat::Grid,
      "json" => OutputFormat::Json,
      "yaml" | "yml" => OutputFormat::Yaml,
      "csv" => OutputFormat::Csv,
      "tsv" => OutputFormat::Tsv,
      "md" | "markdown" => OutputFormat::Styled(TableStyle::Markdown),
      "psql" => OutputFormat::Styled(TableStyle::Psql),
      "rst" => OutputFormat::Styled(TableStyle::Rst),
      "ascii" => OutputFormat::Styled(TableStyle::Ascii),
      "modern" => OutputFormat::Styled(TableStyle::Modern),
      "rounded" => OutputFormat::Styled(TableStyle::Rounded),
      "sharp" => OutputFormat::Styled(TableStyle::Sharp),
      "plain" => OutputFormat::Styled(TableStyle::Plain),
      _ => bail!(
        "--format: unknown backend {:?} (expected grid, json, yaml, csv, tsv, md, psql, rst, ascii, modern, rounded, sharp, plain)",
        s
      ),
    })
  }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
  pub sort: SortKey,
  pub min: f64,
  pub enumerate: bool,
  pub cost: CostMethods,
  pub bytype: bool,
  pub format: OutputFormat,
  pub term_width: usize,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      sort: SortKey::Loc,
      min: 0.0,
      enumerate: false,
      cost: CostMethods::default(),
      bytype: false,
      format: OutputFormat::Grid,
      term_width: DEFAULT_TERM_WIDTH,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
  Index,
  Author,
  Hours,
  Months,
  Loc,
  Commits,
  Files,
  Distribution,
  Ext(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
  Left,
  Right,
  Center,
}

impl Column {
  pub fn header(&self) -> &str {
    match self {
      Column::Index => "#",
      Column::Author => "Author",
      Column::Hours => "hrs",
      Column::Months => "mths",
      Column::Loc => "loc",
      Column::Commits => "coms",
      Column::Files => "fils",
      Column::Distribution => "distribution",
      Column::Ext(ext) => ext,
    }
  }

  fn align(&self) -> Align {
    match self {
      Column::Author | Column::Distribution => Align::Left,
      _ => Align::Right,
    }
  }

  fn header_align(&self) -> Align {
    match self {
      Column::Distribution => Align::Center,
      other => other.align(),
    }
  }
}

/// Percent share of loc/commits/files for one author.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distribution {
  pub loc: f64,
  pub commits: f64,
  pub files: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Text(String),
  Int(u64),
  Float { value: f64, precision: usize },
  Dist(Distribution),
}

impl Cell {
  pub fn display(&self) -> String {
    match self {
      Cell::Text(s) => s.clone(),
      Cell::Int(n) => n.to_string(),
      Cell::Float { value, precision } => format!("{:.*}", precision, value),
      Cell::Dist(d) => format_distribution(d),
    }
  }
}

impl Serialize for Cell {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Cell::Text(s) => serializer.serialize_str(s),
      Cell::Int(n) => serializer.serialize_u64(*n),
      Cell::Float { value, .. } => serializer.serialize_f64(*value),
      Cell::Dist(d) => serializer.serialize_str(&format_distribution(d)),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Report {
  pub totals: Totals,
  pub columns: Vec<Column>,
  pub rows: Vec<Vec<Cell>>,
}

pub fn percent(value: u64, total: u64) -> f64 {
  100.0 * value as f64 / total.max(1) as f64
}

pub fn distribution(record: &AuthorRecord, totals: &Totals) -> Distribution {
  Distribution {
    loc: percent(record.loc, totals.loc),
    commits: percent(record.commits, totals.commits),
    files: percent(record.files.len() as u64, totals.files),
  }
}

/// `87.8/ 100/71.4`: one decimal, four wide, a full share shown as a bare ` 100`.
pub fn format_distribution(d: &Distribution) -> String {
  [d.loc, d.commits, d.files]
    .iter()
    .map(|v| format!("{:4.1}", v).replace("100.0", " 100"))
    .collect::<Vec<_>>()
    .join("/")
}

/// Value rows are sorted (and filtered) on. Collections sort by their length.
pub fn sort_value(record: &AuthorRecord, key: &SortKey) -> f64 {
  match key {
    SortKey::Loc => record.loc as f64,
    SortKey::Commits => record.commits as f64,
    SortKey::Files => record.files.len() as f64,
    SortKey::Ctimes => record.ctimes.len() as f64,
    SortKey::Hours => author_hours(record),
    SortKey::Months => author_months(record),
    SortKey::Ext(ext) => record.by_ext.get(ext).copied().unwrap_or(0) as f64,
  }
}

pub fn build_report(stats: &AuthorStats, opts: &RenderOptions) -> Report {
  let totals = aggregate::totals(stats, opts.cost);

  let mut ranked: Vec<(&String, &AuthorRecord, f64)> =
    stats.iter().map(|(author, rec)| (author, rec, sort_value(rec, &opts.sort))).collect();
  ranked.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));
  ranked.retain(|(_, _, value)| *value >= opts.min);

  let mut columns = Vec::new();
  if opts.enumerate {
    columns.push(Column::Index);
  }
  columns.push(Column::Author);
  if opts.cost.hours {
    columns.push(Column::Hours);
  }
  if opts.cost.months {
    columns.push(Column::Months);
  }
  columns.extend([Column::Loc, Column::Commits, Column::Files, Column::Distribution]);
  if opts.bytype {
    columns.extend(totals.by_ext.keys().map(|ext| Column::Ext(ext.clone())));
  }

  let rows = ranked
    .iter()
    .enumerate()
    .map(|(idx, (author, rec, _))| {
      columns
        .iter()
        .map(|col| match col {
          Column::Index => Cell::Int(idx as u64 + 1),
          Column::Author => Cell::Text(author.to_string()),
          Column::Hours => Cell::Float { value: author_hours(rec), precision: 0 },
          Column::Months => Cell::Float { value: author_months(rec), precision: 1 },
          Column::Loc => Cell::Int(rec.loc),
          Column::Commits => Cell::Int(rec.commits),
          Column::Files => Cell::Int(rec.files.len() as u64),
          Column::Distribution => Cell::Dist(distribution(rec, &totals)),
          Column::Ext(ext) => Cell::Int(rec.by_ext.get(ext).copied().unwrap_or(0)),
        })
        .collect()
    })
    .collect();

  Report { totals, columns, rows }
}

fn total_cells(totals: &Totals) -> BTreeMap<String, Cell> {
  let mut out = BTreeMap::new();
  out.insert("commits".to_string(), Cell::Int(totals.commits));
  out.insert("files".to_string(), Cell::Int(totals.files));
  out.insert("loc".to_string(), Cell::Int(totals.loc));
  if let Some(hours) = totals.hours {
    out.insert("hours".to_string(), Cell::Float { value: hours, precision: 1 });
  }
  if let Some(months) = totals.months {
    out.insert("months".to_string(), Cell::Float { value: months, precision: 1 });
  }
  for (ext, loc) in &totals.by_ext {
    out.insert(ext.clone(), Cell::Int(*loc));
  }
  out
}

pub fn totals_preamble(totals: &Totals) -> String {
  total_cells(totals)
    .iter()
    .map(|(key, cell)| format!("Total {}: {}\n", key, cell.display()))
    .collect()
}

pub fn render(stats: &AuthorStats, opts: &RenderOptions) -> Result<String> {
  let report = build_report(stats, opts);
  let preamble = if opts.format.is_text() { totals_preamble(&report.totals) } else { String::new() };
  match opts.format {
    OutputFormat::Grid => Ok(format!("{}{}", preamble, render_grid(&report, opts.term_width))),
    OutputFormat::Styled(style) => Ok(format!("{}{}", preamble, render_styled(&report, style))),
    OutputFormat::Json => Ok(serde_json::to_string_pretty(&structured(&report))?),
    OutputFormat::Yaml => Ok(serde_yaml::to_string(&structured(&report))?.trim_end().to_string()),
    OutputFormat::Csv => render_delimited(&report, b','),
    OutputFormat::Tsv => render_delimited(&report, b'\t'),
  }
}

fn pad(text: &str, width: usize, align: Align) -> String {
  let gap = width.saturating_sub(text.chars().count());
  match align {
    Align::Left => format!("{}{}", text, " ".repeat(gap)),
    Align::Right => format!("{}{}", " ".repeat(gap), text),
    Align::Center => {
      let left = gap / 2;
      format!("{}{}{}", " ".repeat(left), text, " ".repeat(gap - left))
    }
  }
}

pub fn render_grid(report: &Report, term_width: usize) -> String {
  let mut cells: Vec<Vec<String>> = report.rows.iter().map(|row| row.iter().map(Cell::display).collect()).collect();
  let mut widths: Vec<usize> = report.columns.iter().map(|c| c.header().chars().count()).collect();
  for row in &cells {
    for (i, cell) in row.iter().enumerate() {
      widths[i] = widths[i].max(cell.chars().count());
    }
  }

  // shrink the author column so the table fits the terminal
  if let Some(a) = report.columns.iter().position(|c| *c == Column::Author) {
    let others: usize = widths.iter().enumerate().filter(|(i, _)| *i != a).map(|(_, w)| w).sum();
    let budget = term_width.saturating_sub(others + 3 * widths.len() + 1).max(6);
    if widths[a] > budget {
      widths[a] = budget;
      for row in &mut cells {
        row[a] = row[a].chars().take(budget).collect();
      }
    }
  }

  let rule = |fill: &str| -> String {
    let segments: Vec<String> = widths.iter().map(|w| fill.repeat(w + 2)).collect();
    format!("+{}+", segments.join("+"))
  };
  let line = |texts: Vec<String>| -> String { format!("| {} |", texts.join(" | ")) };

  let header: Vec<String> = report
    .columns
    .iter()
    .zip(&widths)
    .map(|(col, w)| pad(col.header(), *w, col.header_align()))
    .collect();

  let mut out = vec![rule("-"), line(header), rule("=")];
  for row in &cells {
    let texts: Vec<String> = row
      .iter()
      .zip(report.columns.iter().zip(&widths))
      .map(|(text, (col, w))| pad(text, *w, col.align()))
      .collect();
    out.push(line(texts));
  }
  out.push(rule("-"));
  out.join("\n")
}

fn render_styled(report: &Report, style: TableStyle) -> String {
  let mut builder = Builder::default();
  builder.push_record(report.columns.iter().map(|c| c.header().to_string()));
  for row in &report.rows {
    builder.push_record(row.iter().map(Cell::display));
  }
  let mut table = builder.build();
  match style {
    TableStyle::Markdown => table.with(Style::markdown()),
    TableStyle::Psql => table.with(Style::psql()),
    TableStyle::Rst => table.with(Style::re_structured_text()),
    TableStyle::Ascii => table.with(Style::ascii()),
    TableStyle::Modern => table.with(Style::modern()),
    TableStyle::Rounded => table.with(Style::rounded()),
    TableStyle::Sharp => table.with(Style::sharp()),
    TableStyle::Plain => table.with(Style::blank()),
  };
  if let Some(first) = report.columns.iter().position(|c| c.align() == Align::Right && *c != Column::Index) {
    table.with(Modify::new(Columns::new(first..)).with(Alignment::right()));
  }
  table.to_string()
}

#[derive(Serialize)]
struct Structured<'a> {
  total: BTreeMap<String, Cell>,
  data: &'a [Vec<Cell>],
  columns: Vec<&'a str>,
}

fn structured(report: &Report) -> Structured<'_> {
  Structured {
    total: total_cells(&report.totals),
    data: &report.rows,
    columns: report.columns.iter().map(Column::header).collect(),
  }
}

fn render_delimited(report: &Report, delimiter: u8) -> Result<String> {
  let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(Vec::new());

  let mut header: Vec<String> = Vec::new();
  for col in &report.columns {
    match col {
      Column::Distribution => header.extend(["loc_dist", "coms_dist", "fils_dist"].map(String::from)),
      other => header.push(other.header().to_string()),
    }
  }
  wtr.write_record(&header)?;

  for row in &report.rows {
    let mut record: Vec<String> = Vec::with_capacity(header.len());
    for cell in row {
      match cell {
        Cell::Dist(d) => record.extend([d.loc, d.commits, d.files].map(|v| format!("{:.1}", v))),
        other => record.push(other.display()),
      }
    }
    wtr.write_record(&record)?;
  }

  let bytes = wtr.into_inner().map_err(|e| anyhow!("flushing delimited output: {}", e))?;
  Ok(String::from_utf8(bytes)?.trim_end().to_string())
}
