// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Pure helpers to estimate developer effort from commit timestamps (hours) and line counts (COCOMO months)
// role: metrics/estimation
// outputs: f64 estimates computed from in-memory values (no IO)
// invariants:
// - Deterministic math; no panics on empty input
// - gaps of MAX_COMMIT_GAP_SECS or more start a new session
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

/// Two commits closer than this belong to the same coding session.
pub const MAX_COMMIT_GAP_SECS: i64 = 2 * 60 * 60;
/// Time credited for the work before the first commit of the history.
pub const FIRST_COMMIT_MINUTES: f64 = 120.0;

/// Hours spent, estimated from commit timestamps.
///
/// Sums the gaps between consecutive commits that fall under `MAX_COMMIT_GAP_SECS`,
/// then adds `FIRST_COMMIT_MINUTES`. An author with no timestamps still gets that allowance.
pub fn hours(ctimes: &[i64]) -> f64 {
  let mut sorted = ctimes.to_vec();
  sorted.sort_unstable();
  let session_secs: i64 = sorted
    .windows(2)
    .map(|w| w[1] - w[0])
    .filter(|gap| *gap < MAX_COMMIT_GAP_SECS)
    .sum();
  (session_secs as f64 / 60.0 + FIRST_COMMIT_MINUTES) / 60.0
}

/// Person-months of effort for `loc` lines (basic COCOMO, organic mode).
pub fn cocomo_months(loc: u64) -> f64 {
  3.2 * (loc as f64 / 1000.0).powf(1.05)
}
