//! Engine constants and per-scheduler configuration.

/// Number of distinct command priority levels. Valid priorities are
/// `0..MAX_PRIORITY`; `MAX_PRIORITY` itself doubles as the "no level ready"
/// sentinel for the day scheduler's cursor.
pub const MAX_PRIORITY: usize = 5;

/// Priority level at which the once-per-day hostile sweep fires.
///
/// The first time a day's `start_phase` selects a level at or above this
/// threshold, declared-hostile auto-attacks are given their chance to run,
/// so they never preempt lower-priority commands. The value is historical:
/// it matches the priority band of the original built-in command set and is
/// load-bearing for turn reports, so it must not be "tidied up" without
/// verifying against recorded turns.
pub const HOSTILE_SWEEP_PRIORITY: usize = 3;

/// Sentinel wait meaning "run until an external condition ends the command".
///
/// A record with this wait is never counted down and never completes on its
/// own; only an explicit interrupt, a failing finish callback, or the
/// callback zeroing the wait ends it.
pub const WAIT_FOREVER: i32 = -1;

/// Span of one stack-depth band in the precedence key. Must exceed any
/// realistic in-location position so depth always dominates position.
pub const STACK_KEY_SPAN: u64 = 10_000;

/// Span of one priority band in the evening sort key. Must exceed any
/// possible precedence key so priority always dominates precedence.
pub const PRIORITY_SPAN: u64 = 100_000_000;

/// Per-scheduler knobs. Tests shorten the month; production uses the default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulerConfig {
    /// Number of simulated days processed by one turn.
    pub month_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { month_days: 30 }
    }
}
