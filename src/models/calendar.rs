//! Break calendar and time window models.
//!
//! Models the non-working intervals of a department (lunch, rest breaks)
//! and shifts a work window around them.
//!
//! # Time Model
//! All times are seconds since midnight of the production date.
//!
//! # Break Semantics
//! Work never starts inside a break, and a window that reaches a break
//! pauses through it: the break length is added to the end so that
//! `end - start - (break time inside the window) == duration`.

use serde::{Deserialize, Serialize};

use super::clock::{parse_hhmm, Seconds};
use super::config::BreakSpec;

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (seconds, inclusive).
    pub start: Seconds,
    /// Interval end (seconds, exclusive).
    pub end: Seconds,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: Seconds, end: Seconds) -> Self {
        Self { start, end }
    }

    /// Length of this window (seconds).
    #[inline]
    pub fn duration(&self) -> Seconds {
        self.end - self.start
    }

    /// Whether a time falls within this window.
    #[inline]
    pub fn contains(&self, time: Seconds) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The breaks of one department, sorted by start.
///
/// Applied uniformly to every line of the department.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakCalendar {
    breaks: Vec<TimeWindow>,
}

impl BreakCalendar {
    /// Creates a calendar without breaks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a calendar from configured `HH:MM` intervals.
    ///
    /// Unparseable times read as midnight; empty or inverted intervals
    /// are dropped since they can never contain a time.
    pub fn from_specs(specs: &[BreakSpec]) -> Self {
        specs
            .iter()
            .fold(Self::new(), |cal, b| {
                cal.with_break(parse_hhmm(&b.start), parse_hhmm(&b.end))
            })
    }

    /// Adds a break, keeping the list sorted by start.
    pub fn with_break(mut self, start: Seconds, end: Seconds) -> Self {
        if end > start {
            self.breaks.push(TimeWindow::new(start, end));
            self.breaks.sort_by_key(|w| w.start);
        }
        self
    }

    /// Breaks in ascending start order.
    pub fn breaks(&self) -> &[TimeWindow] {
        &self.breaks
    }

    /// Whether `time` falls inside a break.
    pub fn is_break(&self, time: Seconds) -> bool {
        self.breaks.iter().any(|b| b.contains(time))
    }

    /// First time at or after `from` that is not inside a break.
    ///
    /// Loops so that back-to-back breaks are skipped in one call.
    pub fn next_working_time(&self, from: Seconds) -> Seconds {
        let mut t = from;
        while let Some(b) = self.breaks.iter().find(|b| b.contains(t)) {
            t = b.end;
        }
        t
    }

    /// Places `duration` seconds of work starting at `start`.
    ///
    /// # Algorithm
    /// 1. Move `start` past any break containing it.
    /// 2. `end = start + duration`.
    /// 3. In one ascending pass, every break beginning in `[start, end)`
    ///    extends `end` by its full length. Because `end` grows during the
    ///    pass, a break reached only through an earlier extension is
    ///    covered too.
    pub fn apply(&self, start: Seconds, duration: Seconds) -> TimeWindow {
        let start = self.next_working_time(start);
        let mut end = start.saturating_add(duration);
        for b in &self.breaks {
            if b.start >= start && b.start < end {
                end = end.saturating_add(b.duration());
            }
        }
        TimeWindow::new(start, end)
    }

    /// Break time inside `[start, end)`.
    pub fn break_time_in_range(&self, start: Seconds, end: Seconds) -> Seconds {
        let range = TimeWindow::new(start, end);
        self.breaks
            .iter()
            .filter_map(|b| overlap_duration(&range, b))
            .sum()
    }
}

/// Computes overlap duration between two time windows.
fn overlap_duration(a: &TimeWindow, b: &TimeWindow) -> Option<Seconds> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    if end > start {
        Some(end - start)
    } else {
        None
    }
}
