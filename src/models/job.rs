//! Job (customer order) model.
//!
//! A job carries per-department quantities, recorded actual execution
//! ("tracks"), line assignments, manual start pins and locked plans.
//!
//! # Ownership
//! Tracks and locked plans change only through the recording helpers
//! (`record_start`, `record_end`, `undo_step`), which stand in for the
//! external mark/undo operations. The timeline computation reads jobs
//! and never mutates them.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::clock::{parse_hhmm, seconds_on, Seconds};
use super::timeline::TimelineItem;

/// Actual execution record of one process step.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepTrack {
    /// When the step was started.
    pub start: Option<NaiveDateTime>,
    /// When the step was finished.
    pub end: Option<NaiveDateTime>,
}

impl StepTrack {
    /// Whether anything was recorded.
    pub fn is_recorded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// A frozen plan for one department, taken when real work began.
///
/// Honored verbatim by the timeline even if it no longer fits the
/// current configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockedPlan {
    /// Planned start (seconds since midnight).
    pub start: Seconds,
    /// Planned end (seconds since midnight).
    pub end: Seconds,
    /// Line the plan was taken on. `None` = the job's current assignment.
    #[serde(default)]
    pub line: Option<usize>,
}

impl LockedPlan {
    /// Creates a locked plan without a line.
    pub fn new(start: Seconds, end: Seconds) -> Self {
        Self {
            start,
            end,
            line: None,
        }
    }

    /// Pins the plan to a line.
    pub fn on_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Snapshot of a computed timeline item.
    pub fn from_item(item: &TimelineItem) -> Self {
        Self::new(item.start, item.end).on_line(item.line)
    }
}

/// A job queued for a production date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Production date the job is queued for.
    pub date: NaiveDate,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Cutoff time of day (`HH:MM`), an earliest-start anchor.
    #[serde(default)]
    pub cut: Option<String>,
    /// Requested quantity per department.
    #[serde(default)]
    pub qty: HashMap<String, u32>,
    /// Actual execution per department, keyed by step id in recording order.
    #[serde(default)]
    pub tracks: HashMap<String, IndexMap<String, StepTrack>>,
    /// Line per department (default 0).
    #[serde(default)]
    pub line_assignment: HashMap<String, usize>,
    /// Operator-pinned start (`HH:MM`) per department.
    #[serde(default)]
    pub manual_start: HashMap<String, String>,
    /// Frozen plans per department.
    #[serde(default)]
    pub locked_plan: HashMap<String, LockedPlan>,
    /// Queue position within the date (ascending).
    #[serde(default)]
    pub order_index: i64,
}

impl Job {
    /// Creates an empty job for a date.
    pub fn new(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            date,
            name: String::new(),
            cut: None,
            qty: HashMap::new(),
            tracks: HashMap::new(),
            line_assignment: HashMap::new(),
            manual_start: HashMap::new(),
            locked_plan: HashMap::new(),
            order_index: 0,
        }
    }

    /// Sets the job name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the cut time (`HH:MM`).
    pub fn with_cut(mut self, cut: impl Into<String>) -> Self {
        self.cut = Some(cut.into());
        self
    }

    /// Sets the quantity for a department.
    pub fn with_qty(mut self, dept: impl Into<String>, qty: u32) -> Self {
        self.qty.insert(dept.into(), qty);
        self
    }

    /// Assigns the job to a line of a department.
    pub fn with_line(mut self, dept: impl Into<String>, line: usize) -> Self {
        self.line_assignment.insert(dept.into(), line);
        self
    }

    /// Pins the start of a department (`HH:MM`).
    pub fn with_manual_start(mut self, dept: impl Into<String>, at: impl Into<String>) -> Self {
        self.manual_start.insert(dept.into(), at.into());
        self
    }

    /// Sets a locked plan for a department.
    pub fn with_locked_plan(mut self, dept: impl Into<String>, plan: LockedPlan) -> Self {
        self.locked_plan.insert(dept.into(), plan);
        self
    }

    /// Sets the queue position.
    pub fn with_order_index(mut self, order_index: i64) -> Self {
        self.order_index = order_index;
        self
    }

    /// Sets a full track entry for a step.
    pub fn with_track(
        mut self,
        dept: impl Into<String>,
        step_id: impl Into<String>,
        track: StepTrack,
    ) -> Self {
        self.tracks
            .entry(dept.into())
            .or_default()
            .insert(step_id.into(), track);
        self
    }

    /// Raw quantity for a department (0 if absent).
    pub fn quantity(&self, dept: &str) -> u32 {
        self.qty.get(dept).copied().unwrap_or(0)
    }

    /// Cut time in seconds, `None` if the job has no cut.
    pub fn cut_secs(&self) -> Option<Seconds> {
        self.cut.as_deref().map(parse_hhmm)
    }

    /// Manual start for a department in seconds.
    pub fn manual_start_secs(&self, dept: &str) -> Option<Seconds> {
        self.manual_start.get(dept).map(|s| parse_hhmm(s))
    }

    /// Assigned line for a department (default 0).
    pub fn line(&self, dept: &str) -> usize {
        self.line_assignment.get(dept).copied().unwrap_or(0)
    }

    /// Recorded tracks of a department.
    pub fn tracks_for(&self, dept: &str) -> Option<&IndexMap<String, StepTrack>> {
        self.tracks.get(dept)
    }

    /// Track of one step.
    pub fn track(&self, dept: &str, step_id: &str) -> Option<&StepTrack> {
        self.tracks.get(dept).and_then(|t| t.get(step_id))
    }

    /// Whether any timestamp was recorded for a department.
    pub fn has_activity(&self, dept: &str) -> bool {
        self.tracks_for(dept)
            .is_some_and(|t| t.values().any(StepTrack::is_recorded))
    }

    /// Earliest recorded start of a department, in seconds on the job date.
    pub fn actual_start(&self, dept: &str) -> Option<Seconds> {
        self.tracks_for(dept)?
            .values()
            .filter_map(|t| t.start)
            .min()
            .map(|at| seconds_on(self.date, at))
    }

    /// Latest recorded end of a department, in seconds on the job date.
    ///
    /// Does not check completeness; see
    /// [`DependencyResolver::actual_finish`](crate::scheduler::DependencyResolver::actual_finish).
    pub fn latest_end(&self, dept: &str) -> Option<Seconds> {
        self.tracks_for(dept)?
            .values()
            .filter_map(|t| t.end)
            .max()
            .map(|at| seconds_on(self.date, at))
    }

    /// Records the start of a step.
    ///
    /// If this is the first timestamp of the department and `plan` is
    /// given, the plan is frozen into `locked_plan`. An existing lock is
    /// never replaced.
    pub fn record_start(
        &mut self,
        dept: &str,
        step_id: &str,
        at: NaiveDateTime,
        plan: Option<&TimelineItem>,
    ) {
        self.lock_if_first(dept, plan);
        self.tracks
            .entry(dept.to_string())
            .or_default()
            .entry(step_id.to_string())
            .or_default()
            .start = Some(at);
    }

    /// Records the end of a step. Locks like [`Job::record_start`].
    pub fn record_end(
        &mut self,
        dept: &str,
        step_id: &str,
        at: NaiveDateTime,
        plan: Option<&TimelineItem>,
    ) {
        self.lock_if_first(dept, plan);
        self.tracks
            .entry(dept.to_string())
            .or_default()
            .entry(step_id.to_string())
            .or_default()
            .end = Some(at);
    }

    /// Steps back one recorded timestamp of a step.
    ///
    /// Clears the end if set, otherwise the start. Once the department
    /// has no timestamps left its tracks and locked plan are removed.
    pub fn undo_step(&mut self, dept: &str, step_id: &str) {
        let Some(tracks) = self.tracks.get_mut(dept) else {
            return;
        };
        if let Some(track) = tracks.get_mut(step_id) {
            if track.end.is_some() {
                track.end = None;
            } else {
                track.start = None;
            }
            if !track.is_recorded() {
                tracks.shift_remove(step_id);
            }
        }
        if !self.has_activity(dept) {
            self.tracks.remove(dept);
            self.locked_plan.remove(dept);
        }
    }

    fn lock_if_first(&mut self, dept: &str, plan: Option<&TimelineItem>) {
        if self.has_activity(dept) || self.locked_plan.contains_key(dept) {
            return;
        }
        if let Some(item) = plan {
            self.locked_plan
                .insert(dept.to_string(), LockedPlan::from_item(item));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn item() -> TimelineItem {
        TimelineItem::new("J1", 36_300, 37_300, 1000, 1)
    }

    #[test]
    fn test_job_builder() {
        let job = Job::new("J1", date())
            .with_name("Order 1")
            .with_cut("10:00")
            .with_qty("STK", 5)
            .with_line("STK", 1)
            .with_manual_start("STK", "08:00")
            .with_order_index(3);

        assert_eq!(job.quantity("STK"), 5);
        assert_eq!(job.quantity("QC"), 0);
        assert_eq!(job.cut_secs(), Some(36_000));
        assert_eq!(job.manual_start_secs("STK"), Some(28_800));
        assert_eq!(job.manual_start_secs("QC"), None);
        assert_eq!(job.line("STK"), 1);
        assert_eq!(job.line("QC"), 0);
        assert_eq!(job.order_index, 3);
    }

    #[test]
    fn test_no_cut() {
        assert_eq!(Job::new("J1", date()).cut_secs(), None);
    }

    #[test]
    fn test_actual_times() {
        let mut job = Job::new("J1", date());
        job.record_start("STK", "load", at(10, 0), None);
        job.record_end("STK", "load", at(10, 20), None);
        job.record_start("STK", "press", at(10, 5), None);

        assert!(job.has_activity("STK"));
        assert_eq!(job.actual_start("STK"), Some(36_000));
        assert_eq!(job.latest_end("STK"), Some(37_200));
        assert_eq!(job.actual_start("QC"), None);
    }

    #[test]
    fn test_imported_track_counts_as_activity() {
        let track = StepTrack {
            start: Some(at(8, 0)),
            end: None,
        };
        let job = Job::new("J1", date()).with_track("STK", "press", track);
        assert!(job.has_activity("STK"));
        assert_eq!(job.track("STK", "press"), Some(&track));
        assert_eq!(job.actual_start("STK"), Some(28_800));
        assert_eq!(job.latest_end("STK"), None);
    }

    #[test]
    fn test_first_timestamp_locks_plan() {
        let mut job = Job::new("J1", date());
        job.record_start("STK", "load", at(10, 0), Some(&item()));
        assert_eq!(
            job.locked_plan.get("STK"),
            Some(&LockedPlan::new(36_300, 37_300).on_line(1))
        );

        // Later recordings keep the original lock.
        let later = TimelineItem::new("J1", 40_000, 41_000, 1000, 0);
        job.record_end("STK", "load", at(10, 10), Some(&later));
        assert_eq!(job.locked_plan["STK"].start, 36_300);
    }

    #[test]
    fn test_undo_clears_lock_when_empty() {
        let mut job = Job::new("J1", date());
        job.record_start("STK", "load", at(10, 0), Some(&item()));
        job.record_end("STK", "load", at(10, 10), None);

        job.undo_step("STK", "load");
        assert!(job.track("STK", "load").unwrap().end.is_none());
        assert!(job.locked_plan.contains_key("STK"));

        job.undo_step("STK", "load");
        assert!(!job.has_activity("STK"));
        assert!(job.tracks_for("STK").is_none());
        assert!(!job.locked_plan.contains_key("STK"));
    }

    #[test]
    fn test_undo_unknown_is_noop() {
        let mut job = Job::new("J1", date());
        job.undo_step("STK", "load");
        assert!(job.tracks.is_empty());
    }

    #[test]
    fn test_json_defaults() {
        let job: Job = serde_json::from_str(
            r#"{"id": "J9", "date": "2024-03-01", "qty": {"STK": 2}}"#,
        )
        .unwrap();
        assert_eq!(job.quantity("STK"), 2);
        assert!(job.cut.is_none());
        assert_eq!(job.order_index, 0);
        assert!(job.locked_plan.is_empty());
    }
}
