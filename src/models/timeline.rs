//! Timeline (solution) model.
//!
//! A timeline item is the planned window of one job in one department.
//! Already-computed departments are handed to later computations through
//! [`PrecomputedTimelines`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::clock::{format_hhmm, Seconds};

/// Planned window of one job on one line of a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Job identifier.
    pub job_id: String,
    /// Planned start (seconds since midnight).
    pub start: Seconds,
    /// Planned end, breaks included.
    pub end: Seconds,
    /// Working duration, breaks excluded.
    pub duration: Seconds,
    /// Line the job runs on.
    pub line: usize,
}

impl TimelineItem {
    /// Creates a timeline item.
    pub fn new(
        job_id: impl Into<String>,
        start: Seconds,
        end: Seconds,
        duration: Seconds,
        line: usize,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            start,
            end,
            duration,
            line,
        }
    }

    /// Elapsed wall-clock span (end - start).
    #[inline]
    pub fn span(&self) -> Seconds {
        self.end - self.start
    }

    /// `HH:MM-HH:MM` rendering.
    pub fn window_label(&self) -> String {
        format!("{}-{}", format_hhmm(self.start), format_hhmm(self.end))
    }
}

/// Computed timelines of departments, keyed by department.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputedTimelines {
    by_dept: HashMap<String, Vec<TimelineItem>>,
}

impl PrecomputedTimelines {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) a department's timeline.
    pub fn insert(&mut self, dept: impl Into<String>, items: Vec<TimelineItem>) {
        self.by_dept.insert(dept.into(), items);
    }

    /// Builder form of [`PrecomputedTimelines::insert`].
    pub fn with(mut self, dept: impl Into<String>, items: Vec<TimelineItem>) -> Self {
        self.insert(dept, items);
        self
    }

    /// Whether a department has been computed.
    pub fn contains(&self, dept: &str) -> bool {
        self.by_dept.contains_key(dept)
    }

    /// Timeline of a department.
    pub fn timeline(&self, dept: &str) -> Option<&[TimelineItem]> {
        self.by_dept.get(dept).map(Vec::as_slice)
    }

    /// Planned item of a job in a department.
    pub fn item(&self, dept: &str, job_id: &str) -> Option<&TimelineItem> {
        self.timeline(dept)?.iter().find(|i| i.job_id == job_id)
    }

    /// Planned start of a job in a department.
    pub fn planned_start(&self, dept: &str, job_id: &str) -> Option<Seconds> {
        self.item(dept, job_id).map(|i| i.start)
    }

    /// Planned end of a job in a department.
    pub fn planned_end(&self, dept: &str, job_id: &str) -> Option<Seconds> {
        self.item(dept, job_id).map(|i| i.end)
    }

    /// Computed department names.
    pub fn departments(&self) -> impl Iterator<Item = &str> {
        self.by_dept.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_span_and_label() {
        let item = TimelineItem::new("J1", 36_300, 37_300, 1000, 0);
        assert_eq!(item.span(), 1000);
        assert_eq!(item.window_label(), "10:05-10:21");
    }

    #[test]
    fn test_precomputed_lookup() {
        let pre = PrecomputedTimelines::new().with(
            "MAT",
            vec![
                TimelineItem::new("J1", 100, 200, 100, 0),
                TimelineItem::new("J2", 200, 500, 300, 0),
            ],
        );
        assert!(pre.contains("MAT"));
        assert!(!pre.contains("STK"));
        assert_eq!(pre.planned_end("MAT", "J2"), Some(500));
        assert_eq!(pre.planned_start("MAT", "J1"), Some(100));
        assert_eq!(pre.planned_end("MAT", "J3"), None);
        assert_eq!(pre.planned_end("STK", "J1"), None);
    }
}
