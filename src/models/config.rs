//! Plant configuration model.
//!
//! Describes departments, their ordered process steps, prep floors,
//! breaks and line counts, plus the role assignments the dependency
//! rules are written against.
//!
//! # Defaults
//! Every per-department lookup tolerates a missing entry: no steps,
//! zero prep, no breaks, one line.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::calendar::BreakCalendar;
use super::clock::{parse_hhmm, Seconds, BUFFER_SECS};
use crate::error::Result;

/// How a process step's cost scales.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    /// `value` seconds for every piece.
    #[default]
    PerPiece,
    /// `value` seconds once per job.
    Fixed,
}

/// One timed step of a department's workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessStep {
    /// Stable identifier; job tracks are keyed by it.
    pub id: String,
    /// Display name. Free to change without orphaning tracks.
    #[serde(default)]
    pub name: String,
    /// Cost model.
    #[serde(default)]
    pub kind: StepKind,
    /// Cost in seconds (per piece or fixed).
    #[serde(default)]
    pub value: Seconds,
}

impl ProcessStep {
    /// Creates a per-piece step whose name equals its id.
    pub fn per_piece(id: impl Into<String>, secs_per_piece: Seconds) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind: StepKind::PerPiece,
            value: secs_per_piece,
        }
    }

    /// Creates a fixed-cost step whose name equals its id.
    pub fn fixed(id: impl Into<String>, secs: Seconds) -> Self {
        Self {
            kind: StepKind::Fixed,
            ..Self::per_piece(id, secs)
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name for display, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Cost of this step for `quantity` pieces.
    #[inline]
    pub fn cost(&self, quantity: u32) -> Seconds {
        match self.kind {
            StepKind::PerPiece => self.value.saturating_mul(Seconds::from(quantity)),
            StepKind::Fixed => self.value,
        }
    }
}

/// A configured break, as `HH:MM` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreakSpec {
    /// Break start (`HH:MM`).
    pub start: String,
    /// Break end (`HH:MM`).
    pub end: String,
}

impl BreakSpec {
    /// Creates a break spec.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Which department plays which part in the fixed precedence rules.
///
/// A role left unset turns off every rule that mentions it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DepartmentRoles {
    /// Material-prep department feeding the production streams.
    pub intake: Option<String>,
    /// Primary production streams fed by intake (e.g. stamping, laser-cut).
    pub streams: Vec<String>,
    /// Final quality control, fed by every other producing department.
    pub final_qc: Option<String>,
    /// Packing, fed by final QC.
    pub packing: Option<String>,
    /// Departments that may not start before the job's cut time plus buffer.
    pub delay: Vec<String>,
    /// Gap between an upstream event and a gated start (seconds).
    pub buffer_secs: Seconds,
}

impl Default for DepartmentRoles {
    fn default() -> Self {
        Self {
            intake: None,
            streams: Vec::new(),
            final_qc: None,
            packing: None,
            delay: Vec::new(),
            buffer_secs: BUFFER_SECS,
        }
    }
}

impl DepartmentRoles {
    /// The conventional plant layout: `MAT` feeds `STK` and `LASER`,
    /// everything converges on `QC`, then `PACK`.
    pub fn standard() -> Self {
        Self {
            intake: Some("MAT".into()),
            streams: vec!["STK".into(), "LASER".into()],
            final_qc: Some("QC".into()),
            packing: Some("PACK".into()),
            delay: vec!["STK".into(), "LASER".into()],
            buffer_secs: BUFFER_SECS,
        }
    }

    /// Whether `dept` is the intake department.
    pub fn is_intake(&self, dept: &str) -> bool {
        self.intake.as_deref() == Some(dept)
    }

    /// Whether `dept` is final QC.
    pub fn is_final_qc(&self, dept: &str) -> bool {
        self.final_qc.as_deref() == Some(dept)
    }

    /// Whether `dept` is packing.
    pub fn is_packing(&self, dept: &str) -> bool {
        self.packing.as_deref() == Some(dept)
    }

    /// Whether `dept` is a primary production stream.
    pub fn is_stream(&self, dept: &str) -> bool {
        self.streams.iter().any(|s| s == dept)
    }

    /// Whether `dept` is gated by the job's cut time.
    pub fn is_delay(&self, dept: &str) -> bool {
        self.delay.iter().any(|s| s == dept)
    }

    /// Flow departments chain on actual finishes of the previous job on a line.
    pub fn is_flow(&self, dept: &str) -> bool {
        self.is_final_qc(dept) || self.is_stream(dept)
    }

    /// Every department name mentioned by a role.
    pub fn named_departments(&self) -> Vec<&str> {
        self.intake
            .iter()
            .chain(&self.final_qc)
            .chain(&self.packing)
            .chain(&self.streams)
            .chain(&self.delay)
            .map(String::as_str)
            .collect()
    }
}

/// Full plant configuration.
///
/// `departments` order is the display order, not the computation order
/// (see [`DependencyGraph`](crate::scheduler::DependencyGraph)).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlantConfig {
    /// Workday start (`HH:MM`). Seeds every line cursor.
    pub day_start: String,
    /// Workday end (`HH:MM`). Display bound only.
    pub day_end: String,
    /// Departments in display order.
    pub departments: Vec<String>,
    /// Ordered process steps per department.
    pub processes: HashMap<String, Vec<ProcessStep>>,
    /// Minimum minutes per job per department (floor, not additive).
    pub prep_per_job: HashMap<String, i64>,
    /// Break intervals per department.
    pub breaks: HashMap<String, Vec<BreakSpec>>,
    /// Parallel line count per department.
    pub lines_per_dept: HashMap<String, usize>,
    /// Role assignments for the dependency rules.
    pub roles: DepartmentRoles,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            day_start: "09:00".into(),
            day_end: "18:00".into(),
            departments: Vec::new(),
            processes: HashMap::new(),
            prep_per_job: HashMap::new(),
            breaks: HashMap::new(),
            lines_per_dept: HashMap::new(),
            roles: DepartmentRoles::default(),
        }
    }
}

impl PlantConfig {
    /// Creates an empty configuration with a 09:00-18:00 day.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the workday bounds.
    pub fn with_day(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.day_start = start.into();
        self.day_end = end.into();
        self
    }

    /// Appends a department with its process steps.
    pub fn with_department(mut self, dept: impl Into<String>, steps: Vec<ProcessStep>) -> Self {
        let dept = dept.into();
        self.processes.insert(dept.clone(), steps);
        self.departments.push(dept);
        self
    }

    /// Sets the prep floor (minutes) of a department.
    pub fn with_prep(mut self, dept: impl Into<String>, minutes: i64) -> Self {
        self.prep_per_job.insert(dept.into(), minutes);
        self
    }

    /// Adds a break to a department.
    pub fn with_break(
        mut self,
        dept: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        self.breaks
            .entry(dept.into())
            .or_default()
            .push(BreakSpec::new(start, end));
        self
    }

    /// Sets the line count of a department.
    pub fn with_lines(mut self, dept: impl Into<String>, lines: usize) -> Self {
        self.lines_per_dept.insert(dept.into(), lines);
        self
    }

    /// Sets the role assignments.
    pub fn with_roles(mut self, roles: DepartmentRoles) -> Self {
        self.roles = roles;
        self
    }

    /// Workday start in seconds (0 if unparseable).
    pub fn day_start_secs(&self) -> Seconds {
        parse_hhmm(&self.day_start)
    }

    /// Workday end in seconds (0 if unparseable).
    pub fn day_end_secs(&self) -> Seconds {
        parse_hhmm(&self.day_end)
    }

    /// Process steps of a department (empty if unconfigured).
    pub fn steps(&self, dept: &str) -> &[ProcessStep] {
        self.processes.get(dept).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Finds a step by id.
    pub fn step(&self, dept: &str, step_id: &str) -> Option<&ProcessStep> {
        self.steps(dept).iter().find(|s| s.id == step_id)
    }

    /// Prep floor in seconds (0 if unconfigured or negative).
    pub fn prep_floor_secs(&self, dept: &str) -> Seconds {
        self.prep_per_job.get(dept).copied().unwrap_or(0).max(0).saturating_mul(60)
    }

    /// Break calendar of a department.
    pub fn break_calendar(&self, dept: &str) -> BreakCalendar {
        self.breaks
            .get(dept)
            .map(|specs| BreakCalendar::from_specs(specs))
            .unwrap_or_default()
    }

    /// Line count, clamped to at least 1.
    pub fn line_count(&self, dept: &str) -> usize {
        self.lines_per_dept.get(dept).copied().unwrap_or(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_cost() {
        assert_eq!(ProcessStep::per_piece("press", 10).cost(5), 50);
        assert_eq!(ProcessStep::fixed("setup", 180).cost(5), 180);
        assert_eq!(ProcessStep::fixed("setup", 180).cost(0), 180);
        assert_eq!(ProcessStep::per_piece("huge", i64::MAX).cost(3), i64::MAX);
    }

    #[test]
    fn test_step_display_name() {
        let step = ProcessStep::per_piece("p1", 10).with_name("Press");
        assert_eq!(step.display_name(), "Press");
        let mut unnamed = ProcessStep::per_piece("p2", 10);
        unnamed.name.clear();
        assert_eq!(unnamed.display_name(), "p2");
    }

    #[test]
    fn test_missing_entries_default() {
        let cfg = PlantConfig::new().with_department("STK", vec![]);
        assert!(cfg.steps("NOPE").is_empty());
        assert_eq!(cfg.prep_floor_secs("NOPE"), 0);
        assert!(cfg.break_calendar("NOPE").breaks().is_empty());
        assert_eq!(cfg.line_count("NOPE"), 1);
    }

    #[test]
    fn test_workday_bounds() {
        let cfg = PlantConfig::new();
        assert_eq!(cfg.day_start_secs(), 32_400);
        assert_eq!(cfg.day_end_secs(), 64_800);

        let cfg = cfg.with_day("07:30", "late");
        assert_eq!(cfg.day_start_secs(), 27_000);
        assert_eq!(cfg.day_end_secs(), 0);
    }

    #[test]
    fn test_line_count_clamped() {
        let cfg = PlantConfig::new().with_lines("STK", 0);
        assert_eq!(cfg.line_count("STK"), 1);
    }

    #[test]
    fn test_roles() {
        let roles = DepartmentRoles::standard();
        assert!(roles.is_intake("MAT"));
        assert!(roles.is_flow("STK"));
        assert!(roles.is_flow("QC"));
        assert!(!roles.is_flow("PACK"));
        assert!(roles.is_delay("LASER"));
        assert_eq!(roles.buffer_secs, 300);
    }

    #[test]
    fn test_from_json_with_defaults() {
        let json = r#"{
            "day_start": "09:30",
            "departments": ["STK"],
            "processes": {
                "STK": [
                    {"id": "load", "kind": "PER_PIECE", "value": 10},
                    {"id": "setup", "name": "Die setup", "kind": "FIXED", "value": 180}
                ]
            },
            "roles": {"delay": ["STK"]}
        }"#;
        let cfg = PlantConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.day_start_secs(), 34_200);
        assert_eq!(cfg.day_end, "18:00");
        assert_eq!(cfg.steps("STK").len(), 2);
        assert_eq!(cfg.steps("STK")[1].kind, StepKind::Fixed);
        assert_eq!(cfg.roles.buffer_secs, 300);
        assert!(cfg.roles.is_delay("STK"));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(PlantConfig::from_json_str("{ not json").is_err());
    }
}
