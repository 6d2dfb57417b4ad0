//! Whole-day planning over a configuration/job snapshot.
//!
//! Runs [`compute_timeline`] for every department in dependency order,
//! feeding each result forward, and hands one [`DayPlan`] to every
//! consumer: the planning board reads whole department timelines, a
//! work-queue screen reads one line of one department.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::dependency::DependencyGraph;
use super::timeline::compute_timeline;
use crate::error::Result;
use crate::models::{Job, PlantConfig, PrecomputedTimelines, TimelineItem};

/// Read-only inputs the planner needs from its collaborators.
pub trait SnapshotSource {
    /// Current plant configuration.
    fn configuration(&self) -> &PlantConfig;

    /// Jobs; may contain other dates, which the computation filters out.
    fn jobs(&self, date: NaiveDate) -> &[Job];
}

/// In-memory snapshot of configuration and jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Plant configuration.
    #[serde(default)]
    pub config: PlantConfig,
    /// All known jobs.
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl Snapshot {
    /// Creates a snapshot.
    pub fn new(config: PlantConfig, jobs: Vec<Job>) -> Self {
        Self { config, jobs }
    }

    /// Parses a snapshot from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a snapshot from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

impl SnapshotSource for Snapshot {
    fn configuration(&self) -> &PlantConfig {
        &self.config
    }

    fn jobs(&self, _date: NaiveDate) -> &[Job] {
        &self.jobs
    }
}

/// Computed timelines of every department for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Production date.
    pub date: NaiveDate,
    /// Departments in the order they were computed.
    pub order: Vec<String>,
    timelines: PrecomputedTimelines,
}

impl DayPlan {
    /// Timeline of a department in queue order (empty if unknown).
    pub fn timeline(&self, dept: &str) -> &[TimelineItem] {
        self.timelines.timeline(dept).unwrap_or(&[])
    }

    /// Planned item of a job in a department.
    pub fn item(&self, dept: &str, job_id: &str) -> Option<&TimelineItem> {
        self.timelines.item(dept, job_id)
    }

    /// Items of one line, ordered by start.
    pub fn line_queue(&self, dept: &str, line: usize) -> Vec<&TimelineItem> {
        let mut items: Vec<&TimelineItem> = self
            .timeline(dept)
            .iter()
            .filter(|i| i.line == line)
            .collect();
        items.sort_by_key(|i| i.start);
        items
    }

    /// All timelines, for handing to later computations.
    pub fn precomputed(&self) -> &PrecomputedTimelines {
        &self.timelines
    }

    /// Consumes the plan, returning its timelines.
    pub fn into_precomputed(self) -> PrecomputedTimelines {
        self.timelines
    }
}

/// Plans whole days for a snapshot source.
///
/// The computation order is derived once from the configuration's
/// department roles.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_lineplan::models::{DepartmentRoles, Job, PlantConfig, ProcessStep};
/// use u_lineplan::scheduler::{DayPlanner, Snapshot};
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let config = PlantConfig::new()
///     .with_department("PACK", vec![ProcessStep::fixed("box", 300)])
///     .with_department("QC", vec![ProcessStep::per_piece("inspect", 20)])
///     .with_roles(DepartmentRoles::standard());
/// let snapshot = Snapshot::new(config, vec![Job::new("J1", date).with_qty("PACK", 3)]);
///
/// let planner = DayPlanner::new(&snapshot).unwrap();
/// assert_eq!(planner.order(), &["QC".to_string(), "PACK".to_string()]);
/// let plan = planner.plan(date);
/// assert_eq!(plan.timeline("PACK").len(), 1);
/// ```
#[derive(Debug)]
pub struct DayPlanner<'a, S: SnapshotSource + ?Sized> {
    source: &'a S,
    order: Vec<String>,
}

impl<'a, S: SnapshotSource + ?Sized> DayPlanner<'a, S> {
    /// Creates a planner, deriving the computation order.
    ///
    /// # Errors
    /// [`PlanError::CyclicDependency`](crate::error::PlanError::CyclicDependency)
    /// if the department roles form a cycle.
    pub fn new(source: &'a S) -> Result<Self> {
        let order = DependencyGraph::from_config(source.configuration()).computation_order()?;
        debug!(?order, "computation order");
        Ok(Self { source, order })
    }

    /// Departments in computation order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Computes every department for `date`.
    pub fn plan(&self, date: NaiveDate) -> DayPlan {
        let config = self.source.configuration();
        let jobs = self.source.jobs(date);
        let mut timelines = PrecomputedTimelines::new();
        for dept in &self.order {
            let items = compute_timeline(dept, date, config, jobs, &timelines);
            timelines.insert(dept.clone(), items);
        }
        info!(%date, departments = self.order.len(), "day planned");
        DayPlan {
            date,
            order: self.order.clone(),
            timelines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::models::{DepartmentRoles, ProcessStep};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn config() -> PlantConfig {
        // Display order deliberately differs from dependency order.
        PlantConfig::new()
            .with_day("09:00", "18:00")
            .with_department("PACK", vec![ProcessStep::fixed("box", 300)])
            .with_department("QC", vec![ProcessStep::per_piece("inspect", 20)])
            .with_department("STK", vec![ProcessStep::per_piece("press", 60)])
            .with_department("MAT", vec![ProcessStep::per_piece("cut", 30)])
            .with_lines("STK", 2)
            .with_roles(DepartmentRoles::standard())
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            config(),
            vec![
                Job::new("J1", date()).with_qty("STK", 4).with_qty("PACK", 4),
                Job::new("J2", date())
                    .with_qty("STK", 2)
                    .with_qty("PACK", 2)
                    .with_line("STK", 1)
                    .with_order_index(1),
                Job::new("J3", date().succ_opt().unwrap()).with_qty("STK", 9),
            ],
        )
    }

    #[test]
    fn test_order_follows_dependencies() {
        let snap = snapshot();
        let planner = DayPlanner::new(&snap).unwrap();
        assert_eq!(planner.order(), &["MAT", "STK", "QC", "PACK"].map(String::from));
    }

    #[test]
    fn test_plan_matches_manual_chain() {
        let snap = snapshot();
        let plan = DayPlanner::new(&snap).unwrap().plan(date());

        let mut pre = PrecomputedTimelines::new();
        for dept in ["MAT", "STK", "QC", "PACK"] {
            let items = compute_timeline(dept, date(), &snap.config, &snap.jobs, &pre);
            pre.insert(dept, items);
        }
        for dept in ["MAT", "STK", "QC", "PACK"] {
            assert_eq!(plan.timeline(dept), pre.timeline(dept).unwrap());
        }
        assert!(plan.timeline("STK").iter().all(|i| i.job_id != "J3"));
        assert_eq!(plan.into_precomputed(), pre);
    }

    #[test]
    fn test_line_queue() {
        let snap = snapshot();
        let plan = DayPlanner::new(&snap).unwrap().plan(date());
        let line1 = plan.line_queue("STK", 1);
        assert_eq!(line1.len(), 1);
        assert_eq!(line1[0].job_id, "J2");
        assert!(plan.line_queue("STK", 5).is_empty());
        assert!(plan.timeline("NOPE").is_empty());
    }

    #[test]
    fn test_downstream_after_upstream() {
        let snap = snapshot();
        let plan = DayPlanner::new(&snap).unwrap().plan(date());
        for job in ["J1", "J2"] {
            let stk = plan.item("STK", job).unwrap();
            let mat = plan.item("MAT", job).unwrap();
            let qc = plan.item("QC", job).unwrap();
            let pack = plan.item("PACK", job).unwrap();
            assert!(stk.start >= mat.end + 300);
            assert!(qc.end >= stk.end);
            assert!(pack.end >= qc.end + 300);
        }
    }

    #[test]
    fn test_cyclic_roles_rejected() {
        let roles = DepartmentRoles {
            intake: Some("PACK".into()),
            ..DepartmentRoles::standard()
        };
        let snap = Snapshot::new(config().with_roles(roles), vec![]);
        assert!(matches!(
            DayPlanner::new(&snap),
            Err(PlanError::CyclicDependency(_))
        ));
    }

    #[test]
    fn test_snapshot_from_json() {
        let json = r#"{
            "config": {
                "day_start": "08:00",
                "departments": ["STK"],
                "processes": {"STK": [{"id": "press", "kind": "PER_PIECE", "value": 60}]}
            },
            "jobs": [
                {"id": "J1", "date": "2024-03-01", "qty": {"STK": 5}, "cut": "08:30"}
            ]
        }"#;
        let snap = Snapshot::from_json_str(json).unwrap();
        let plan = DayPlanner::new(&snap).unwrap().plan(date());
        let item = plan.item("STK", "J1").unwrap();
        assert_eq!(item.start, 30_600);
        assert_eq!(item.end, 30_900);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Snapshot::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, PlanError::Io(_)));
    }
}
