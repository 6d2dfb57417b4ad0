//! Department precedence rules.
//!
//! The rules are fixed, written against [`DepartmentRoles`]:
//!
//! | Department | Earliest start | End stretched to cover |
//! |------------|----------------|------------------------|
//! | stream | intake finish + buffer | - |
//! | final QC | earliest upstream finish + buffer | latest upstream finish + standard duration |
//! | packing | QC start + buffer | QC finish + buffer |
//! | delay | cut + buffer | - |
//!
//! Finish and start lookups prefer the job's recorded actuals over the
//! computed plan of the upstream department.
//!
//! [`DependencyGraph`] exposes the same rules as edges so callers can
//! derive a valid computation order and detect stale inputs.

use std::collections::{HashMap, HashSet};

use super::duration::effective_quantity;
use super::status::{job_status_for_dept, StatusKey};
use crate::error::{PlanError, Result};
use crate::models::{DepartmentRoles, Job, PlantConfig, PrecomputedTimelines, Seconds};

/// Start and working duration after dependency gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    /// Earliest start (before break adjustment).
    pub start: Seconds,
    /// Working duration, possibly stretched beyond the standard one.
    pub duration: Seconds,
}

/// Applies the precedence rules for one job.
///
/// Reads upstream plans from `precomputed`; never computes them itself.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    config: &'a PlantConfig,
    precomputed: &'a PrecomputedTimelines,
}

impl<'a> DependencyResolver<'a> {
    /// Creates a resolver over a configuration and computed upstream timelines.
    pub fn new(config: &'a PlantConfig, precomputed: &'a PrecomputedTimelines) -> Self {
        Self {
            config,
            precomputed,
        }
    }

    /// Recorded finish of a department, once every step is done.
    pub fn actual_finish(&self, job: &Job, dept: &str) -> Option<Seconds> {
        if job_status_for_dept(job, dept, self.config).key == StatusKey::Done {
            job.latest_end(dept)
        } else {
            None
        }
    }

    /// Finish of a department: actual if recorded, else planned.
    pub fn finish_time(&self, job: &Job, dept: &str) -> Option<Seconds> {
        self.actual_finish(job, dept)
            .or_else(|| self.precomputed.planned_end(dept, &job.id))
    }

    /// Start of a department: actual if recorded, else planned.
    pub fn start_time(&self, job: &Job, dept: &str) -> Option<Seconds> {
        job.actual_start(dept)
            .or_else(|| self.precomputed.planned_start(dept, &job.id))
    }

    /// Departments feeding final QC for this job.
    pub fn qc_upstream<'j>(&'j self, job: &'j Job) -> impl Iterator<Item = &'a str> + 'j {
        let config: &'a PlantConfig = self.config;
        config
            .departments
            .iter()
            .map(String::as_str)
            .filter(move |d| !config.roles.is_final_qc(d) && !config.roles.is_packing(d))
            .filter(move |d| effective_quantity(job, d, config) > 0)
    }

    /// Raises `base` and stretches `standard` per the rules of `dept`.
    ///
    /// The cut-time rule is applied by the caller, since it runs before
    /// a manual pin is considered.
    pub fn gate(&self, job: &Job, dept: &str, base: Seconds, standard: Seconds) -> Gate {
        let roles = &self.config.roles;
        let buffer = roles.buffer_secs;
        let mut start = base;
        let mut duration = standard;

        if roles.is_stream(dept) {
            if let Some(finish) = roles
                .intake
                .as_deref()
                .and_then(|intake| self.finish_time(job, intake))
            {
                start = start.max(finish.saturating_add(buffer));
            }
        }

        if roles.is_final_qc(dept) {
            let finishes: Vec<Seconds> = self
                .qc_upstream(job)
                .filter_map(|d| self.finish_time(job, d))
                .collect();
            if let (Some(&first), Some(&last)) = (finishes.iter().min(), finishes.iter().max()) {
                start = start.max(first.saturating_add(buffer));
                duration = duration.max(last.saturating_add(standard) - start);
            }
        }

        if roles.is_packing(dept) {
            if let Some(qc) = roles.final_qc.as_deref() {
                if let Some(qc_start) = self.start_time(job, qc) {
                    start = start.max(qc_start.saturating_add(buffer));
                }
                if let Some(qc_finish) = self.finish_time(job, qc) {
                    duration = duration.max(qc_finish.saturating_add(buffer) - start);
                }
            }
        }

        Gate { start, duration }
    }
}

/// Upstream edges between departments implied by the roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    departments: Vec<String>,
    upstream: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Builds the graph over the configured departments.
    ///
    /// Edges: intake -> each stream; every department other than QC and
    /// packing -> QC; QC -> packing. Roles naming unconfigured
    /// departments contribute no edges.
    pub fn from_config(config: &PlantConfig) -> Self {
        Self::from_roles(&config.departments, &config.roles)
    }

    /// Builds the graph from a department list and roles.
    pub fn from_roles(departments: &[String], roles: &DepartmentRoles) -> Self {
        let known: HashSet<&str> = departments.iter().map(String::as_str).collect();
        let mut upstream: HashMap<String, Vec<String>> = HashMap::new();
        let mut add = |from: &str, to: &str| {
            if known.contains(from) && known.contains(to) {
                let list = upstream.entry(to.to_string()).or_default();
                if !list.iter().any(|d| d == from) {
                    list.push(from.to_string());
                }
            }
        };

        if let Some(intake) = roles.intake.as_deref() {
            for stream in &roles.streams {
                add(intake, stream.as_str());
            }
        }
        if let Some(qc) = roles.final_qc.as_deref() {
            for dept in departments {
                if !roles.is_final_qc(dept) && !roles.is_packing(dept) {
                    add(dept.as_str(), qc);
                }
            }
            if let Some(packing) = roles.packing.as_deref() {
                add(qc, packing);
            }
        }

        let mut seen = HashSet::new();
        Self {
            departments: departments
                .iter()
                .filter(|d| seen.insert(d.as_str()))
                .cloned()
                .collect(),
            upstream,
        }
    }

    /// Direct upstream departments of `dept`.
    pub fn upstream(&self, dept: &str) -> &[String] {
        self.upstream.get(dept).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Topological computation order.
    ///
    /// Ties are broken by configured department order, so a graph
    /// without edges yields the display order unchanged.
    ///
    /// # Errors
    /// [`PlanError::CyclicDependency`] if the roles form a cycle.
    pub fn computation_order(&self) -> Result<Vec<String>> {
        let mut done: HashSet<&str> = HashSet::new();
        let mut order = Vec::with_capacity(self.departments.len());

        while order.len() < self.departments.len() {
            let next = self.departments.iter().find(|d| {
                !done.contains(d.as_str())
                    && self.upstream(d).iter().all(|u| done.contains(u.as_str()))
            });
            match next {
                Some(dept) => {
                    done.insert(dept.as_str());
                    order.push(dept.clone());
                }
                None => {
                    let stuck = self
                        .departments
                        .iter()
                        .find(|d| !done.contains(d.as_str()))
                        .cloned()
                        .unwrap_or_default();
                    return Err(PlanError::CyclicDependency(stuck));
                }
            }
        }

        Ok(order)
    }

    /// Upstream departments of `dept` not yet present in `precomputed`.
    pub fn missing_upstream(&self, dept: &str, precomputed: &PrecomputedTimelines) -> Vec<String> {
        self.upstream(dept)
            .iter()
            .filter(|u| !precomputed.contains(u))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProcessStep, TimelineItem};
    use chrono::{NaiveDate, NaiveDateTime};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn config() -> PlantConfig {
        PlantConfig::new()
            .with_department("MAT", vec![ProcessStep::per_piece("cut", 10)])
            .with_department("STK", vec![ProcessStep::per_piece("press", 100)])
            .with_department("LASER", vec![ProcessStep::per_piece("burn", 100)])
            .with_department("QC", vec![ProcessStep::per_piece("inspect", 20)])
            .with_department("PACK", vec![ProcessStep::per_piece("box", 10)])
            .with_roles(DepartmentRoles::standard())
    }

    fn job() -> Job {
        Job::new("J1", date())
            .with_qty("STK", 5)
            .with_qty("LASER", 3)
            .with_qty("PACK", 8)
    }

    fn item(start: Seconds, end: Seconds) -> Vec<TimelineItem> {
        vec![TimelineItem::new("J1", start, end, end - start, 0)]
    }

    #[test]
    fn test_stream_gated_by_intake_plan() {
        let cfg = config();
        let pre = PrecomputedTimelines::new().with("MAT", item(34_200, 35_000));
        let gate = DependencyResolver::new(&cfg, &pre).gate(&job(), "STK", 34_200, 500);
        assert_eq!(gate, Gate { start: 35_300, duration: 500 });
    }

    #[test]
    fn test_actual_finish_overrides_plan() {
        let cfg = config();
        let pre = PrecomputedTimelines::new().with("MAT", item(34_200, 35_000));
        let mut j = job();
        j.record_start("MAT", "cut", at(9, 30), None);
        j.record_end("MAT", "cut", at(10, 0), None);

        let resolver = DependencyResolver::new(&cfg, &pre);
        assert_eq!(resolver.actual_finish(&j, "MAT"), Some(36_000));
        assert_eq!(resolver.gate(&j, "STK", 34_200, 500).start, 36_300);
    }

    #[test]
    fn test_unfinished_actual_falls_back_to_plan() {
        let cfg = config();
        let pre = PrecomputedTimelines::new().with("MAT", item(34_200, 35_000));
        let mut j = job();
        j.record_start("MAT", "cut", at(9, 30), None);

        let resolver = DependencyResolver::new(&cfg, &pre);
        assert_eq!(resolver.actual_finish(&j, "MAT"), None);
        assert_eq!(resolver.finish_time(&j, "MAT"), Some(35_000));
    }

    #[test]
    fn test_no_intake_no_gate() {
        let cfg = config();
        let pre = PrecomputedTimelines::new();
        let gate = DependencyResolver::new(&cfg, &pre).gate(&job(), "STK", 34_200, 500);
        assert_eq!(gate, Gate { start: 34_200, duration: 500 });
    }

    #[test]
    fn test_qc_starts_after_first_and_covers_last() {
        let cfg = config();
        let pre = PrecomputedTimelines::new()
            .with("MAT", item(34_200, 34_800))
            .with("STK", item(35_100, 36_000))
            .with("LASER", item(35_100, 40_000));
        let resolver = DependencyResolver::new(&cfg, &pre);
        let upstream: Vec<&str> = resolver.qc_upstream(&job()).collect();
        assert_eq!(upstream, vec!["MAT", "STK", "LASER"]);

        // earliest upstream finish is MAT at 34_800
        let gate = resolver.gate(&job(), "QC", 34_200, 160);
        assert_eq!(gate.start, 35_100);
        // end must reach 40_000 + 160
        assert_eq!(gate.start + gate.duration, 40_160);
    }

    #[test]
    fn test_qc_standard_duration_when_upstream_early() {
        let cfg = config();
        let pre = PrecomputedTimelines::new().with("STK", item(35_000, 35_100));
        let gate = DependencyResolver::new(&cfg, &pre).gate(&job(), "QC", 36_000, 160);
        assert_eq!(gate, Gate { start: 36_000, duration: 160 });
    }

    #[test]
    fn test_packing_follows_qc() {
        let cfg = config();
        let pre = PrecomputedTimelines::new().with("QC", item(40_000, 41_000));
        let gate = DependencyResolver::new(&cfg, &pre).gate(&job(), "PACK", 34_200, 80);
        assert_eq!(gate.start, 40_300);
        assert_eq!(gate.start + gate.duration, 41_300);
    }

    #[test]
    fn test_packing_uses_actual_qc_start() {
        let cfg = config();
        let pre = PrecomputedTimelines::new().with("QC", item(40_000, 41_000));
        let mut j = job();
        j.record_start("QC", "inspect", at(11, 0), None);
        let gate = DependencyResolver::new(&cfg, &pre).gate(&j, "PACK", 34_200, 80);
        assert_eq!(gate.start, 39_900);
        assert_eq!(gate.start + gate.duration, 41_300);
    }

    #[test]
    fn test_graph_edges() {
        let graph = DependencyGraph::from_config(&config());
        assert_eq!(graph.upstream("STK"), &["MAT".to_string()]);
        assert_eq!(graph.upstream("QC"), &["MAT", "STK", "LASER"].map(String::from));
        assert_eq!(graph.upstream("PACK"), &["QC".to_string()]);
        assert!(graph.upstream("MAT").is_empty());
    }

    #[test]
    fn test_computation_order() {
        let cfg = PlantConfig {
            departments: ["PACK", "QC", "LASER", "STK", "MAT"].map(String::from).to_vec(),
            ..config()
        };
        let order = DependencyGraph::from_config(&cfg).computation_order().unwrap();
        assert_eq!(order, ["MAT", "LASER", "STK", "QC", "PACK"].map(String::from).to_vec());
    }

    #[test]
    fn test_order_without_roles_is_display_order() {
        let cfg = config().with_roles(DepartmentRoles::default());
        let order = DependencyGraph::from_config(&cfg).computation_order().unwrap();
        assert_eq!(order, cfg.departments);
    }

    #[test]
    fn test_cycle_detected() {
        let roles = DepartmentRoles {
            intake: Some("PACK".into()),
            ..DepartmentRoles::standard()
        };
        let cfg = config().with_roles(roles);
        let err = DependencyGraph::from_config(&cfg).computation_order().unwrap_err();
        assert!(matches!(err, PlanError::CyclicDependency(_)));
    }

    #[test]
    fn test_missing_upstream() {
        let graph = DependencyGraph::from_config(&config());
        let pre = PrecomputedTimelines::new().with("MAT", vec![]);
        assert!(graph.missing_upstream("STK", &pre).is_empty());
        assert_eq!(graph.missing_upstream("QC", &pre), vec!["STK", "LASER"]);
    }
}
