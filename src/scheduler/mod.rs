//! Timeline computation and job status.
//!
//! Computes, one department at a time, each job's planned start/end on
//! its line, and classifies job progress from recorded actuals.
//!
//! # Algorithm
//!
//! `compute_timeline` walks the department's queue in `order_index`
//! order with one cursor per line. Precedence, highest first: locked
//! plan, manual start, dependency rules, cut time, line cursor. Every
//! computed window is then placed around the department's breaks.
//!
//! # Computation Order
//!
//! Downstream departments read upstream results from a
//! `PrecomputedTimelines` map instead of recursing. `DependencyGraph`
//! yields a valid order; `DayPlanner` runs a whole day in that order.
//!
//! # Status
//!
//! `job_status_for_dept` and `overall_job_status` derive
//! pending / in-progress / done from the recorded tracks.

mod day;
mod dependency;
mod duration;
mod status;
mod timeline;

pub use day::{DayPlan, DayPlanner, Snapshot, SnapshotSource};
pub use dependency::{DependencyGraph, DependencyResolver, Gate};
pub use duration::{effective_quantity, standard_duration};
pub use status::{job_status_for_dept, overall_job_status, JobStatus, StatusKey};
pub use timeline::{compute_timeline, compute_timeline_checked, department_queue};
