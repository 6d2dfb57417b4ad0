//! Production line planner for the U-Engine ecosystem.
//!
//! Jobs flow through an ordered set of departments, each made of timed
//! process steps and split into parallel lines. This crate computes, for
//! one department and date, every job's planned start and end on its
//! line, and classifies job progress from recorded actuals.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `PlantConfig`, `ProcessStep`, `Job`,
//!   `LockedPlan`, `BreakCalendar`, `TimelineItem`, `PrecomputedTimelines`
//! - **`scheduler`**: Timeline computation, dependency rules, status
//!   classification, whole-day planning
//! - **`validation`**: Input integrity checks (duplicates, bad times,
//!   overlapping breaks, role cycles)
//! - **`error`**: `PlanError` for loading and ordering failures
//!
//! # Purity
//!
//! Every computation reads an immutable snapshot and returns new values.
//! Independent dates, or departments without a dependency between them,
//! may be computed concurrently.

pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{PlanError, Result};
