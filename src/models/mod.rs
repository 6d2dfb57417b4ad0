//! Production planning domain models.
//!
//! Provides the data types the planner computes over: plant configuration,
//! jobs with their recorded actuals, break calendars, and computed timelines.
//!
//! # Domain Mappings
//!
//! | u-lineplan | Shop floor |
//! |------------|------------|
//! | Department | Work center (material-prep, stamping, QC, ...) |
//! | ProcessStep | Timed operation within a work center |
//! | Line | Parallel queue within a department |
//! | Job | Customer order queued for a date |
//! | TimelineItem | Planned start/end of a job on a line |

mod calendar;
mod clock;
mod config;
mod job;
mod timeline;

pub use calendar::{BreakCalendar, TimeWindow};
pub use clock::{
    format_hhmm, format_optional, parse_hhmm, seconds_on, try_parse_hhmm, Seconds, BUFFER_SECS,
};
pub use config::{BreakSpec, DepartmentRoles, PlantConfig, ProcessStep, StepKind};
pub use job::{Job, LockedPlan, StepTrack};
pub use timeline::{PrecomputedTimelines, TimelineItem};
