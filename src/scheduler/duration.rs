//! Effective quantity and standard duration.
//!
//! # Effective Quantity
//!
//! | Role | Quantity |
//! |------|----------|
//! | intake | sum of the stream departments' quantities |
//! | final QC | the packing quantity |
//! | other | the department's own quantity |
//!
//! A job with effective quantity 0 is not queued in that department.

use crate::models::{Job, PlantConfig, Seconds};

/// Quantity a department actually processes for a job.
///
/// Intake without configured streams, and QC without a packing
/// department, fall back to their own quantity.
pub fn effective_quantity(job: &Job, dept: &str, config: &PlantConfig) -> u32 {
    let roles = &config.roles;
    if roles.is_intake(dept) && !roles.streams.is_empty() {
        roles
            .streams
            .iter()
            .map(|s| job.quantity(s))
            .fold(0u32, u32::saturating_add)
    } else if roles.is_final_qc(dept) {
        match roles.packing.as_deref() {
            Some(packing) => job.quantity(packing),
            None => job.quantity(dept),
        }
    } else {
        job.quantity(dept)
    }
}

/// Standard processing time of a job in a department (seconds).
///
/// Sums per-piece and fixed step costs, floored at the department's
/// prep time. Returns 0 when the effective quantity is 0.
pub fn standard_duration(dept: &str, job: &Job, config: &PlantConfig) -> Seconds {
    let quantity = effective_quantity(job, dept, config);
    if quantity == 0 {
        return 0;
    }
    let work = config
        .steps(dept)
        .iter()
        .map(|s| s.cost(quantity))
        .fold(0, Seconds::saturating_add);
    work.max(config.prep_floor_secs(dept))
}
