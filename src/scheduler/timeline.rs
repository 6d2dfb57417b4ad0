//! Per-department timeline computation.
//!
//! # Algorithm
//!
//! 1. Queue the department's jobs for the date with a nonzero effective
//!    quantity, ordered by `order_index` (stable on input order).
//! 2. Seed one cursor per line at the workday start.
//! 3. For each job:
//!    - a locked plan is emitted verbatim and moves its line's cursor;
//!    - otherwise the cursor is the previous job's end on that line
//!      (its actual finish when the department is a flow department or
//!      this job already has activity, else its planned end);
//!    - `base = max(cursor, cut)`, raised to `cut + buffer` in delay
//!      departments;
//!    - a manual start replaces `base` outright, skipping the cut and
//!      dependency rules;
//!    - otherwise the dependency rules raise `base` and may stretch the
//!      duration;
//!    - the window is placed around the department's breaks.
//!
//! # Complexity
//! O(n log n + n * d) where n = queued jobs, d = departments feeding QC.

use chrono::NaiveDate;
use tracing::{debug, trace, warn};

use super::dependency::{DependencyGraph, DependencyResolver};
use super::duration::{effective_quantity, standard_duration};
use crate::error::{PlanError, Result};
use crate::models::{Job, PlantConfig, PrecomputedTimelines, Seconds, TimelineItem};

/// Jobs queued in a department on a date, in queue order.
pub fn department_queue<'a>(
    dept: &str,
    date: NaiveDate,
    config: &PlantConfig,
    jobs: &'a [Job],
) -> Vec<&'a Job> {
    let mut queue: Vec<&Job> = jobs
        .iter()
        .filter(|j| j.date == date && effective_quantity(j, dept, config) > 0)
        .collect();
    queue.sort_by_key(|j| j.order_index);
    queue
}

/// Computes the planned windows of one department on one date.
///
/// `precomputed` must already hold the upstream departments this
/// department's rules consult; missing entries simply leave the rule
/// inactive. Use [`compute_timeline_checked`] to reject stale inputs.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_lineplan::models::{Job, PlantConfig, PrecomputedTimelines, ProcessStep};
/// use u_lineplan::scheduler::compute_timeline;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let config = PlantConfig::new()
///     .with_day("09:00", "18:00")
///     .with_department("STK", vec![ProcessStep::per_piece("press", 60)]);
/// let jobs = vec![Job::new("J1", date).with_qty("STK", 10)];
///
/// let items = compute_timeline("STK", date, &config, &jobs, &PrecomputedTimelines::new());
/// assert_eq!(items[0].start, 32_400);
/// assert_eq!(items[0].end, 33_000);
/// ```
pub fn compute_timeline(
    dept: &str,
    date: NaiveDate,
    config: &PlantConfig,
    jobs: &[Job],
    precomputed: &PrecomputedTimelines,
) -> Vec<TimelineItem> {
    let roles = &config.roles;
    let resolver = DependencyResolver::new(config, precomputed);
    let breaks = config.break_calendar(dept);
    let day_start = config.day_start_secs();
    let line_count = config.line_count(dept);
    let queue = department_queue(dept, date, config, jobs);

    // Previous job on each line and its emitted end.
    let mut last_on_line: Vec<Option<(&Job, Seconds)>> = vec![None; line_count];
    let mut items = Vec::with_capacity(queue.len());

    for job in queue {
        if let Some(plan) = job.locked_plan.get(dept) {
            let line = plan.line.unwrap_or_else(|| job.line(dept));
            if let Some(slot) = last_on_line.get_mut(line) {
                *slot = Some((job, plan.end));
            }
            trace!(%dept, job = %job.id, "locked plan");
            items.push(TimelineItem::new(
                &job.id,
                plan.start,
                plan.end,
                plan.end - plan.start,
                line,
            ));
            continue;
        }

        let line = job.line(dept).min(line_count - 1);
        let prefer_actual = roles.is_flow(dept) || job.has_activity(dept);
        let cursor = match last_on_line[line] {
            None => day_start,
            Some((prev, planned_end)) if prefer_actual => resolver
                .actual_finish(prev, dept)
                .unwrap_or(planned_end),
            Some((_, planned_end)) => planned_end,
        };

        let standard = standard_duration(dept, job, config);
        let (base, duration) = match job.manual_start_secs(dept) {
            Some(pinned) => (pinned, standard),
            None => {
                let mut base = cursor;
                if let Some(cut) = job.cut_secs() {
                    base = base.max(cut);
                    if roles.is_delay(dept) {
                        base = base.max(cut + roles.buffer_secs);
                    }
                }
                let gate = resolver.gate(job, dept, base, standard);
                (gate.start, gate.duration)
            }
        };

        let window = breaks.apply(base, duration);
        trace!(%dept, job = %job.id, %line, start = window.start, end = window.end, "planned");
        last_on_line[line] = Some((job, window.end));
        items.push(TimelineItem::new(
            &job.id,
            window.start,
            window.end,
            duration,
            line,
        ));
    }

    debug!(%dept, %date, jobs = items.len(), "timeline computed");
    items
}

/// [`compute_timeline`] that first checks the department is configured
/// and that every upstream department is present in `precomputed`.
///
/// # Errors
/// - [`PlanError::UnknownDepartment`] for an unconfigured department.
/// - [`PlanError::StaleUpstream`] when upstream timelines are missing.
pub fn compute_timeline_checked(
    dept: &str,
    date: NaiveDate,
    config: &PlantConfig,
    jobs: &[Job],
    precomputed: &PrecomputedTimelines,
) -> Result<Vec<TimelineItem>> {
    if !config.departments.iter().any(|d| d == dept) {
        return Err(PlanError::UnknownDepartment(dept.to_string()));
    }
    let missing = DependencyGraph::from_config(config).missing_upstream(dept, precomputed);
    if !missing.is_empty() {
        warn!(%dept, ?missing, "upstream departments not computed");
        return Err(PlanError::StaleUpstream {
            dept: dept.to_string(),
            missing,
        });
    }
    Ok(compute_timeline(dept, date, config, jobs, precomputed))
}
