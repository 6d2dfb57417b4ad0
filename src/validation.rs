//! Input validation for plant configurations and jobs.
//!
//! The planner itself degrades every malformed input to a default.
//! These checks surface such inputs to whoever edits them. Detects:
//! - Duplicate departments, step ids and job ids
//! - Unparseable times (day bounds, breaks, cut times, manual starts)
//! - Empty, inverted or overlapping breaks
//! - Roles naming unknown departments, and cyclic role dependencies
//! - Line assignments beyond the configured line count
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{HashMap, HashSet};

use crate::models::{try_parse_hhmm, Job, PlantConfig, TimeWindow};
use crate::scheduler::DependencyGraph;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A time-of-day string does not parse.
    InvalidTime,
    /// A break is empty, inverted, or overlaps another break.
    InvalidBreak,
    /// A role or quantity names a department that isn't configured.
    UnknownDepartment,
    /// Department roles form a cycle.
    CyclicDependency,
    /// A line count of zero, or an assignment beyond the line count.
    InvalidLine,
    /// A locked plan ends before it starts.
    InvalidLockedPlan,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn finish(errors: Vec<ValidationError>) -> ValidationResult {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a plant configuration.
///
/// Checks:
/// 1. No duplicate departments
/// 2. No duplicate step ids within a department
/// 3. Day bounds and break times parse
/// 4. Breaks are non-empty and non-overlapping
/// 5. Line counts are at least 1
/// 6. Roles name configured departments
/// 7. Roles do not form a dependency cycle
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_config(config: &PlantConfig) -> ValidationResult {
    let mut errors = Vec::new();

    let mut departments = HashSet::new();
    for dept in &config.departments {
        if !departments.insert(dept.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate department: {dept}"),
            ));
        }
    }

    for (dept, steps) in &config.processes {
        let mut ids = HashSet::new();
        for step in steps {
            if !ids.insert(step.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate step '{}' in department '{dept}'", step.id),
                ));
            }
        }
    }

    for (label, value) in [("day_start", &config.day_start), ("day_end", &config.day_end)] {
        if try_parse_hhmm(value).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTime,
                format!("Unparseable {label}: '{value}'"),
            ));
        }
    }

    for (dept, specs) in &config.breaks {
        let mut windows = Vec::new();
        for spec in specs {
            match (try_parse_hhmm(&spec.start), try_parse_hhmm(&spec.end)) {
                (Some(start), Some(end)) if end > start => {
                    windows.push(TimeWindow::new(start, end));
                }
                (Some(_), Some(_)) => errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidBreak,
                    format!(
                        "Break {}-{} in department '{dept}' is empty or inverted",
                        spec.start, spec.end
                    ),
                )),
                _ => errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTime,
                    format!(
                        "Unparseable break {}-{} in department '{dept}'",
                        spec.start, spec.end
                    ),
                )),
            }
        }
        windows.sort_by_key(|w| w.start);
        for pair in windows.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidBreak,
                    format!("Overlapping breaks in department '{dept}'"),
                ));
            }
        }
    }

    for (dept, &lines) in &config.lines_per_dept {
        if lines == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidLine,
                format!("Department '{dept}' has zero lines"),
            ));
        }
    }

    for name in config.roles.named_departments() {
        if !departments.contains(name) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownDepartment,
                format!("Role references unknown department '{name}'"),
            ));
        }
    }

    if let Some(cycle_err) = detect_cycles(config) {
        errors.push(cycle_err);
    }

    finish(errors)
}

/// Validates jobs against a configuration.
///
/// Checks:
/// 1. No duplicate job ids
/// 2. Quantities name configured departments
/// 3. Cut times and manual starts parse
/// 4. Line assignments are within the department's line count
/// 5. Locked plans do not end before they start
pub fn validate_jobs(jobs: &[Job], config: &PlantConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let departments: HashSet<&str> = config.departments.iter().map(String::as_str).collect();

    let mut ids = HashSet::new();
    for job in jobs {
        if !ids.insert(job.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {}", job.id),
            ));
        }

        for dept in job.qty.keys() {
            if !departments.contains(dept.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDepartment,
                    format!("Job '{}' has quantity for unknown department '{dept}'", job.id),
                ));
            }
        }

        if let Some(cut) = job.cut.as_deref().filter(|c| try_parse_hhmm(c).is_none()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTime,
                format!("Job '{}' has unparseable cut time '{cut}'", job.id),
            ));
        }

        for (dept, at) in &job.manual_start {
            if try_parse_hhmm(at).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTime,
                    format!("Job '{}' has unparseable manual start '{at}' in '{dept}'", job.id),
                ));
            }
        }

        for (dept, &line) in &job.line_assignment {
            if line >= config.line_count(dept) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidLine,
                    format!(
                        "Job '{}' assigned to line {line} of '{dept}' ({} lines)",
                        job.id,
                        config.line_count(dept)
                    ),
                ));
            }
        }

        for (dept, plan) in &job.locked_plan {
            if plan.end < plan.start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidLockedPlan,
                    format!("Job '{}' has a locked plan in '{dept}' ending before it starts", job.id),
                ));
            }
        }
    }

    finish(errors)
}

/// Detects cycles in the department dependency graph using DFS.
///
/// # Algorithm
/// Topological sort via DFS. If a back-edge is found (visiting a node
/// currently in the recursion stack), a cycle exists.
fn detect_cycles(config: &PlantConfig) -> Option<ValidationError> {
    let graph = DependencyGraph::from_config(config);

    // Build adjacency list: department → downstream departments
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for dept in &config.departments {
        for up in graph.upstream(dept) {
            adj.entry(up.as_str()).or_default().push(dept.as_str());
        }
    }

    let mut visited = HashSet::new();
    let mut in_stack = HashSet::new();

    for dept in &config.departments {
        let node = dept.as_str();
        if !visited.contains(node) && has_cycle_dfs(node, &adj, &mut visited, &mut in_stack) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving department '{node}'"),
            ));
        }
    }

    None
}

fn has_cycle_dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    in_stack: &mut HashSet<&'a str>,
) -> bool {
    visited.insert(node);
    in_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if in_stack.contains(next) {
                return true; // Back edge → cycle
            }
            if !visited.contains(next) && has_cycle_dfs(next, adj, visited, in_stack) {
                return true;
            }
        }
    }

    in_stack.remove(node);
    false
}
