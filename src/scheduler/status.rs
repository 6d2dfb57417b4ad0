//! Progress classification of jobs.
//!
//! Derives a tri-state label for a job in one department from its
//! recorded tracks, and an aggregate over every department the job
//! passes through.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::duration::effective_quantity;
use crate::models::{Job, PlantConfig, StepTrack};

/// Progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKey {
    /// Nothing recorded yet.
    Pending,
    /// Work started, not finished.
    Progress,
    /// Every step finished.
    Done,
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusKey::Pending => "Pending",
            StatusKey::Progress => "In progress",
            StatusKey::Done => "Done",
        };
        f.write_str(label)
    }
}

/// Status of a job, with a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Progress state.
    pub key: StatusKey,
    /// Display label, naming the current step while in progress.
    pub label: String,
    /// Step id being worked on, when in progress.
    pub current_step: Option<String>,
}

impl JobStatus {
    fn plain(key: StatusKey) -> Self {
        Self {
            key,
            label: key.to_string(),
            current_step: None,
        }
    }

    fn in_progress(step_id: Option<String>, step_label: Option<String>) -> Self {
        let label = match step_label {
            Some(name) => format!("{name} in progress"),
            None => StatusKey::Progress.to_string(),
        };
        Self {
            key: StatusKey::Progress,
            label,
            current_step: step_id,
        }
    }
}

/// Classifies a job within one department.
///
/// # Rules
/// 1. No configured steps and no tracks: pending.
/// 2. Done when every configured step has an end. When some recorded
///    track belongs to a step no longer configured (steps removed or
///    renamed), done when at least one track exists and all have ends.
/// 3. In progress when any track has a start. The current step is the
///    first configured step started but not ended, else the first
///    recorded-but-unfinished track, else the first step without an end.
/// 4. Otherwise pending.
pub fn job_status_for_dept(job: &Job, dept: &str, config: &PlantConfig) -> JobStatus {
    let steps = config.steps(dept);
    let tracks: Vec<(&String, &StepTrack)> = job
        .tracks_for(dept)
        .map(|t| t.iter().collect())
        .unwrap_or_default();

    if steps.is_empty() && tracks.is_empty() {
        return JobStatus::plain(StatusKey::Pending);
    }

    let ended = |step_id: &str| job.track(dept, step_id).is_some_and(|t| t.end.is_some());
    let all_steps_done = !steps.is_empty() && steps.iter().all(|s| ended(s.id.as_str()));
    let orphaned = tracks.iter().any(|(id, _)| config.step(dept, id).is_none());
    let all_tracks_done =
        orphaned && !tracks.is_empty() && tracks.iter().all(|(_, t)| t.end.is_some());
    if all_steps_done || all_tracks_done {
        return JobStatus::plain(StatusKey::Done);
    }

    if tracks.iter().any(|(_, t)| t.start.is_some()) {
        let started_open = |t: &StepTrack| t.start.is_some() && t.end.is_none();
        let current = steps
            .iter()
            .find(|s| job.track(dept, &s.id).is_some_and(started_open))
            .map(|s| (s.id.clone(), s.display_name().to_string()))
            .or_else(|| {
                tracks
                    .iter()
                    .find(|(_, t)| t.is_recorded() && t.end.is_none())
                    .map(|(id, _)| {
                        let name = config
                            .step(dept, id)
                            .map_or(id.as_str(), |s| s.display_name());
                        (id.to_string(), name.to_string())
                    })
            })
            .or_else(|| {
                steps
                    .iter()
                    .find(|s| !ended(s.id.as_str()))
                    .map(|s| (s.id.clone(), s.display_name().to_string()))
            });
        let (id, name) = current.unzip();
        return JobStatus::in_progress(id, name);
    }

    JobStatus::plain(StatusKey::Pending)
}

/// Aggregate status over every department with a nonzero effective quantity.
///
/// Done if all are done, in progress if any is in progress, pending
/// otherwise. A job touching no department is pending.
pub fn overall_job_status(job: &Job, config: &PlantConfig) -> JobStatus {
    let keys: Vec<StatusKey> = config
        .departments
        .iter()
        .filter(|d| effective_quantity(job, d, config) > 0)
        .map(|d| job_status_for_dept(job, d, config).key)
        .collect();

    if keys.is_empty() {
        return JobStatus::plain(StatusKey::Pending);
    }
    if keys.iter().all(|k| *k == StatusKey::Done) {
        JobStatus::plain(StatusKey::Done)
    } else if keys.contains(&StatusKey::Progress) {
        JobStatus::plain(StatusKey::Progress)
    } else {
        JobStatus::plain(StatusKey::Pending)
    }
}
