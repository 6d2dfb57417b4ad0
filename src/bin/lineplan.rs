//! Prints the production plan of one date from a JSON snapshot.
//!
//! # Usage
//!
//! ```sh
//! lineplan --snapshot plant.json --date 2024-03-01
//! lineplan --snapshot plant.json --date 2024-03-01 --dept STK --check
//! ```
//!
//! The snapshot holds `{"config": PlantConfig, "jobs": [Job]}`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, warn};

use u_lineplan::models::format_hhmm;
use u_lineplan::scheduler::{job_status_for_dept, DayPlanner, Snapshot};
use u_lineplan::validation::{validate_config, validate_jobs, ValidationError};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "lineplan")]
#[command(about = "Compute per-department line timelines for one production date")]
struct Args {
    /// Snapshot JSON file (configuration and jobs).
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Production date (YYYY-MM-DD).
    #[arg(short, long)]
    date: NaiveDate,

    /// Only print this department.
    #[arg(long)]
    dept: Option<String>,

    /// Report validation problems before planning.
    #[arg(long)]
    check: bool,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn report(kind: &str, errors: &[ValidationError]) {
    for e in errors {
        warn!(error_kind = ?e.kind, "{kind}: {}", e.message);
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let snapshot = Snapshot::from_path(&args.snapshot)
        .with_context(|| format!("loading snapshot {}", args.snapshot.display()))?;
    info!(jobs = snapshot.jobs.len(), "snapshot loaded");

    if args.check {
        if let Err(errors) = validate_config(&snapshot.config) {
            report("config", &errors);
        }
        if let Err(errors) = validate_jobs(&snapshot.jobs, &snapshot.config) {
            report("jobs", &errors);
        }
    }

    let planner = DayPlanner::new(&snapshot).context("deriving computation order")?;
    let plan = planner.plan(args.date);

    for dept in planner.order() {
        if args.dept.as_deref().is_some_and(|d| d != dept) {
            continue;
        }
        println!("== {dept}");
        for item in plan.timeline(dept) {
            let status = snapshot
                .jobs
                .iter()
                .find(|j| j.id == item.job_id)
                .map(|j| job_status_for_dept(j, dept, &snapshot.config).label)
                .unwrap_or_default();
            println!(
                "  L{:<2} {:<12} {}  {:>6}  {}",
                item.line,
                item.job_id,
                item.window_label(),
                format_hhmm(item.duration),
                status
            );
        }
    }

    Ok(())
}
