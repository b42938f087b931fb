//! The sweep driver: fan-out per temperature, barrier, next temperature.

use chrono::Utc;
use lik_core::{LikError, RunConfig};
use tracing::{error, info, warn};

use crate::expand::expand;
use crate::launch::{Launcher, RunHandle};
use crate::plan::{sweep_hash, SweepPlan};
use crate::report::{GroupReport, JobReport, JobStatus, SweepReport};

/// Executes the sweep described by `plan` against `template`.
///
/// For each likelihood temperature, every seed's run is launched before any
/// of them is awaited; the driver then blocks until the whole group has
/// terminated and only afterwards starts the next temperature. Concurrency
/// is therefore bounded by the number of seeds.
///
/// Best-effort semantics: a run that exits non-zero is recorded and never
/// aborts the sweep, and a run that cannot be spawned is logged and recorded
/// while the rest of its group proceeds. There are no retries and no timeout
/// on the barrier. `Err` is reserved for an unrunnable plan.
pub fn run_sweep<L: Launcher>(
    plan: &SweepPlan,
    template: &RunConfig,
    launcher: &mut L,
) -> Result<SweepReport, LikError> {
    let plan_hash = sweep_hash(plan, template)?;
    let created_at = Utc::now().to_rfc3339();
    let groups = expand(plan, template)?;

    let mut group_reports = Vec::with_capacity(groups.len());
    for group in &groups {
        info!(
            likelihood_temp = group.likelihood_temp,
            runs = group.runs.len(),
            "launching temperature group"
        );

        // Fire-and-forget within the group: every launch happens before the
        // first wait.
        let mut statuses: Vec<Option<JobStatus>> = vec![None; group.runs.len()];
        let mut pending = Vec::with_capacity(group.runs.len());
        for (idx, spec) in group.runs.iter().enumerate() {
            match launcher.launch(spec) {
                Ok(handle) => pending.push((idx, handle)),
                Err(err) => {
                    error!(label = %spec.label, %err, "failed to launch run");
                    statuses[idx] = Some(JobStatus::LaunchFailed {
                        error: err.info().message.clone(),
                    });
                }
            }
        }

        // Barrier: await termination of everything that was spawned,
        // regardless of exit status.
        for (idx, handle) in pending {
            let spec = &group.runs[idx];
            match handle.wait() {
                Ok(status) if status.success() => {
                    statuses[idx] = Some(JobStatus::Completed);
                }
                Ok(status) => {
                    warn!(label = %spec.label, code = ?status.code, "run exited non-zero");
                    statuses[idx] = Some(JobStatus::Failed { code: status.code });
                }
                Err(err) => {
                    warn!(label = %spec.label, %err, "could not observe run exit");
                    statuses[idx] = Some(JobStatus::Failed { code: None });
                }
            }
        }

        let jobs = group
            .runs
            .iter()
            .zip(statuses)
            .map(|(spec, status)| JobReport {
                seed: spec.seed,
                likelihood_temp: spec.likelihood_temp,
                label: spec.label.clone(),
                status: status.unwrap_or(JobStatus::Failed { code: None }),
            })
            .collect();
        group_reports.push(GroupReport {
            likelihood_temp: group.likelihood_temp,
            jobs,
        });
    }

    Ok(SweepReport {
        plan_hash,
        created_at,
        groups: group_reports,
    })
}
