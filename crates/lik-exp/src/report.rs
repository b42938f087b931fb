use serde::{Deserialize, Serialize};

/// Outcome recorded for one launched (temperature, seed) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum JobStatus {
    /// Terminated with exit code zero.
    Completed,
    /// Terminated with a non-zero exit code, or was killed by a signal.
    Failed { code: Option<i32> },
    /// The process could not be spawned at all.
    LaunchFailed { error: String },
}

impl JobStatus {
    /// Compact single-cell rendering used by the registry.
    pub fn registry_cell(&self) -> String {
        match self {
            JobStatus::Completed => "completed".to_string(),
            JobStatus::Failed { code: Some(code) } => format!("failed({code})"),
            JobStatus::Failed { code: None } => "failed(signal)".to_string(),
            JobStatus::LaunchFailed { .. } => "launch-failed".to_string(),
        }
    }
}

/// Record of one run within a temperature group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    pub seed: u64,
    pub likelihood_temp: f64,
    pub label: String,
    pub status: JobStatus,
}

/// All runs joined at one barrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReport {
    pub likelihood_temp: f64,
    pub jobs: Vec<JobReport>,
}

/// Aggregate sweep outcome persisted for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Stable hash of the (plan, template) pair that produced this sweep.
    pub plan_hash: String,
    /// RFC 3339 timestamp taken when the sweep started.
    pub created_at: String,
    pub groups: Vec<GroupReport>,
}

impl SweepReport {
    /// Total number of runs across all groups.
    pub fn launches(&self) -> usize {
        self.groups.iter().map(|group| group.jobs.len()).sum()
    }

    /// Number of runs that did not complete successfully.
    pub fn failures(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|group| &group.jobs)
            .filter(|job| job.status != JobStatus::Completed)
            .count()
    }
}
