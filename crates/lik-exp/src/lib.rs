//! Temperature-sweep orchestration for the tempered-likelihood trainer.
//!
//! A [`SweepPlan`] plus a [`lik_core::RunConfig`] template expand into
//! temperature groups of run specs; [`run_sweep`] launches each group
//! concurrently through a [`Launcher`] and joins it at a barrier before the
//! next group starts.

mod driver;
mod expand;
mod launch;
mod plan;
mod registry;
mod report;

pub use driver::run_sweep;
pub use expand::{expand, RunSpec, TempGroup};
pub use launch::{Launcher, ProcessHandle, ProcessLauncher, RunHandle, RunStatus};
pub use plan::{sweep_hash, SweepPlan};
pub use registry::{registry_append, registry_query, Query, Registry, Table};
pub use report::{GroupReport, JobReport, JobStatus, SweepReport};
