//! Launcher abstraction over OS process spawning.
//!
//! The driver only ever launches a run and later awaits its termination;
//! there is no other interaction with a running trainer. Keeping that
//! surface behind traits lets the barrier logic be exercised without
//! spawning real processes.

use std::process::{Child, Command, Stdio};

use lik_core::errors::{ErrorInfo, LikError};

use crate::expand::RunSpec;

/// Termination record of a launched run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
}

impl RunStatus {
    /// Whether the run terminated with a zero exit code.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Opaque reference to a launched run; supports only awaiting termination.
pub trait RunHandle {
    /// Blocks until the run has terminated, however it terminated.
    fn wait(self) -> Result<RunStatus, LikError>;
}

/// Launches run specs as independent units of work.
pub trait Launcher {
    type Handle: RunHandle;

    /// Starts the run without blocking on its completion.
    fn launch(&mut self, spec: &RunSpec) -> Result<Self::Handle, LikError>;
}

/// Launcher backed by real OS processes.
#[derive(Debug, Default)]
pub struct ProcessLauncher;

/// Handle over a spawned trainer process.
pub struct ProcessHandle {
    child: Child,
    label: String,
}

impl Launcher for ProcessLauncher {
    type Handle = ProcessHandle;

    fn launch(&mut self, spec: &RunSpec) -> Result<Self::Handle, LikError> {
        let child = Command::new(&spec.command[0])
            .args(&spec.command[1..])
            .stdin(Stdio::null())
            .spawn()
            .map_err(|err| {
                LikError::Launch(
                    ErrorInfo::new("launch-spawn", "failed to spawn trainer process")
                        .with_context("program", spec.command[0].clone())
                        .with_context("label", spec.label.clone())
                        .with_hint(err.to_string()),
                )
            })?;
        Ok(ProcessHandle {
            child,
            label: spec.label.clone(),
        })
    }
}

impl RunHandle for ProcessHandle {
    fn wait(mut self) -> Result<RunStatus, LikError> {
        let status = self.child.wait().map_err(|err| {
            LikError::Launch(
                ErrorInfo::new("launch-wait", "failed to await trainer process")
                    .with_context("label", self.label.clone())
                    .with_hint(err.to_string()),
            )
        })?;
        Ok(RunStatus {
            code: status.code(),
        })
    }
}
