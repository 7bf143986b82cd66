use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{self, WaitStatus};
use nix::unistd::Pid;

use super::launch::{self, ChildProcess};
use super::pipeline::Pipeline;
use crate::error::LaunchError;

/// Status assumed for a last stage that never ran or could not be reaped.
pub const MISSING_STATUS: i32 = 126;

/// How a child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited(i32),
    Signaled(Signal),
}

impl ExitOutcome {
    /// Status used for sequencing. A signal-terminated child has no exit code
    /// and counts as 0.
    pub fn status(self) -> i32 {
        match self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Signaled(_) => 0,
        }
    }

    pub fn success(self) -> bool {
        self.status() == 0
    }
}

/// A child after the supervisor is done with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaped {
    pub child: ChildProcess,
    /// `Err` when waiting on this child failed.
    pub outcome: Result<ExitOutcome, Errno>,
}

/// Everything observed while running one pipeline.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Number of segments the pipeline had.
    pub segments: usize,
    /// Pipes allocated for the pipeline; all of them are closed in the parent
    /// before any wait.
    pub pipes_closed: usize,
    pub reaped: Vec<Reaped>,
    pub launch_failures: Vec<LaunchError>,
}

impl PipelineReport {
    /// Outcome of the last segment, if it ran and was reaped.
    pub fn last_outcome(&self) -> Option<ExitOutcome> {
        let last = self.segments.checked_sub(1)?;
        self.reaped
            .iter()
            .find(|r| r.child.index == last)
            .and_then(|r| r.outcome.ok())
    }

    /// Pipeline status: the last stage's status. An empty pipeline succeeds;
    /// a last stage that never ran or vanished counts as [`MISSING_STATUS`].
    pub fn status(&self) -> i32 {
        if self.segments == 0 {
            return 0;
        }
        self.last_outcome().map_or(MISSING_STATUS, ExitOutcome::status)
    }
}

/// Launch every segment, release the parent's pipe ends, and reap all
/// children.
pub fn run(mut pipeline: Pipeline) -> PipelineReport {
    let spawned = launch::spawn(&pipeline);
    let pipes_closed = pipeline.close_pipes();

    let reaped = spawned
        .children
        .into_iter()
        .map(|child| {
            let outcome = wait_for(child.pid);
            if let Err(errno) = outcome {
                log::warn!("waitpid({}) for {} failed: {errno}", child.pid, child.program);
            }
            Reaped { child, outcome }
        })
        .collect();

    PipelineReport {
        segments: pipeline.segments().len(),
        pipes_closed,
        reaped,
        launch_failures: spawned.failures,
    }
}

/// Block until `pid` terminates, retrying waits cut short by a signal.
///
/// Children are waited for by pid; one that finishes early stays a zombie
/// until its turn, so completion order does not matter.
fn wait_for(pid: Pid) -> Result<ExitOutcome, Errno> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ExitOutcome::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(ExitOutcome::Signaled(signal)),
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(errno),
        }
    }
}
