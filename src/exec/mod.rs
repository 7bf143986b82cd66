pub mod launch;
pub mod pipeline;
pub mod supervise;

pub use launch::{ChildProcess, Spawned, spawn};
pub use pipeline::{Pipe, Pipeline, Segment, build};
pub use supervise::{ExitOutcome, MISSING_STATUS, PipelineReport, Reaped, run};
