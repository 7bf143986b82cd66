//! Error taxonomy for the parse and exec layers.

use nix::errno::Errno;
use thiserror::Error;

/// Errors detected while turning a line into directives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line holds no sub-commands. Callers treat this as "nothing to do".
    #[error("empty input")]
    EmptyInput,

    /// A malformed directive: redirection operator without a target.
    #[error("syntax error: missing file after '{operator}'")]
    MissingRedirectTarget { operator: &'static str },
}

/// Errors that abort a whole pipeline before anything is launched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("cannot allocate pipe: {0}")]
    ResourceExhausted(Errno),
}

/// Errors that leave one segment out of a running pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("{program}: cannot create process: {source}")]
    SpawnFailure { program: String, source: Errno },

    #[error("{program}: argument contains a NUL byte")]
    InvalidArgument { program: String },
}

/// Failures a child reports on its own stderr before exiting.
///
/// These never reach the parent as values; the parent only observes the
/// exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildFailure {
    InputFileUnavailable,
    OutputFileUnavailable,
    ProgramNotFound,
    ExecutionFailure,
}

impl ChildFailure {
    /// Exit status the child terminates with.
    pub fn exit_code(self) -> i32 {
        match self {
            ChildFailure::InputFileUnavailable | ChildFailure::OutputFileUnavailable => 1,
            ChildFailure::ProgramNotFound => 127,
            ChildFailure::ExecutionFailure => 126,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChildFailure::InputFileUnavailable => "cannot open input file",
            ChildFailure::OutputFileUnavailable => "cannot open output file",
            ChildFailure::ProgramNotFound => "command not found",
            ChildFailure::ExecutionFailure => "cannot execute",
        }
    }

    /// Classify a failed `execvp`.
    pub fn from_exec(errno: Errno) -> Self {
        match errno {
            Errno::ENOENT | Errno::ENOTDIR => ChildFailure::ProgramNotFound,
            _ => ChildFailure::ExecutionFailure,
        }
    }
}

/// Any error that aborts a sub-command before it runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
