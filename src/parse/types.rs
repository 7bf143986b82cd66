//! Types produced by the line parser and consumed by the exec layer.

use std::path::PathBuf;

/// Delimiter run that ended a sub-command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// a run of `;` only: run the next sub-command unconditionally
    Semi,
    /// a run containing `&` — stop the line if this sub-command fails
    Amp,
}

/// One sequencing unit of a raw line, possibly a multi-stage pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCommand {
    /// Text between delimiters, untrimmed.
    pub text: String,
    /// Delimiter that followed the text, `None` at end of line.
    pub delimiter: Option<Delimiter>,
}

impl SubCommand {
    /// Whether a non-zero status from this sub-command ends the line.
    pub fn short_circuits(&self) -> bool {
        self.delimiter == Some(Delimiter::Amp)
    }
}

/// How an output redirection opens its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// `>`
    Truncate,
    /// `>>`
    Append,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Truncate => ">",
            OutputMode::Append => ">>",
        }
    }
}

/// A redirection target together with the pipe partition it was written in.
///
/// `partition` counts the `|` operators seen before the redirection, so it
/// indexes the raw (pre-filtering) partitions of the argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path: PathBuf,
    pub partition: usize,
}

/// Input/output redirections of one sub-command. Last operator of a kind wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectionSpec {
    pub input: Option<Target>,
    pub output: Option<(Target, OutputMode)>,
}

impl RedirectionSpec {
    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none()
    }
}

/// Result of stripping directives out of an argument list.
///
/// For `a b | c > out`, `args` is `[a, b, c]`, `splits` is `[2]`, and the
/// output target is `out` in partition 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub args: Vec<String>,
    pub redirects: RedirectionSpec,
    /// Positions in `args` where a new pipeline segment starts.
    pub splits: Vec<usize>,
}
