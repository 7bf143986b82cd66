//! Sequencer: runs each sub-command of a line in order.
//!
//! Per sub-command the flow is `Idle → ParsingSubCommand → (PipelineRunning |
//! Skipped) → Idle`. A sub-command that fails to parse is reported and
//! skipped. One that ran yields the status of its last stage; when it was
//! followed by `&` and that status is non-zero, the rest of the line is
//! dropped.

use crate::error::{Error, ParseError};
use crate::exec::{self, Pipeline, PipelineReport};
use crate::parse::{self, SubCommand};

/// What happened to one sub-command.
#[derive(Debug)]
pub enum SubCommandOutcome {
    /// Parsed and executed.
    Ran(PipelineReport),
    /// Aborted before anything was launched.
    Skipped(Error),
}

#[derive(Debug)]
pub struct SubCommandReport {
    pub subcommand: SubCommand,
    pub outcome: SubCommandOutcome,
}

impl SubCommandReport {
    /// Status of the sub-command, `None` if it was skipped.
    pub fn status(&self) -> Option<i32> {
        match &self.outcome {
            SubCommandOutcome::Ran(report) => Some(report.status()),
            SubCommandOutcome::Skipped(_) => None,
        }
    }
}

/// Result of sequencing one raw line.
#[derive(Debug, Default)]
pub struct LineReport {
    /// Sub-commands that were reached, in order.
    pub subcommands: Vec<SubCommandReport>,
    /// Sub-commands dropped by the short-circuit rule.
    pub not_reached: Vec<SubCommand>,
}

impl LineReport {
    /// Status of the last sub-command that ran, 0 if none did.
    pub fn status(&self) -> i32 {
        self.subcommands
            .iter()
            .rev()
            .find_map(SubCommandReport::status)
            .unwrap_or(0)
    }

    pub fn short_circuited(&self) -> bool {
        !self.not_reached.is_empty()
    }

    /// Total number of child processes started for the line.
    pub fn processes_spawned(&self) -> usize {
        self.subcommands
            .iter()
            .map(|s| match &s.outcome {
                SubCommandOutcome::Ran(r) => r.reaped.len(),
                SubCommandOutcome::Skipped(_) => 0,
            })
            .sum()
    }
}

/// Parse one sub-command into a ready-to-launch pipeline.
pub fn parse_subcommand(subcommand: &SubCommand) -> Result<Pipeline, Error> {
    let tokens = parse::split_arguments(&subcommand.text);
    let directives = parse::extract(tokens)?;
    Ok(exec::build(directives)?)
}

/// Execute every sub-command of `line`, reporting errors on stderr.
///
/// An empty line is not an error: it yields an empty report.
pub fn run_line(line: &str) -> LineReport {
    let mut report = LineReport::default();
    let subcommands = match parse::split_subcommands(line) {
        Ok(s) => s,
        Err(ParseError::EmptyInput) => return report,
        Err(e) => {
            eprintln!("pipesh: {e}");
            return report;
        }
    };
    log::info!("line: {} sub-command(s): {}", subcommands.len(), line.trim());

    let mut pending = subcommands.into_iter();
    while let Some(subcommand) = pending.next() {
        let outcome = match parse_subcommand(&subcommand) {
            Ok(pipeline) => SubCommandOutcome::Ran(exec::run(pipeline)),
            Err(e) => {
                eprintln!("pipesh: {e}");
                log::warn!("skipped {:?}: {e}", subcommand.text.trim());
                SubCommandOutcome::Skipped(e)
            }
        };

        let mut stop = false;
        if let SubCommandOutcome::Ran(run) = &outcome {
            for failure in &run.launch_failures {
                eprintln!("pipesh: {failure}");
                log::warn!("{failure}");
            }
            let status = run.status();
            log::debug!("{:?} exited with status {status}", subcommand.text.trim());
            stop = subcommand.short_circuits() && status != 0;
        }

        report.subcommands.push(SubCommandReport {
            subcommand,
            outcome,
        });
        if stop {
            report.not_reached = pending.by_ref().collect();
            log::info!("short-circuit: {} sub-command(s) not run", report.not_reached.len());
            break;
        }
    }
    report
}
