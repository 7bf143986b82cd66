//! pipesh: a line-oriented command interpreter.
//!
//! A line is split into sub-commands on `;` and `&`. Each sub-command may
//! carry `<`, `>`, `>>` redirections and `|` pipes; it is turned into a
//! pipeline of child processes wired together with anonymous pipes, and the
//! status of its last stage decides whether a sub-command followed by `&`
//! lets the line continue.
//!
//! # Architecture
//!
//! - **[`parse`]** — Tokenizer and directive extractor: sub-commands, arguments, redirections, pipe split-points.
//! - **[`exec`]** — Pipeline builder, process launcher and supervisor (fork, descriptor wiring, exec, reaping).
//! - **[`sequence`]** — Sequencer: per-sub-command parse/run with the `&` short-circuit rule.
//! - **[`config`]** — Configuration loading: embedded defaults + user overlay merge.
//! - **[`logging`]** — File logging setup for the `log` facade.
//! - **[`history`]** and **[`signals`]** — Interactive-loop support: bounded history, SIGINT absorption.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error taxonomy shared by the parse and exec layers.
pub mod error;
/// Pipeline construction, process launching and reaping.
pub mod exec;
/// Bounded command history for the interactive loop.
pub mod history;
/// File-based logging setup.
pub mod logging;
/// Line parsing: sub-command and argument splitting, directive extraction.
pub mod parse;
/// Sub-command sequencing and short-circuiting.
pub mod sequence;
/// Interrupt handling for the interpreter process.
pub mod signals;

pub use error::Error;
pub use sequence::{LineReport, run_line};
