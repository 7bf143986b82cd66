use super::types::{Delimiter, SubCommand};
use crate::error::ParseError;

/// Characters that end a sub-command.
const SEQUENCE_DELIMITERS: [char; 2] = [';', '&'];

/// Split a raw line into sub-commands at `;` and `&`.
///
/// Splitting is purely syntactic: no quoting or escaping is recognised.
/// Consecutive delimiters form one run; the run marks the preceding
/// sub-command as short-circuiting when it contains any `&`. Pieces that are
/// empty or whitespace-only are dropped.
pub fn split_subcommands(line: &str) -> Result<Vec<SubCommand>, ParseError> {
    let mut subcommands = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        let end = rest.find(SEQUENCE_DELIMITERS).unwrap_or(rest.len());
        let (text, tail) = rest.split_at(end);
        let run_len = tail
            .find(|c: char| !SEQUENCE_DELIMITERS.contains(&c))
            .unwrap_or(tail.len());
        let (run, tail) = tail.split_at(run_len);

        let delimiter = if run.contains('&') {
            Some(Delimiter::Amp)
        } else if run.is_empty() {
            None
        } else {
            Some(Delimiter::Semi)
        };

        if !text.trim().is_empty() {
            subcommands.push(SubCommand {
                text: text.to_string(),
                delimiter,
            });
        }
        rest = tail;
    }

    if subcommands.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    Ok(subcommands)
}

/// Split one sub-command into arguments on runs of ASCII whitespace.
pub fn split_arguments(text: &str) -> Vec<String> {
    text.split_ascii_whitespace().map(String::from).collect()
}
