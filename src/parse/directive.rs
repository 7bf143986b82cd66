use std::path::PathBuf;

use super::types::{Directives, OutputMode, RedirectionSpec, Target};
use crate::error::ParseError;

/// A recognised operator token.
enum Operator {
    Input,
    Output(OutputMode),
    Pipe,
}

impl Operator {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(Operator::Input),
            ">" => Some(Operator::Output(OutputMode::Truncate)),
            ">>" => Some(Operator::Output(OutputMode::Append)),
            "|" => Some(Operator::Pipe),
            _ => None,
        }
    }
}

/// Strip redirection and pipe operators out of an argument list.
///
/// `<`, `>` and `>>` consume the following token as their target; a later
/// operator of the same kind replaces an earlier one (`>` and `>>` share a
/// slot). `|` records the current position in the clean list as a
/// split-point. Operators are only recognised as whole tokens.
pub fn extract(tokens: Vec<String>) -> Result<Directives, ParseError> {
    let mut args = Vec::with_capacity(tokens.len());
    let mut redirects = RedirectionSpec::default();
    let mut splits = Vec::new();

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        let Some(op) = Operator::from_token(&token) else {
            args.push(token);
            continue;
        };
        let partition = splits.len();
        match op {
            Operator::Pipe => splits.push(args.len()),
            Operator::Input => {
                let path = target(iter.next(), "<")?;
                redirects.input = Some(Target { path, partition });
            }
            Operator::Output(mode) => {
                let path = target(iter.next(), mode.as_str())?;
                redirects.output = Some((Target { path, partition }, mode));
            }
        }
    }

    Ok(Directives {
        args,
        redirects,
        splits,
    })
}

fn target(token: Option<String>, operator: &'static str) -> Result<PathBuf, ParseError> {
    token
        .map(PathBuf::from)
        .ok_or(ParseError::MissingRedirectTarget { operator })
}
