pub mod directive;
pub mod tokenize;
pub mod types;

pub use directive::extract;
pub use tokenize::{split_arguments, split_subcommands};
pub use types::{Delimiter, Directives, OutputMode, RedirectionSpec, SubCommand, Target};
