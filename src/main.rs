//! pipesh: interactive front end for the pipeline interpreter.
//!
//! Reads one line at a time, keeps a bounded history, and hands every other
//! line to the sequencer. `-c` runs a single line instead.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use pipesh::config::Config;
use pipesh::history::History;

const USAGE: &str = "\
usage: pipesh [--config <path>] [--dump-config] [-c <line>]

  -c <line>         run one line and exit with its status
  --config <path>   read overrides from <path> instead of ~/.config/pipesh/config.toml
  --dump-config     print the merged configuration and exit
  -h, --help        show this help";

#[derive(Debug, Default)]
struct Args {
    command: Option<String>,
    config: Option<PathBuf>,
    dump_config: bool,
    help: bool,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "-c" => {
                args.command = Some(argv.next().ok_or("-c requires an argument")?);
            }
            "--config" => {
                let path = argv.next().ok_or("--config requires a path")?;
                args.config = Some(PathBuf::from(shellexpand::tilde(&path).into_owned()));
            }
            "--dump-config" => args.dump_config = true,
            "-h" | "--help" => args.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("pipesh: {e}\n{USAGE}");
            std::process::exit(2);
        }
    };
    if args.help {
        println!("{USAGE}");
        return;
    }

    let config = Config::load(args.config.as_deref());
    if args.dump_config {
        match config.to_toml() {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("pipesh: cannot render config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    pipesh::logging::init(&config.logging);
    if let Err(e) = pipesh::signals::install_interrupt_handler() {
        eprintln!("pipesh: sigaction failed: {e}");
        std::process::exit(1);
    }

    if let Some(line) = args.command {
        let report = pipesh::run_line(&line);
        std::process::exit(report.status());
    }

    let stdin = io::stdin();
    if let Err(e) = interactive(&config, stdin.lock(), io::stdout()) {
        eprintln!("pipesh: {e}");
        std::process::exit(1);
    }
}

/// Prompt/read/execute until end of input.
///
/// Lines are read as bytes; invalid UTF-8 is replaced rather than ending the
/// session.
fn interactive(config: &Config, mut input: impl BufRead, mut out: impl Write) -> io::Result<()> {
    let mut history = History::new(config.shell.history_size);
    let mut buf = Vec::new();

    loop {
        write!(out, "{}", config.shell.prompt)?;
        out.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        let line = text.strip_suffix('\n').unwrap_or(&text);
        if line.is_empty() {
            continue;
        }
        if line == "history" {
            write!(out, "{history}")?;
            continue;
        }

        history.push(line);
        pipesh::run_line(line);
    }
    Ok(())
}
