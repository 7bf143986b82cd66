use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::path::PathBuf;

use nix::fcntl::OFlag;
use nix::unistd;

use crate::error::PipelineError;
use crate::parse::{Directives, OutputMode};

/// One anonymous pipe. Dropping it closes both ends.
#[derive(Debug)]
pub struct Pipe {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl Pipe {
    /// Allocate a close-on-exec pipe.
    pub fn new() -> nix::Result<Self> {
        let (read, write) = unistd::pipe2(OFlag::O_CLOEXEC)?;
        Ok(Self { read, write })
    }

    fn raw_fds(&self) -> [RawFd; 2] {
        [self.read.as_raw_fd(), self.write.as_raw_fd()]
    }
}

/// One program invocation within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Program name followed by its arguments. Never empty.
    pub argv: Vec<String>,
}

impl Segment {
    pub fn program(&self) -> &str {
        &self.argv[0]
    }
}

/// Segments of one sub-command plus the pipes that connect them.
///
/// Pipe `i` joins segment `i`'s stdout to segment `i + 1`'s stdin.
#[derive(Debug)]
pub struct Pipeline {
    segments: Vec<Segment>,
    input: Option<PathBuf>,
    output: Option<(PathBuf, OutputMode)>,
    pipes: Vec<Pipe>,
}

impl Pipeline {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// File bound to the first segment's stdin, if any.
    pub fn input(&self) -> Option<&PathBuf> {
        self.input.as_ref()
    }

    /// File bound to the last segment's stdout, if any.
    pub fn output(&self) -> Option<(&PathBuf, OutputMode)> {
        self.output.as_ref().map(|(p, m)| (p, *m))
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    /// Raw descriptors of every pipe end, for closing in children.
    pub(crate) fn pipe_fds(&self) -> Vec<RawFd> {
        self.pipes.iter().flat_map(Pipe::raw_fds).collect()
    }

    /// Drop the parent's copies of every pipe end. Returns how many pipes
    /// were closed.
    pub fn close_pipes(&mut self) -> usize {
        let pipes = std::mem::take(&mut self.pipes);
        let count = pipes.len();
        drop(pipes);
        count
    }
}

/// Partition directives into segments and allocate the connecting pipes.
///
/// Empty partitions (from leading, trailing or doubled `|`) are dropped. A
/// redirection only applies when it was written in the partition that ends
/// up first (input) or last (output); elsewhere the pipe wiring owns that
/// descriptor. All pipes are allocated before returning; on failure the
/// ones already created are closed and nothing is returned.
pub fn build(directives: Directives) -> Result<Pipeline, PipelineError> {
    let Directives {
        args,
        redirects,
        splits,
    } = directives;

    let mut bounds = Vec::with_capacity(splits.len() + 2);
    bounds.push(0);
    bounds.extend(splits.iter().copied());
    bounds.push(args.len());

    // (raw partition index, segment)
    let kept: Vec<(usize, Segment)> = bounds
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] < w[1])
        .map(|(i, w)| {
            (
                i,
                Segment {
                    argv: args[w[0]..w[1]].to_vec(),
                },
            )
        })
        .collect();

    let first = kept.first().map(|(i, _)| *i);
    let last = kept.last().map(|(i, _)| *i);

    let input = redirects
        .input
        .filter(|t| Some(t.partition) == first)
        .map(|t| t.path);
    let output = redirects
        .output
        .filter(|(t, _)| Some(t.partition) == last)
        .map(|(t, mode)| (t.path, mode));

    let segments: Vec<Segment> = kept.into_iter().map(|(_, s)| s).collect();
    let pipes = (1..segments.len())
        .map(|_| Pipe::new())
        .collect::<nix::Result<Vec<_>>>()
        .map_err(PipelineError::ResourceExhausted)?;

    Ok(Pipeline {
        segments,
        input,
        output,
        pipes,
    })
}
