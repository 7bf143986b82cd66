use std::ffi::{CStr, CString};
use std::fs::File;
use std::io::Write;
use std::mem::ManuallyDrop;
use std::os::fd::{AsRawFd, FromRawFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::unistd::{self, ForkResult, Pid};

use super::pipeline::{Pipeline, Segment};
use crate::error::{ChildFailure, LaunchError};
use crate::parse::OutputMode;

/// Permission bits for files created by output redirection.
const CREATE_MODE: u32 = 0o600;

/// A spawned segment, owned until the supervisor reaps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildProcess {
    pub pid: Pid,
    /// Position of the segment in its pipeline.
    pub index: usize,
    pub program: String,
}

/// Children that were started and segments that could not be.
#[derive(Debug, Default)]
pub struct Spawned {
    pub children: Vec<ChildProcess>,
    pub failures: Vec<LaunchError>,
}

/// Everything a child needs, converted before `fork` so the child does no
/// fallible conversion work.
struct Prepared {
    argv: Vec<CString>,
    input: Option<CString>,
    output: Option<(CString, OutputMode)>,
}

fn to_cstring(bytes: &[u8], program: &str) -> Result<CString, LaunchError> {
    CString::new(bytes).map_err(|_| LaunchError::InvalidArgument {
        program: program.to_string(),
    })
}

fn path_cstring(path: &Path, program: &str) -> Result<CString, LaunchError> {
    to_cstring(path.as_os_str().as_bytes(), program)
}

fn prepare(pipeline: &Pipeline, index: usize, segment: &Segment) -> Result<Prepared, LaunchError> {
    let program = segment.program();
    let argv = segment
        .argv
        .iter()
        .map(|arg| to_cstring(arg.as_bytes(), program))
        .collect::<Result<Vec<_>, _>>()?;

    let last = pipeline.segments().len() - 1;
    let input = match pipeline.input() {
        Some(path) if index == 0 => Some(path_cstring(path, program)?),
        _ => None,
    };
    let output = match pipeline.output() {
        Some((path, mode)) if index == last => Some((path_cstring(path, program)?, mode)),
        _ => None,
    };
    Ok(Prepared {
        argv,
        input,
        output,
    })
}

/// Start one child per segment, left to right.
///
/// A segment that cannot be started is recorded in `failures` and the
/// remaining segments are still attempted. The parent keeps its pipe
/// handles; closing them is the caller's job.
pub fn spawn(pipeline: &Pipeline) -> Spawned {
    let mut spawned = Spawned::default();
    let pipe_fds = pipeline.pipe_fds();

    for (index, segment) in pipeline.segments().iter().enumerate() {
        let prepared = match prepare(pipeline, index, segment) {
            Ok(p) => p,
            Err(e) => {
                spawned.failures.push(e);
                continue;
            }
        };

        // SAFETY: the child only rewires descriptors and then execs or _exits.
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Parent { child }) => {
                log::debug!(
                    "spawned {} as pid {child} (segment {index})",
                    segment.program()
                );
                spawned.children.push(ChildProcess {
                    pid: child,
                    index,
                    program: segment.program().to_string(),
                });
            }
            Ok(ForkResult::Child) => exec_child(pipeline, index, &prepared, &pipe_fds),
            Err(source) => spawned.failures.push(LaunchError::SpawnFailure {
                program: segment.program().to_string(),
                source,
            }),
        }
    }
    spawned
}

/// Child side: bind redirections and pipe ends, close the pipe batch, exec.
fn exec_child(pipeline: &Pipeline, index: usize, prepared: &Prepared, pipe_fds: &[RawFd]) -> ! {
    let last = pipeline.segments().len() - 1;

    if let Some(path) = &prepared.input
        && let Err(errno) = bind_file(path, OFlag::O_RDONLY, libc::STDIN_FILENO)
    {
        child_exit(ChildFailure::InputFileUnavailable, path.to_bytes(), errno);
    }
    if let Some((path, mode)) = &prepared.output {
        let flags = OFlag::O_WRONLY
            | OFlag::O_CREAT
            | match mode {
                OutputMode::Truncate => OFlag::O_TRUNC,
                OutputMode::Append => OFlag::O_APPEND,
            };
        if let Err(errno) = bind_file(path, flags, libc::STDOUT_FILENO) {
            child_exit(ChildFailure::OutputFileUnavailable, path.to_bytes(), errno);
        }
    }

    let pipes = pipeline.pipes();
    if index < last
        && let Err(errno) = unistd::dup2(pipes[index].write.as_raw_fd(), libc::STDOUT_FILENO)
    {
        child_exit(ChildFailure::ExecutionFailure, b"dup2", errno);
    }
    if index > 0
        && let Err(errno) = unistd::dup2(pipes[index - 1].read.as_raw_fd(), libc::STDIN_FILENO)
    {
        child_exit(ChildFailure::ExecutionFailure, b"dup2", errno);
    }
    for &fd in pipe_fds {
        let _ = unistd::close(fd);
    }
    // An ignored SIGPIPE survives exec; writers in a pipeline must die on it.
    // SAFETY: restoring the default disposition installs no handler.
    let _ = unsafe { signal::signal(Signal::SIGPIPE, SigHandler::SigDfl) };

    let program: &CStr = &prepared.argv[0];
    let Err(errno) = unistd::execvp(program, &prepared.argv);
    child_exit(ChildFailure::from_exec(errno), program.to_bytes(), errno)
}

/// Open `path` and move it onto `target`.
fn bind_file(path: &CStr, flags: OFlag, target: RawFd) -> nix::Result<()> {
    let fd = fcntl::open(path, flags, Mode::from_bits_truncate(CREATE_MODE))?;
    if fd != target {
        unistd::dup2(fd, target)?;
        unistd::close(fd)?;
    }
    Ok(())
}

/// Report a child-side failure on stderr and terminate without running any
/// of the parent's exit handlers or flushing its buffers.
fn child_exit(failure: ChildFailure, subject: &[u8], errno: Errno) -> ! {
    // SAFETY: fd 2 stays open; ManuallyDrop keeps the File from closing it.
    let stderr = ManuallyDrop::new(unsafe { File::from_raw_fd(libc::STDERR_FILENO) });
    let mut out: &File = &stderr;
    let _ = out.write_all(b"pipesh: ");
    let _ = out.write_all(subject);
    let _ = out.write_all(b": ");
    let _ = out.write_all(failure.as_str().as_bytes());
    let _ = out.write_all(b" (");
    let _ = out.write_all(errno.desc().as_bytes());
    let _ = out.write_all(b")\n");
    // SAFETY: _exit is async-signal-safe and touches no inherited state.
    unsafe { libc::_exit(failure.exit_code()) }
}
