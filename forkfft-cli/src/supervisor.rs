//! Child Process Supervision
//!
//! Spawns the two children of a node and moves samples across their pipes.
//!
//! ```text
//!                 input pipe (child stdin)
//!   parent ──────────────────────────────────▶ child
//!          ◀──────────────────────────────────
//!                 output pipe (child stdout)
//! ```
//!
//! All four pipe ends are created close-on-exec. The child-side ends are moved
//! into the child's stdin/stdout by `Command`; the parent closes its copies as
//! soon as the child is running, so a sibling never inherits them and every
//! reader eventually observes end-of-stream.
//!
//! The parent writes all of a child's input, closes it, waits for the child to
//! exit, and only then reads the child's output. If a child's output exceeds
//! the pipe's capacity, the child blocks on its write while the parent blocks
//! on the wait and neither makes progress. Inputs small enough for the
//! intermediate results to fit in a pipe buffer are unaffected; larger trees
//! need `wait_timeout` to turn the hang into an error.

use crate::config::NodeConfig;
use crate::error::{Half, NodeError};
use forkfft_core::ComplexSample;
use forkfft_ipc::{LineReader, LineWriter};
use std::env;
use std::fs::File;
use std::io;
use std::os::fd::{FromRawFd, OwnedFd, RawFd};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Interval between exit-status polls when a wait timeout is configured
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Create a pipe pair, returning (read_end, write_end), both close-on-exec.
///
/// On Linux the flag is set atomically by `pipe2`, so a concurrent spawn on
/// another thread cannot inherit either end.
#[cfg(target_os = "linux")]
fn create_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds = [0 as RawFd; 2];
    let ret = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe2() succeeded, so both descriptors are open and owned by nobody else
    Ok(unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) })
}

/// Create a pipe pair, returning (read_end, write_end), both close-on-exec.
#[cfg(not(target_os = "linux"))]
fn create_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds = [0 as RawFd; 2];
    let ret = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: pipe() succeeded, so both descriptors are open and owned by nobody else
    let (read_end, write_end) =
        unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };
    for fd in [&read_end, &write_end] {
        set_cloexec(fd)?;
    }
    Ok((read_end, write_end))
}

#[cfg(not(target_os = "linux"))]
fn set_cloexec(fd: &OwnedFd) -> io::Result<()> {
    use std::os::fd::AsRawFd;

    let raw = fd.as_raw_fd();
    unsafe {
        let flags = libc::fcntl(raw, libc::F_GETFD);
        if flags == -1 || libc::fcntl(raw, libc::F_SETFD, flags | libc::FD_CLOEXEC) == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Parent-side ends of the two pipes connecting a node to one child
pub struct ChildLink {
    input: Option<LineWriter<File>>,
    output: LineReader<File>,
}

impl ChildLink {
    fn new(input: OwnedFd, output: OwnedFd) -> Self {
        Self {
            input: Some(LineWriter::new(File::from(input))),
            output: LineReader::new(File::from(output)),
        }
    }
}

/// One spawned child node and its pipes
pub struct ChildNode {
    half: Half,
    child: Child,
    link: ChildLink,
    status: Option<ExitStatus>,
}

impl ChildNode {
    /// Spawn `binary` with no arguments, stdin and stdout wired to fresh pipes.
    pub fn spawn(
        binary: &Path,
        half: Half,
        env: &[(&'static str, String)],
    ) -> Result<Self, NodeError> {
        let creation = |source| NodeError::ProcessCreation { half, source };

        // input pipe: parent writes → child stdin
        let (in_read, in_write) = create_pipe().map_err(creation)?;
        // output pipe: child stdout → parent reads
        let (out_read, out_write) = create_pipe().map_err(creation)?;

        let mut command = Command::new(binary);
        command
            .stdin(Stdio::from(in_read))
            .stdout(Stdio::from(out_write))
            .stderr(Stdio::inherit());
        for (key, value) in env {
            command.env(key, value);
        }

        let child = command.spawn().map_err(creation)?;
        // Release the child-side ends held by the command
        drop(command);

        trace!(pid = child.id(), %half, "spawned child");
        Ok(Self {
            half,
            child,
            link: ChildLink::new(in_write, out_read),
            status: None,
        })
    }

    /// Which half of the input this child computes
    pub fn half(&self) -> Half {
        self.half
    }

    /// OS process id
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Queue one sample for the child's stdin.
    pub fn write_sample(&mut self, sample: ComplexSample) -> Result<(), NodeError> {
        let half = self.half;
        let writer = self.link.input.as_mut().ok_or_else(|| NodeError::ChildWrite {
            half,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "input already closed"),
        })?;
        writer
            .write_sample(sample)
            .map_err(|e| child_write_error(half, e))
    }

    /// Flush and close the child's stdin so it sees end-of-input.
    pub fn close_input(&mut self) -> Result<(), NodeError> {
        if let Some(writer) = self.link.input.take() {
            let file = writer
                .into_inner()
                .map_err(|e| child_write_error(self.half, e))?;
            drop(file);
        }
        Ok(())
    }

    /// Block until the child exits, or until `deadline` passes.
    ///
    /// A child still running at the deadline is killed and reaped.
    pub fn wait(&mut self, deadline: Option<(Instant, Duration)>) -> Result<ExitStatus, NodeError> {
        if let Some(status) = self.status {
            return Ok(status);
        }
        let status = match deadline {
            None => self.child.wait().map_err(|source| self.wait_error(source))?,
            Some((at, timeout)) => loop {
                let polled = self.child.try_wait();
                if let Some(status) = polled.map_err(|source| self.wait_error(source))? {
                    break status;
                }
                if Instant::now() >= at {
                    let _ = self.child.kill();
                    self.status = self.child.wait().ok();
                    return Err(NodeError::ChildTimeout {
                        half: self.half,
                        timeout,
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            },
        };
        trace!(pid = self.child.id(), half = %self.half, %status, "child exited");
        self.status = Some(status);
        Ok(status)
    }

    /// Read the child's `n` results, in the order it wrote them.
    pub fn collect(&mut self, n: usize) -> Result<Vec<ComplexSample>, NodeError> {
        self.link
            .output
            .read_exact_samples(n)
            .map_err(|e| NodeError::from_child_output(self.half, e))
    }

    /// Check if the child process is still running
    pub fn is_alive(&mut self) -> bool {
        if self.status.is_some() {
            return false;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.status = Some(status);
                false
            }
            Ok(None) => true,
            Err(_) => false,
        }
    }

    fn wait_error(&self, source: io::Error) -> NodeError {
        NodeError::ChildWait {
            half: self.half,
            source,
        }
    }
}

fn child_write_error(half: Half, err: forkfft_ipc::LineError) -> NodeError {
    match err {
        forkfft_ipc::LineError::Io(source) => NodeError::ChildWrite { half, source },
        other => NodeError::ChildWrite {
            half,
            source: io::Error::other(other.to_string()),
        },
    }
}

impl Drop for ChildNode {
    fn drop(&mut self) {
        // Close stdin first so a child blocked on input can finish
        self.link.input.take();
        if self.is_alive() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Compute both halves of a node's input in two child processes.
///
/// Returns `(even_results, odd_results)`, each `samples.len() / 2` long.
pub fn transform_in_children(
    config: &NodeConfig,
    samples: &[ComplexSample],
) -> Result<(Vec<ComplexSample>, Vec<ComplexSample>), NodeError> {
    let half_len = samples.len() / 2;
    let binary = match &config.executable {
        Some(path) => path.clone(),
        None => env::current_exe().map_err(|source| NodeError::ProcessCreation {
            half: Half::Even,
            source,
        })?,
    };
    let env = config.child_env();

    // Forking
    let mut even = ChildNode::spawn(&binary, Half::Even, &env)?;
    let mut odd = ChildNode::spawn(&binary, Half::Odd, &env)?;
    debug!(
        depth = config.depth,
        even_pid = even.id(),
        odd_pid = odd.id(),
        "spawned children"
    );

    // Distributing
    for (index, sample) in samples.iter().enumerate() {
        match Half::of_index(index) {
            Half::Even => even.write_sample(*sample)?,
            Half::Odd => odd.write_sample(*sample)?,
        }
    }
    even.close_input()?;
    odd.close_input()?;
    trace!(depth = config.depth, per_child = half_len, "distributed input");

    // AwaitingChildren: reap both before judging either.
    // A deadline beyond what `Instant` can represent never arrives.
    let deadline = config
        .wait_timeout
        .and_then(|timeout| Instant::now().checked_add(timeout).map(|at| (at, timeout)));
    let even_status = even.wait(deadline);
    let odd_status = odd.wait(deadline);
    for (half, status) in [(Half::Even, even_status), (Half::Odd, odd_status)] {
        let status = status?;
        if !status.success() {
            return Err(NodeError::ChildExit { half, status });
        }
    }

    // Collecting
    let even_results = even.collect(half_len)?;
    let odd_results = odd.collect(half_len)?;
    Ok((even_results, odd_results))
}
