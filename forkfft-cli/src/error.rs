//! Node Errors
//!
//! Every variant is fatal for the node that detects it. A child's failure
//! reaches its parent only as a non-zero exit status, which the parent turns
//! into [`NodeError::ChildExit`] and dies with in turn.

use forkfft_ipc::{DecodeError, LineError};
use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

/// Which of the two children of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    /// Receives samples 0, 2, 4, ...
    Even,
    /// Receives samples 1, 3, 5, ...
    Odd,
}

impl Half {
    /// Half that input index `index` is routed to
    pub fn of_index(index: usize) -> Self {
        if index % 2 == 0 { Half::Even } else { Half::Odd }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Half::Even => f.write_str("first (even) child"),
            Half::Odd => f.write_str("second (odd) child"),
        }
    }
}

/// Fatal conditions of a single node
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("input line {line_no}: {source}")]
    Decode {
        line_no: usize,
        #[source]
        source: DecodeError,
    },

    #[error("failed to read input: {0}")]
    Input(std::io::Error),

    #[error("no input")]
    NoInput,

    #[error("uneven input: {0} samples")]
    OddInputCount(usize),

    #[error("failed to create {half}: {source}")]
    ProcessCreation {
        half: Half,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to {half}: {source}")]
    ChildWrite {
        half: Half,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for {half}: {source}")]
    ChildWait {
        half: Half,
        #[source]
        source: std::io::Error,
    },

    #[error("{half} exited with {status}")]
    ChildExit { half: Half, status: ExitStatus },

    #[error("{half} did not exit within {timeout:?}")]
    ChildTimeout { half: Half, timeout: Duration },

    #[error("{half} produced incomplete output: expected {expected} lines, got {got}")]
    ChildOutputIncomplete {
        half: Half,
        expected: usize,
        got: usize,
    },

    #[error("{half} produced unreadable output: {source}")]
    ChildOutput {
        half: Half,
        #[source]
        source: LineError,
    },

    #[error("failed to write output: {0}")]
    Output(std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl NodeError {
    /// Classify a failure while reading this node's own input.
    pub(crate) fn from_input(err: LineError) -> Self {
        match err {
            LineError::Decode { line_no, source } => NodeError::Decode { line_no, source },
            LineError::Io(e) => NodeError::Input(e),
            LineError::Incomplete { expected, got } => NodeError::Input(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("expected {expected} lines, got {got}"),
            )),
        }
    }

    /// Classify a failure while writing this node's own output.
    pub(crate) fn from_output(err: LineError) -> Self {
        match err {
            LineError::Io(e) => NodeError::Output(e),
            other => NodeError::Output(std::io::Error::other(other.to_string())),
        }
    }

    /// Classify a failure while collecting a child's results.
    pub(crate) fn from_child_output(half: Half, err: LineError) -> Self {
        match err {
            LineError::Incomplete { expected, got } => NodeError::ChildOutputIncomplete {
                half,
                expected,
                got,
            },
            source => NodeError::ChildOutput { half, source },
        }
    }

    /// The decoder failure behind this error, if the input itself was bad
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            NodeError::Decode { source, .. } => Some(source),
            NodeError::ChildOutput { source, .. } => source.decode_error(),
            _ => None,
        }
    }
}
