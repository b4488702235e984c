//! Process-Tree Orchestrator
//!
//! Runs one node of the recursive transform:
//!
//! ```text
//! Reading ─┬─ 1 sample ──▶ BaseCase ─────────────────────────────▶ done
//!          ├─ 0 samples ─▶ NoInput
//!          ├─ odd count ─▶ OddInputCount
//!          └─ even ──────▶ Forking ─▶ Distributing ─▶ AwaitingChildren
//!                                                          │
//!              done ◀── Emitting ◀── Combining ◀── Collecting
//! ```
//!
//! Output layout for `N` inputs: lines `0..N/2` are the butterfly sums in
//! increasing `k`, lines `N/2..N` the differences in increasing `k`. Sums are
//! written as they are produced; differences are held back until every sum
//! has been written.

use crate::config::{ExecutionMode, NodeConfig};
use crate::error::{Half, NodeError};
use crate::supervisor::transform_in_children;
use forkfft_core::{ComplexSample, butterfly, format_sample};
use forkfft_ipc::{LineReader, LineWriter, read_all_samples};
use std::io::{Read, Write};
use tracing::{debug, debug_span, trace};

/// What a node did, for callers that want more than the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeOutcome {
    /// Number of samples this node read
    pub samples: usize,
    /// Child processes spawned by this node (not counting descendants)
    pub children_spawned: usize,
}

/// Drives one node of the tree
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: NodeConfig,
}

impl Orchestrator {
    /// Create an orchestrator for a node with this configuration
    pub fn new(config: NodeConfig) -> Self {
        Self { config }
    }

    /// Node configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Read every sample from `input`, transform, write results to `output`.
    ///
    /// Nothing is written to `output` unless the whole node succeeds up to
    /// the combine step.
    pub fn run<R: Read, W: Write>(&self, input: R, output: W) -> Result<NodeOutcome, NodeError> {
        let _span = debug_span!("node", depth = self.config.depth).entered();

        let samples = read_all_samples(input).map_err(NodeError::from_input)?;
        let n = samples.len();
        debug!(samples = n, "read input");

        let mut writer = LineWriter::new(output);
        match n {
            1 => {
                trace!("base case");
                writer
                    .write_text(&format_sample(samples[0], self.config.precision))
                    .and_then(|()| writer.flush())
                    .map_err(NodeError::from_output)?;
                return Ok(NodeOutcome {
                    samples: n,
                    children_spawned: 0,
                });
            }
            0 => return Err(NodeError::NoInput),
            n if n % 2 != 0 => return Err(NodeError::OddInputCount(n)),
            _ => {}
        }

        let (even_results, odd_results) = match self.config.mode {
            ExecutionMode::Process => transform_in_children(&self.config, &samples)?,
            ExecutionMode::InProcess => self.transform_in_process(&samples)?,
        };

        self.combine_and_emit(&even_results, &odd_results, &mut writer)?;
        debug!(lines = n, "emitted results");

        Ok(NodeOutcome {
            samples: n,
            children_spawned: if self.config.mode.spawns_children() { 2 } else { 0 },
        })
    }

    fn combine_and_emit<W: Write>(
        &self,
        even_results: &[ComplexSample],
        odd_results: &[ComplexSample],
        writer: &mut LineWriter<W>,
    ) -> Result<(), NodeError> {
        let n = even_results.len() * 2;
        let precision = self.config.precision;
        let mut differences = Vec::with_capacity(even_results.len());

        for (k, (&even, &odd)) in even_results.iter().zip(odd_results).enumerate() {
            let pair = butterfly(even, odd, k, n);
            writer
                .write_text(&format_sample(pair.sum, precision))
                .map_err(NodeError::from_output)?;
            differences.push(pair.difference);
        }

        for difference in differences {
            writer
                .write_text(&format_sample(difference, precision))
                .map_err(NodeError::from_output)?;
        }
        writer.flush().map_err(NodeError::from_output)
    }

    /// Same recursion as the process tree, with each child run as a nested
    /// node over in-memory buffers. Input and output still go through the
    /// line protocol, so rounding matches a process run exactly.
    fn transform_in_process(
        &self,
        samples: &[ComplexSample],
    ) -> Result<(Vec<ComplexSample>, Vec<ComplexSample>), NodeError> {
        let child = Orchestrator::new(self.config.child());
        let half_len = samples.len() / 2;

        let mut halves = [Vec::new(), Vec::new()];
        for (slot, offset) in halves.iter_mut().zip([0usize, 1]) {
            let mut input = LineWriter::new(Vec::new());
            for sample in samples.iter().skip(offset).step_by(2) {
                input.write_sample(*sample).map_err(NodeError::from_output)?;
            }
            let input = input.into_inner().map_err(NodeError::from_output)?;

            let mut output = Vec::new();
            child.run(input.as_slice(), &mut output)?;
            *slot = LineReader::new(output.as_slice())
                .read_exact_samples(half_len)
                .map_err(|e| NodeError::from_child_output(Half::of_index(offset), e))?;
        }

        let [even, odd] = halves;
        Ok((even, odd))
    }
}
