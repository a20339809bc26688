//! Invocation of the external signature test executable.
//!
//! The executable takes the four mode iteration counts as positional
//! arguments and writes the trace stream to stdout. The harness drains the
//! whole stream before any decoding starts; there is no streaming contract
//! at this boundary.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::decode::ModeGroup;

/// Iteration counts for the four benchmark modes, in emission order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupCounts {
    pub plain: usize,
    pub batched: usize,
    pub compressed: usize,
    pub compressed_batched: usize,
}

impl GroupCounts {
    /// The ordered (mode, iteration count) list the decoder partitions by.
    pub fn group_sizes(&self) -> Vec<(ModeGroup, usize)> {
        vec![
            (ModeGroup::Plain, self.plain),
            (ModeGroup::Batched, self.batched),
            (ModeGroup::Compressed, self.compressed),
            (ModeGroup::CompressedBatched, self.compressed_batched),
        ]
    }

    pub fn total(&self) -> usize {
        self.plain + self.batched + self.compressed + self.compressed_batched
    }
}

/// Run the test executable and return its stdout, fully drained.
///
/// A non-zero exit or non-UTF-8 output is an error; the trace cannot be
/// trusted either way.
pub fn run_emitter(path: &Path, counts: &GroupCounts) -> Result<String> {
    let output = Command::new(path)
        .arg(counts.plain.to_string())
        .arg(counts.batched.to_string())
        .arg(counts.compressed.to_string())
        .arg(counts.compressed_batched.to_string())
        .output()
        .with_context(|| format!("failed to run emitter {}", path.display()))?;
    if !output.status.success() {
        bail!(
            "emitter {} exited with {}: {}",
            path.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    String::from_utf8(output.stdout)
        .with_context(|| format!("emitter {} produced non-UTF-8 output", path.display()))
}

/// Read a previously captured trace from a file.
pub fn read_trace_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read trace file {}", path.display()))
}
