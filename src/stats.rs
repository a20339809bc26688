//! Per-mode aggregate statistics over decoded cycle records.
//!
//! Samples are kept in iteration order because the scatter plots correlate
//! iteration index against cycle count. Zero-iteration groups produce no
//! aggregate at all; they are omitted from every report rather than
//! zero-filled.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::decode::{CycleRecord, ModeGroup, OpKind};

/// Which standard-deviation formula to apply.
///
/// The original harness summed squared deviations over the first `n-1`
/// samples while still dividing by `n`, almost certainly an off-by-one rather
/// than a deliberate estimator. The default here is the correct full-`n`
/// population formula; `LegacyTruncated` reproduces the original loop for
/// calibration parity with previously published numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StddevMode {
    #[default]
    Population,
    LegacyTruncated,
}

/// Aggregate statistics for one (mode, operation) pair.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStat {
    pub group: ModeGroup,
    pub op: OpKind,
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    /// Raw samples in iteration order, for plotting. Not serialized; the
    /// report carries aggregates only.
    #[serde(skip)]
    pub samples: Vec<u64>,
}

/// Arithmetic mean. Only meaningful for non-empty sample sets; callers omit
/// empty groups before getting here.
pub fn mean(samples: &[u64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&x| x as f64).sum::<f64>() / samples.len() as f64
}

/// Population standard deviation (divisor `n`, not `n-1`).
///
/// `LegacyTruncated` excludes the last sample from the sum of squared
/// deviations while keeping the `n` divisor, matching the original harness.
pub fn stddev(samples: &[u64], mode: StddevMode) -> f64 {
    let n = samples.len();
    if n == 0 {
        return 0.0;
    }
    let m = mean(samples);
    let upper = match mode {
        StddevMode::Population => n,
        StddevMode::LegacyTruncated => n - 1,
    };
    let sum_sq: f64 = samples[..upper]
        .iter()
        .map(|&x| {
            let d = x as f64 - m;
            d * d
        })
        .sum();
    (sum_sq / n as f64).sqrt()
}

/// Aggregate one (mode, operation) pair out of a record list.
///
/// Returns `None` when the group has no samples for that operation, so that
/// zero-iteration groups never surface as a zero-valued aggregate.
pub fn aggregate(
    records: &[CycleRecord],
    group: ModeGroup,
    op: OpKind,
    mode: StddevMode,
) -> Option<AggregateStat> {
    let samples: Vec<u64> = records
        .iter()
        .filter(|r| r.group == group && r.op == op)
        .map(|r| r.cycles)
        .collect();
    if samples.is_empty() {
        return None;
    }
    Some(AggregateStat {
        group,
        op,
        count: samples.len(),
        mean: mean(&samples),
        stddev: stddev(&samples, mode),
        samples,
    })
}

/// Accumulates samples keyed by (mode, operation) across the whole decode
/// pass, then produces the per-pair aggregates in mode order.
#[derive(Debug, Default)]
pub struct StatBuilder {
    mode: StddevMode,
    samples: BTreeMap<(ModeGroup, OpKind), Vec<u64>>,
}

impl StatBuilder {
    pub fn new(mode: StddevMode) -> Self {
        StatBuilder {
            mode,
            samples: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, record: &CycleRecord) {
        self.samples
            .entry((record.group, record.op))
            .or_default()
            .push(record.cycles);
    }

    pub fn extend<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a CycleRecord>,
    {
        for record in records {
            self.record(record);
        }
    }

    /// Finish the pass. Empty pairs were never inserted, so the result
    /// contains exactly the non-empty (mode, operation) aggregates, ordered
    /// by mode then operation.
    pub fn finish(self) -> Vec<AggregateStat> {
        let mode = self.mode;
        self.samples
            .into_iter()
            .map(|((group, op), samples)| AggregateStat {
                group,
                op,
                count: samples.len(),
                mean: mean(&samples),
                stddev: stddev(&samples, mode),
                samples,
            })
            .collect()
    }
}
