//! Text and JSON rendering of aggregate and verification results.

use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;

use crate::field_check::FieldCheckSummary;
use crate::stats::AggregateStat;

/// Render the aggregates as the harness's line format:
/// `<mode> <operation> average: <value>` followed by
/// `<mode> <operation> standard deviation: <value>`.
pub fn render_text(stats: &[AggregateStat]) -> String {
    let mut out = String::new();
    for stat in stats {
        let _ = writeln!(out, "{} {} average: {}", stat.group, stat.op, stat.mean);
        let _ = writeln!(
            out,
            "{} {} standard deviation: {}",
            stat.group, stat.op, stat.stddev
        );
    }
    out
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    aggregates: &'a [AggregateStat],
}

/// Render the aggregates as a JSON document.
pub fn render_json(stats: &[AggregateStat]) -> Result<String> {
    let report = JsonReport { aggregates: stats };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Render the field-check outcome: one line per failing record with the
/// claimed vs. recomputed value (hex, as the trace emits them), then a
/// summary line.
pub fn render_field_checks(summary: &FieldCheckSummary) -> String {
    let mut out = String::new();
    for failure in &summary.failures {
        let _ = writeln!(
            out,
            "field check {} failed: claimed {:x}, recomputed {:x}",
            failure.index, failure.claimed, failure.recomputed
        );
    }
    let _ = writeln!(
        out,
        "field checks: {} passed, {} failed",
        summary.passed(),
        summary.failures.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{ModeGroup, OpKind};
    use crate::field_check::FieldCheckFailure;
    use num_bigint::BigUint;

    fn stat(group: ModeGroup, op: OpKind, mean: f64, stddev: f64) -> AggregateStat {
        AggregateStat {
            group,
            op,
            count: 3,
            mean,
            stddev,
            samples: vec![],
        }
    }

    #[test]
    fn test_render_text_line_format() {
        let stats = vec![
            stat(ModeGroup::Plain, OpKind::Sign, 20.0, 1.5),
            stat(ModeGroup::Plain, OpKind::Verify, 15.0, 0.5),
        ];
        let text = render_text(&stats);
        assert!(text.contains("plain sign average: 20\n"));
        assert!(text.contains("plain sign standard deviation: 1.5\n"));
        assert!(text.contains("plain verify average: 15\n"));
        assert!(text.contains("plain verify standard deviation: 0.5\n"));
    }

    #[test]
    fn test_render_text_omitted_groups_are_absent() {
        let stats = vec![stat(ModeGroup::Compressed, OpKind::Sign, 9.0, 0.0)];
        let text = render_text(&stats);
        assert!(text.contains("compressed sign average"));
        assert!(!text.contains("plain"));
        assert!(!text.contains("batched"));
    }

    #[test]
    fn test_render_json_shape() {
        let stats = vec![stat(ModeGroup::CompressedBatched, OpKind::Verify, 3.5, 0.25)];
        let json = render_json(&stats).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entry = &value["aggregates"][0];
        assert_eq!(entry["group"], "compressed-batched");
        assert_eq!(entry["op"], "verify");
        assert_eq!(entry["count"], 3);
        assert_eq!(entry["mean"], 3.5);
        // Raw samples stay out of the report.
        assert!(entry.get("samples").is_none());
    }

    #[test]
    fn test_render_field_checks_reports_failures_and_summary() {
        let summary = FieldCheckSummary {
            total: 3,
            failures: vec![FieldCheckFailure {
                index: 1,
                claimed: BigUint::from(255u32),
                recomputed: BigUint::from(254u32),
            }],
        };
        let text = render_field_checks(&summary);
        assert!(text.contains("field check 1 failed: claimed ff, recomputed fe"));
        assert!(text.contains("field checks: 2 passed, 1 failed"));
    }

    #[test]
    fn test_render_field_checks_all_passing() {
        let summary = FieldCheckSummary {
            total: 4,
            failures: vec![],
        };
        let text = render_field_checks(&summary);
        assert_eq!(text, "field checks: 4 passed, 0 failed\n");
    }
}
