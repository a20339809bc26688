use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use num_bigint::BigUint;
use num_traits::Num;

use sigbench::decode::{decode_cycles, ModeGroup, OpKind};
use sigbench::emitter::{read_trace_file, run_emitter, GroupCounts};
use sigbench::field_check::{decode_field_checks, run_field_checks, sig_prime};
use sigbench::plot::plot;
use sigbench::psi_trace::{collect_trace, decode_sign_traces};
use sigbench::report;
use sigbench::stats::{AggregateStat, StatBuilder, StddevMode};

#[derive(Debug, Parser)]
#[command(
    name = "sigbench",
    about = "Benchmark aggregation and verification harness for the isogeny signature test binary"
)]
struct Command {
    #[arg(short, long)]
    verbose: bool,
    /// Path to the signature test executable to benchmark.
    #[arg(long)]
    emitter: Option<PathBuf>,
    /// Decode a previously captured benchmark trace instead of running the emitter.
    #[arg(long)]
    trace_file: Option<PathBuf>,
    /// Iterations for the plain signature mode.
    #[arg(long, default_value = "0")]
    plain: usize,
    /// Iterations for the batched-inversions mode.
    #[arg(long, default_value = "0")]
    batched: usize,
    /// Iterations for the compressed mode.
    #[arg(long, default_value = "0")]
    compressed: usize,
    /// Iterations for the compressed + batched mode.
    #[arg(long, default_value = "0")]
    compressed_batched: usize,
    /// Directory to write per-mode scatter plots into.
    #[arg(long)]
    plot_dir: Option<PathBuf>,
    /// Emit the aggregate report as JSON instead of text lines.
    #[arg(long)]
    json: bool,
    /// Reproduce the reference harness's truncated stddev loop.
    #[arg(long)]
    legacy_stddev: bool,
    /// File of recorded (a, b, comp, bit) tuples to verify.
    #[arg(long)]
    field_check: Option<PathBuf>,
    /// Override the working prime modulus (hex) for the field checks.
    #[arg(long)]
    modulus: Option<String>,
    /// File of recorded PsiS trace tuples to collect.
    #[arg(long)]
    psi_trace: Option<PathBuf>,
    /// Directory to export the collected PsiS columns into.
    #[arg(long)]
    psi_out: Option<PathBuf>,
}

fn benchmark(opts: &Command) -> Result<()> {
    let counts = GroupCounts {
        plain: opts.plain,
        batched: opts.batched,
        compressed: opts.compressed,
        compressed_batched: opts.compressed_batched,
    };
    let text = match (&opts.trace_file, &opts.emitter) {
        (Some(file), _) => read_trace_file(file)?,
        (None, Some(emitter)) => {
            if opts.verbose {
                eprintln!("Running {} with {:?}", emitter.display(), counts);
            }
            run_emitter(emitter, &counts)?
        }
        (None, None) => {
            bail!("benchmarking needs either --emitter or --trace-file")
        }
    };

    let sizes = counts.group_sizes();
    let groups = decode_cycles(text.lines(), &sizes)
        .context("failed to decode the benchmark trace")?;
    if opts.verbose {
        for (group, records) in &groups {
            eprintln!("Decoded {} records for {}", records.len(), group);
        }
    }

    let mode = if opts.legacy_stddev {
        StddevMode::LegacyTruncated
    } else {
        StddevMode::Population
    };
    let mut builder = StatBuilder::new(mode);
    for (_, records) in &groups {
        builder.extend(records);
    }
    let stats = builder.finish();

    if opts.json {
        println!("{}", report::render_json(&stats)?);
    } else {
        print!("{}", report::render_text(&stats));
    }

    if let Some(dir) = &opts.plot_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        for group in ModeGroup::ALL {
            let sign = samples_for(&stats, group, OpKind::Sign);
            let verify = samples_for(&stats, group, OpKind::Verify);
            if sign.is_empty() && verify.is_empty() {
                continue;
            }
            let path = dir.join(format!("{}_cycles.svg", group.as_str().replace('-', "_")));
            plot(
                sign,
                verify,
                &format!("{} sign/verify cycles", group),
                &path,
            )?;
            if opts.verbose {
                eprintln!("Wrote {}", path.display());
            }
        }
    }
    Ok(())
}

fn samples_for(stats: &[AggregateStat], group: ModeGroup, op: OpKind) -> &[u64] {
    stats
        .iter()
        .find(|s| s.group == group && s.op == op)
        .map(|s| s.samples.as_slice())
        .unwrap_or(&[])
}

fn field_checks(opts: &Command, path: &Path) -> Result<()> {
    let text = read_trace_file(path)?;
    let records =
        decode_field_checks(text.lines()).context("failed to decode the field-check trace")?;
    let p = match &opts.modulus {
        Some(hex) => BigUint::from_str_radix(hex.trim_start_matches("0x"), 16)
            .context("--modulus is not a valid hex integer")?,
        None => sig_prime(),
    };
    if opts.verbose {
        eprintln!("Checking {} field records against p = {:x}", records.len(), p);
    }
    let summary = run_field_checks(&records, &p);
    print!("{}", report::render_field_checks(&summary));
    Ok(())
}

fn psi_traces(opts: &Command, path: &Path) -> Result<()> {
    let text = read_trace_file(path)?;
    let records =
        decode_sign_traces(text.lines()).context("failed to decode the PsiS trace")?;
    let columns = collect_trace(&records);
    println!("psi trace: collected {} iterations", columns.len());
    if let Some(dir) = &opts.psi_out {
        columns.write_to_dir(dir)?;
        if opts.verbose {
            eprintln!("Exported PsiS columns to {}", dir.display());
        }
    }
    Ok(())
}

fn run(opts: Command) -> Result<()> {
    let benchmarking = opts.plain + opts.batched + opts.compressed + opts.compressed_batched > 0
        || opts.trace_file.is_some();
    if !benchmarking && opts.field_check.is_none() && opts.psi_trace.is_none() {
        bail!("nothing to do: give mode iteration counts, --field-check, or --psi-trace");
    }

    if benchmarking {
        benchmark(&opts)?;
    }
    if let Some(path) = &opts.field_check {
        field_checks(&opts, path)?;
    }
    if let Some(path) = &opts.psi_trace {
        psi_traces(&opts, path)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let opts = Command::parse();
    run(opts)
}
