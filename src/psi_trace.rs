//! Collection of the PsiS sign-trace values for external verification.
//!
//! Each signing iteration records ten values: the curve coefficient A, the
//! isogeny image psi(S), the commitment points R1 and R2, the scalars a and
//! b, and the selector bit. The harness only decodes and columnizes them; the
//! actual isogeny-image consistency relation is checked by an external
//! algebra-system script that consumes the exported per-field sequences.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use num_bigint::BigUint;

use crate::decode::{bit_from_value, scan_rows, Base, DecodeError, FieldSpec, ScanLimit};

/// Ten-wide PsiS trace cycle. Curve coordinates and scalars are decimal
/// unbounded integers; no field reduction happens at parse time.
pub const PSI_TRACE_SCHEMA: [FieldSpec; 10] = [
    FieldSpec::prefixed("A: ", Base::Dec, "A"),
    FieldSpec::prefixed("psiS.x: ", Base::Dec, "psiS.x"),
    FieldSpec::prefixed("psiS.y: ", Base::Dec, "psiS.y"),
    FieldSpec::prefixed("R1.x: ", Base::Dec, "R1.x"),
    FieldSpec::prefixed("R1.y: ", Base::Dec, "R1.y"),
    FieldSpec::prefixed("R2.x: ", Base::Dec, "R2.x"),
    FieldSpec::prefixed("R2.y: ", Base::Dec, "R2.y"),
    FieldSpec::prefixed("Sign a: ", Base::Dec, "a"),
    FieldSpec::prefixed("Sign b: ", Base::Dec, "b"),
    FieldSpec::prefixed("Sign bit: ", Base::Dec, "bit"),
];

/// One recorded signing iteration's intermediate values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignTraceRecord {
    pub a_coeff: BigUint,
    pub psis_x: BigUint,
    pub psis_y: BigUint,
    pub r1_x: BigUint,
    pub r1_y: BigUint,
    pub r2_x: BigUint,
    pub r2_y: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub bit: u8,
}

/// Per-field ordered sequences, indexed consistently by iteration. Every
/// column has the same length: a record only exists once all ten of its
/// fields decoded.
#[derive(Debug, Clone, Default)]
pub struct TraceColumns {
    pub a_coeff: Vec<BigUint>,
    pub psis_x: Vec<BigUint>,
    pub psis_y: Vec<BigUint>,
    pub r1_x: Vec<BigUint>,
    pub r1_y: Vec<BigUint>,
    pub r2_x: Vec<BigUint>,
    pub r2_y: Vec<BigUint>,
    pub a: Vec<BigUint>,
    pub b: Vec<BigUint>,
    pub bit: Vec<u8>,
}

impl TraceColumns {
    pub fn len(&self) -> usize {
        self.a_coeff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a_coeff.is_empty()
    }

    /// Export the columns, one decimal-lines file per field, for the external
    /// algebra-system check.
    pub fn write_to_dir(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        write_column(dir, "A.txt", &self.a_coeff)?;
        write_column(dir, "psiS_x.txt", &self.psis_x)?;
        write_column(dir, "psiS_y.txt", &self.psis_y)?;
        write_column(dir, "R1_x.txt", &self.r1_x)?;
        write_column(dir, "R1_y.txt", &self.r1_y)?;
        write_column(dir, "R2_x.txt", &self.r2_x)?;
        write_column(dir, "R2_y.txt", &self.r2_y)?;
        write_column(dir, "a.txt", &self.a)?;
        write_column(dir, "b.txt", &self.b)?;

        let mut bits = String::new();
        for bit in &self.bit {
            let _ = writeln!(bits, "{}", bit);
        }
        let path = dir.join("bit.txt");
        std::fs::write(&path, bits).with_context(|| format!("failed to write {}", path.display()))
    }
}

fn write_column(dir: &Path, name: &str, column: &[BigUint]) -> Result<()> {
    let mut text = String::new();
    for value in column {
        let _ = writeln!(text, "{}", value);
    }
    let path = dir.join(name);
    std::fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))
}

/// Decode a recorded PsiS trace stream into typed records.
///
/// A final iteration cut short before its tenth field fails with
/// [`DecodeError::ShortStream`]; it is never silently truncated.
pub fn decode_sign_traces<I, S>(lines: I) -> Result<Vec<SignTraceRecord>, DecodeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let width = PSI_TRACE_SCHEMA.len();
    let rows = scan_rows(lines, &PSI_TRACE_SCHEMA, ScanLimit::ToEnd)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let mut fields = row.into_iter();
            let mut next = || fields.next().expect("schema is 10 wide");
            let a_coeff = next();
            let psis_x = next();
            let psis_y = next();
            let r1_x = next();
            let r1_y = next();
            let r2_x = next();
            let r2_y = next();
            let a = next();
            let b = next();
            let bit_value = next();
            let bit = bit_from_value(&bit_value, "bit", (i + 1) * width)?;
            Ok(SignTraceRecord {
                a_coeff,
                psis_x,
                psis_y,
                r1_x,
                r1_y,
                r2_x,
                r2_y,
                a,
                b,
                bit,
            })
        })
        .collect()
}

/// Columnize decoded records into per-field sequences.
pub fn collect_trace(records: &[SignTraceRecord]) -> TraceColumns {
    let mut columns = TraceColumns::default();
    for rec in records {
        columns.a_coeff.push(rec.a_coeff.clone());
        columns.psis_x.push(rec.psis_x.clone());
        columns.psis_y.push(rec.psis_y.clone());
        columns.r1_x.push(rec.r1_x.clone());
        columns.r1_y.push(rec.r1_y.clone());
        columns.r2_x.push(rec.r2_x.clone());
        columns.r2_y.push(rec.r2_y.clone());
        columns.a.push(rec.a.clone());
        columns.b.push(rec.b.clone());
        columns.bit.push(rec.bit);
    }
    columns
}
