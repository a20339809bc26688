//! Modular-inverse identity verification over the working prime field.
//!
//! The test binary records (a, b, comp, bit) tuples where `comp` is supposed
//! to be `b/a mod p` (bit = 1) or `a/b mod p` (bit = 0). The check recomputes
//! the ratio from scratch with a Fermat inverse (`x^(p-2) mod p`, valid
//! because p is prime and x != 0 mod p) rather than trusting the binary's own
//! division. Failures are collected and reported after the full pass; they
//! never abort the run.

use num_bigint::BigUint;
use num_traits::Num;

use crate::decode::{bit_from_value, scan_rows, Base, DecodeError, FieldSpec, ScanLimit};

/// The working modulus of the signature parameter set, a 384-bit prime.
pub const SIG_PRIME_HEX: &str =
    "C968549F878A8EEB59B1A13F7CC76E3EE9867D6EBE876DA92B5045CB257480842909F97BADC6685606FE5D541F71C0E1";

/// Four-wide field-check cycle: three hex field elements and a decimal
/// selector bit, each behind an exact literal prefix.
pub const FIELD_CHECK_SCHEMA: [FieldSpec; 4] = [
    FieldSpec::prefixed("a: ", Base::Hex, "a"),
    FieldSpec::prefixed("b: ", Base::Hex, "b"),
    FieldSpec::prefixed("comp: ", Base::Hex, "comp"),
    FieldSpec::prefixed("bit: ", Base::Dec, "bit"),
];

/// One recorded modular-inverse-identity test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheckRecord {
    pub a: BigUint,
    pub b: BigUint,
    pub comp: BigUint,
    pub bit: u8,
}

/// One failing record: the claimed composite and what the identity actually
/// evaluates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCheckFailure {
    pub index: usize,
    pub claimed: BigUint,
    pub recomputed: BigUint,
}

/// Outcome of a full field-check pass.
#[derive(Debug, Clone, Default)]
pub struct FieldCheckSummary {
    pub total: usize,
    pub failures: Vec<FieldCheckFailure>,
}

impl FieldCheckSummary {
    pub fn passed(&self) -> usize {
        self.total - self.failures.len()
    }

    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The working modulus as a big integer.
pub fn sig_prime() -> BigUint {
    BigUint::from_str_radix(SIG_PRIME_HEX, 16).expect("prime literal is valid hex")
}

/// Decode a recorded field-check stream into typed records.
pub fn decode_field_checks<I, S>(lines: I) -> Result<Vec<FieldCheckRecord>, DecodeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let width = FIELD_CHECK_SCHEMA.len();
    let rows = scan_rows(lines, &FIELD_CHECK_SCHEMA, ScanLimit::ToEnd)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let mut fields = row.into_iter();
            let a = fields.next().expect("schema is 4 wide");
            let b = fields.next().expect("schema is 4 wide");
            let comp = fields.next().expect("schema is 4 wide");
            let bit_value = fields.next().expect("schema is 4 wide");
            let bit = bit_from_value(&bit_value, "bit", (i + 1) * width)?;
            Ok(FieldCheckRecord { a, b, comp, bit })
        })
        .collect()
}

/// Recompute the selected ratio from (a, b, bit) with a Fermat inverse.
pub fn recompute_composite(rec: &FieldCheckRecord, p: &BigUint) -> BigUint {
    let exp = p - &BigUint::from(2u32);
    match rec.bit {
        1 => rec.a.modpow(&exp, p) * &rec.b % p,
        _ => rec.b.modpow(&exp, p) * &rec.a % p,
    }
}

/// Check one record against the modular-inverse identity.
pub fn check_field_identity(rec: &FieldCheckRecord, p: &BigUint) -> bool {
    recompute_composite(rec, p) == rec.comp
}

/// Run the identity check over every record, collecting failures.
pub fn run_field_checks(records: &[FieldCheckRecord], p: &BigUint) -> FieldCheckSummary {
    let mut summary = FieldCheckSummary {
        total: records.len(),
        failures: Vec::new(),
    };
    for (index, rec) in records.iter().enumerate() {
        let recomputed = recompute_composite(rec, p);
        if recomputed != rec.comp {
            summary.failures.push(FieldCheckFailure {
                index,
                claimed: rec.comp.clone(),
                recomputed,
            });
        }
    }
    summary
}
