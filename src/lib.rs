//! sigbench library - decoding, aggregation, and verification for the
//! isogeny signature benchmark harness.
//!
//! The harness drives an external signature test executable, decodes its
//! line-oriented trace stream into typed per-iteration records, aggregates
//! cycle counts per mode and operation, and independently re-derives the
//! recorded cryptographic invariants.
//!
//! # Modules
//!
//! - [`decode`] - positional decoding of the trace stream
//! - [`emitter`] - invocation of the external test executable
//! - [`field_check`] - modular-inverse identity verification
//! - [`psi_trace`] - PsiS sign-trace collection and export
//! - [`stats`] - per-mode aggregate statistics
//! - [`report`] - text and JSON report rendering
//! - [`plot`] - scatter plot rendering

pub mod decode;
pub mod emitter;
pub mod field_check;
pub mod plot;
pub mod psi_trace;
pub mod report;
pub mod stats;
