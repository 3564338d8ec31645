//! Cross-backend verification for vecadd
//!
//! The scalar baseline defines ground truth. Every other backend's result is
//! checked against it with [`verify`], and [`ParityHarness`] collects the
//! outcomes into a [`ParityReport`].

pub mod harness;
pub mod inputs;
pub mod report;
pub mod verify;

pub use harness::ParityHarness;
pub use inputs::{benchmark_inputs, InputElement, A_START, B_START};
pub use report::{BackendOutcome, BackendRun, ParityReport};
pub use verify::{verify, Mismatch, MismatchKind, VerificationResult, DEFAULT_EPSILON};
