//! Parity report: one entry per backend, reference first
//!
//! Separates backends that failed to execute from backends that executed
//! but produced wrong results.

use crate::verify::VerificationResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use vecadd_common::{Backend, DType, KernelError};

/// What happened to one backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackendOutcome<T> {
    /// The baseline run that defines ground truth
    Reference,
    /// Matched the reference
    Verified { max_abs_diff: f64 },
    /// Executed, but disagrees with the reference
    Mismatch { verification: VerificationResult<T> },
    /// Did not produce a result
    Failed { error: KernelError },
    /// Executed, but the reference failed so there is nothing to compare against
    Unverified,
}

/// One backend's entry in a [`ParityReport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendRun<T> {
    pub backend: Backend,
    pub kernel: String,
    pub elapsed_ms: f64,
    pub outcome: BackendOutcome<T>,
}

impl<T> BackendRun<T> {
    /// Reference ran or candidate verified
    pub fn passed(&self) -> bool {
        matches!(self.outcome, BackendOutcome::Reference | BackendOutcome::Verified { .. })
    }

    pub fn error(&self) -> Option<&KernelError> {
        match &self.outcome {
            BackendOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl<T: fmt::Display + Copy> fmt::Display for BackendRun<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = self.backend.to_string();
        write!(f, "{:<12} {:<15} {:>10.3} ms  ", backend, self.kernel, self.elapsed_ms)?;
        match &self.outcome {
            BackendOutcome::Reference => write!(f, "reference"),
            BackendOutcome::Verified { .. } => write!(f, "verified successfully"),
            BackendOutcome::Mismatch { verification } => {
                write!(f, "verification FAILED: produced wrong results ({})", verification)
            }
            BackendOutcome::Failed { error } => write!(f, "failed to execute: {}", error),
            BackendOutcome::Unverified => write!(f, "not verified: reference failed"),
        }
    }
}

/// Results of running one input pair through every backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityReport<T> {
    pub dtype: DType,
    pub elements: usize,
    pub epsilon: f64,
    /// Baseline first, then candidates in report order
    pub runs: Vec<BackendRun<T>>,
}

impl<T> ParityReport<T> {
    /// True when the reference ran and every candidate verified
    pub fn all_verified(&self) -> bool {
        self.runs.iter().all(BackendRun::passed)
    }

    pub fn run(&self, backend: Backend) -> Option<&BackendRun<T>> {
        self.runs.iter().find(|r| r.backend == backend)
    }

    /// Backends that did not produce a result
    pub fn failures(&self) -> impl Iterator<Item = &BackendRun<T>> {
        self.runs.iter().filter(|r| matches!(r.outcome, BackendOutcome::Failed { .. }))
    }

    /// Backends that produced wrong results
    pub fn mismatches(&self) -> impl Iterator<Item = &BackendRun<T>> {
        self.runs.iter().filter(|r| matches!(r.outcome, BackendOutcome::Mismatch { .. }))
    }
}

impl<T: Serialize> ParityReport<T> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as pretty JSON
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
    }
}

impl<T: fmt::Display + Copy> fmt::Display for ParityReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} x {} elements (epsilon {:e})", self.dtype, self.elements, self.epsilon)?;
        for run in &self.runs {
            writeln!(f, "  {}", run)?;
        }
        Ok(())
    }
}
