//! Error types for vecadd

use std::fmt;
use thiserror::Error;

/// Direction of a host/device copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    HostToDevice,
    DeviceToHost,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostToDevice => write!(f, "host-to-device"),
            Self::DeviceToHost => write!(f, "device-to-host"),
        }
    }
}

/// Kernel execution errors
///
/// Every variant means the kernel did not produce a valid result. Value
/// disagreements between backends are not errors; they are reported by the
/// verifier.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KernelError {
    #[error("size mismatch: a has {a} elements, b has {b}, result has {out}")]
    SizeMismatch { a: usize, b: usize, out: usize },

    #[error("device unavailable: {reason}")]
    DeviceUnavailable { reason: String },

    #[error("{direction} transfer failed: {reason}")]
    TransferFailed { direction: TransferDirection, reason: String },

    #[error("kernel launch failed: {reason}")]
    LaunchFailed { reason: String },

    #[error("unsupported hardware: requires {required}, available {available}")]
    UnsupportedHardware { required: String, available: String },

    #[error("unsupported architecture: {arch}")]
    UnsupportedArchitecture { arch: String },
}

impl KernelError {
    /// Check the `(a, b, result)` length triple every kernel requires
    pub fn check_lengths(a: usize, b: usize, out: usize) -> std::result::Result<(), Self> {
        if a == b && b == out {
            Ok(())
        } else {
            Err(Self::SizeMismatch { a, b, out })
        }
    }

    /// Short machine-friendly label, stable across releases
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SizeMismatch { .. } => "size_mismatch",
            Self::DeviceUnavailable { .. } => "device_unavailable",
            Self::TransferFailed { .. } => "transfer_failed",
            Self::LaunchFailed { .. } => "launch_failed",
            Self::UnsupportedHardware { .. } => "unsupported_hardware",
            Self::UnsupportedArchitecture { .. } => "unsupported_architecture",
        }
    }

    /// True when the backend could not execute, as opposed to being handed
    /// inputs of unequal length
    pub fn is_execution_failure(&self) -> bool {
        !matches!(self, Self::SizeMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_lengths_accepts_equal_triple() {
        assert!(KernelError::check_lengths(7, 7, 7).is_ok());
        assert!(KernelError::check_lengths(0, 0, 0).is_ok());
    }

    #[test]
    fn check_lengths_reports_all_three_lengths() {
        let err = KernelError::check_lengths(5, 6, 5).unwrap_err();
        assert_eq!(err, KernelError::SizeMismatch { a: 5, b: 6, out: 5 });
        assert_eq!(err.kind(), "size_mismatch");
        assert!(!err.is_execution_failure());
    }

    #[test]
    fn device_failures_are_distinct() {
        let unavailable = KernelError::DeviceUnavailable { reason: "no driver".into() };
        let transfer = KernelError::TransferFailed {
            direction: TransferDirection::DeviceToHost,
            reason: "bus error".into(),
        };
        let launch = KernelError::LaunchFailed { reason: "bad grid".into() };

        let unsupported = KernelError::UnsupportedArchitecture { arch: "riscv64".into() };

        assert!(unavailable.is_execution_failure());
        assert!(transfer.is_execution_failure());
        assert!(launch.is_execution_failure());
        assert!(unsupported.is_execution_failure());
        assert_ne!(unavailable.kind(), transfer.kind());
        assert_ne!(transfer.kind(), launch.kind());
        assert!(transfer.to_string().starts_with("device-to-host transfer failed"));
    }
}
