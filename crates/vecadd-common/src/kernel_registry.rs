//! Kernel backend registry
//!
//! Canonical enumeration of the execution backends and the capability
//! snapshot describing what a build (and optionally the running host)
//! provides.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SIMD instruction set used by the vectorized kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimdLevel {
    /// No hardware lanes; portable lane loop.
    Portable,
    /// ARM NEON (128-bit registers, f32 lanes issued as register pairs).
    Neon,
    /// x86 SSE2 (128-bit) only; f32 lanes fall back to the portable loop.
    Sse2,
    /// x86 AVX for f32 (256-bit) plus SSE2 for i32 (128-bit).
    Avx,
}

impl fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimdLevel::Portable => write!(f, "portable"),
            SimdLevel::Neon => write!(f, "neon"),
            SimdLevel::Sse2 => write!(f, "sse2"),
            SimdLevel::Avx => write!(f, "avx"),
        }
    }
}

impl SimdLevel {
    /// Best level supported by the running CPU.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if std::arch::is_x86_feature_detected!("avx") {
                return SimdLevel::Avx;
            }
            if std::arch::is_x86_feature_detected!("sse2") {
                return SimdLevel::Sse2;
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                return SimdLevel::Neon;
            }
        }
        SimdLevel::Portable
    }
}

/// The three execution backends compared in every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Scalar reference; defines ground truth.
    Baseline,
    /// Fixed-width lanes with a scalar tail.
    Vectorized,
    /// Offloaded to a massively parallel device.
    Accelerator,
}

impl Backend {
    /// All backends, reference first.
    pub const ALL: [Backend; 3] = [Backend::Baseline, Backend::Vectorized, Backend::Accelerator];
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Baseline => write!(f, "baseline"),
            Backend::Vectorized => write!(f, "vectorized"),
            Backend::Accelerator => write!(f, "accelerator"),
        }
    }
}

/// Snapshot of what a build configuration provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelCapabilities {
    /// SIMD level the vectorized kernel will use.
    pub simd_level: SimdLevel,
    /// CUDA accelerator is compiled in.
    pub cuda_compiled: bool,
    /// CUDA runtime detected (driver loaded, device reachable).
    pub cuda_runtime: bool,
}

impl KernelCapabilities {
    /// Whether a real accelerator can be used.
    pub fn accelerator_available(&self) -> bool {
        self.cuda_compiled && self.cuda_runtime
    }

    /// Returns a human-readable summary string for logs and reports.
    pub fn summary(&self) -> String {
        let accel = if self.accelerator_available() {
            "cuda"
        } else if self.cuda_compiled {
            "cuda(unreachable)"
        } else {
            "none"
        };
        format!("simd={} accelerator={}", self.simd_level, accel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simd_level_ordering() {
        assert!(SimdLevel::Portable < SimdLevel::Neon);
        assert!(SimdLevel::Neon < SimdLevel::Sse2);
        assert!(SimdLevel::Sse2 < SimdLevel::Avx);
    }

    #[test]
    fn simd_level_display() {
        assert_eq!(SimdLevel::Avx.to_string(), "avx");
        assert_eq!(SimdLevel::Portable.to_string(), "portable");
    }

    #[test]
    fn detected_level_matches_architecture() {
        let level = SimdLevel::detect();
        #[cfg(target_arch = "x86_64")]
        assert!(level >= SimdLevel::Sse2, "sse2 is baseline on x86_64, got {level}");
        #[cfg(target_arch = "aarch64")]
        assert_eq!(level, SimdLevel::Neon);
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        assert_eq!(level, SimdLevel::Portable);
    }

    #[test]
    fn backend_display_and_order() {
        let names: Vec<String> = Backend::ALL.iter().map(|b| b.to_string()).collect();
        assert_eq!(names, ["baseline", "vectorized", "accelerator"]);
    }

    #[test]
    fn accelerator_needs_compile_and_runtime() {
        let mut caps = KernelCapabilities {
            simd_level: SimdLevel::Avx,
            cuda_compiled: true,
            cuda_runtime: false,
        };
        assert!(!caps.accelerator_available());
        assert_eq!(caps.summary(), "simd=avx accelerator=cuda(unreachable)");

        caps.cuda_runtime = true;
        assert!(caps.accelerator_available());
        assert_eq!(caps.summary(), "simd=avx accelerator=cuda");
    }
}
