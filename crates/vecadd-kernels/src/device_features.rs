//! Device feature detection and capability queries
//!
//! Combines compile-time feature gates with runtime hardware detection so
//! the CLI and the harness agree on what this build can run.

use vecadd_common::{KernelCapabilities, SimdLevel};

/// Environment variable forcing the runtime accelerator probe (`cuda` or `none`)
pub const GPU_FAKE_ENV: &str = "VECADD_GPU_FAKE";

/// Check if accelerator support was compiled into this binary
///
/// This does NOT check runtime availability.
#[inline]
pub fn gpu_compiled() -> bool {
    cfg!(feature = "cuda")
}

/// Check if the accelerator is usable at runtime
///
/// Always `false` when [`gpu_compiled`] is false. Otherwise
/// `VECADD_GPU_FAKE` takes precedence over probing the driver.
pub fn gpu_available_runtime() -> bool {
    if !gpu_compiled() {
        return false;
    }
    match std::env::var(GPU_FAKE_ENV).ok().as_deref().map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("none") => false,
        Some(v) if v.eq_ignore_ascii_case("cuda") || v.eq_ignore_ascii_case("gpu") => true,
        _ => probe_cuda(),
    }
}

#[cfg(feature = "cuda")]
fn probe_cuda() -> bool {
    crate::gpu::is_cuda_available()
}

#[cfg(not(feature = "cuda"))]
fn probe_cuda() -> bool {
    false
}

/// Compile-time and runtime capabilities of this process
pub fn capabilities() -> KernelCapabilities {
    KernelCapabilities {
        simd_level: SimdLevel::detect(),
        cuda_compiled: gpu_compiled(),
        cuda_runtime: gpu_available_runtime(),
    }
}

/// Human-readable capability summary for diagnostics
///
/// ```text
/// Device Capabilities:
///   SIMD: avx (kernel: avx)
///   Accelerator: compiled ✗, runtime ✗
/// ```
pub fn device_capability_summary() -> String {
    let caps = capabilities();
    let mark = |b: bool| if b { "✓" } else { "✗" };
    format!(
        "Device Capabilities:\n  SIMD: {} (kernel: {})\n  Accelerator: compiled {}, runtime {}\n",
        caps.simd_level,
        crate::select_simd_kernel().name(),
        mark(caps.cuda_compiled),
        mark(caps.cuda_runtime),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(vecadd_env)]
    fn fake_none_disables_runtime() {
        temp_env::with_var(GPU_FAKE_ENV, Some("none"), || {
            assert!(!gpu_available_runtime());
            assert!(!capabilities().accelerator_available());
        });
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    #[serial(vecadd_env)]
    fn runtime_requires_compiled_support() {
        assert!(!gpu_compiled());
        temp_env::with_var(GPU_FAKE_ENV, Some("cuda"), || {
            assert!(!gpu_available_runtime());
        });
    }

    #[cfg(feature = "cuda")]
    #[test]
    #[serial(vecadd_env)]
    fn fake_cuda_overrides_probe() {
        temp_env::with_var(GPU_FAKE_ENV, Some("cuda"), || {
            assert!(gpu_available_runtime());
        });
    }

    #[test]
    #[serial(vecadd_env)]
    fn summary_mentions_detected_level() {
        temp_env::with_var(GPU_FAKE_ENV, Some("none"), || {
            let summary = device_capability_summary();
            assert!(summary.starts_with("Device Capabilities:"));
            assert!(summary.contains(&format!("SIMD: {}", SimdLevel::detect())));
            assert!(summary.contains("runtime ✗"));
        });
    }
}
