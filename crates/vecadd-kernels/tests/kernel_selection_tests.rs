//! Kernel and device selection.

use vecadd_common::{Backend, BenchConfig, DeviceRequest, KernelError, SimdLevel};
use vecadd_kernels::{device_features, select_accelerator, select_simd_kernel, KernelSet};

#[test]
fn simd_kernel_is_always_available() {
    let kernel = select_simd_kernel();
    assert!(kernel.is_available());
    assert_eq!(kernel.backend(), Backend::Vectorized);

    match SimdLevel::detect() {
        SimdLevel::Avx | SimdLevel::Sse2 => assert_eq!(kernel.name(), "avx"),
        SimdLevel::Neon => assert_eq!(kernel.name(), "neon"),
        SimdLevel::Portable => assert_eq!(kernel.name(), "portable-lanes"),
    }
}

#[test]
fn host_request_selects_host_parallel_device() {
    let kernel = select_accelerator(DeviceRequest::Host, 0, 64);
    assert!(kernel.is_available());
    assert_eq!(kernel.name(), "host-parallel");
    assert_eq!(kernel.backend(), Backend::Accelerator);
}

#[test]
fn none_request_reports_device_unavailable() {
    let kernel = select_accelerator(DeviceRequest::None, 0, 64);
    assert!(!kernel.is_available());

    let mut out = [0.0f32; 2];
    let err = kernel.add_f32(&[1.0, 2.0], &[3.0, 4.0], &mut out).unwrap_err();
    assert!(matches!(err, KernelError::DeviceUnavailable { .. }));
    assert!(err.to_string().contains("disabled by configuration"));
}

#[cfg(not(feature = "cuda"))]
#[test]
fn cuda_request_without_feature_is_unavailable() {
    let kernel = select_accelerator(DeviceRequest::Cuda, 0, 256);
    assert!(!kernel.is_available());

    let mut out = [0i32; 2];
    let err = kernel.add_i32(&[1, 2], &[3, 4], &mut out).unwrap_err();
    assert!(matches!(err, KernelError::DeviceUnavailable { .. }));
    assert!(err.is_execution_failure());
    assert!(err.to_string().contains("not compiled"));
}

#[test]
fn kernel_set_from_config() {
    let config = BenchConfig { device: DeviceRequest::Host, ..BenchConfig::default() };
    let set = KernelSet::from_config(&config);

    assert_eq!(set.baseline().name(), "scalar");
    assert_eq!(set.get(Backend::Accelerator).name(), "host-parallel");

    let backends: Vec<_> = set.candidates().iter().map(|k| k.backend()).collect();
    assert_eq!(backends, [Backend::Vectorized, Backend::Accelerator]);

    let available = set.list_available_providers();
    assert_eq!(available.len(), 3);
    assert_eq!(available[0], "scalar");
}

#[test]
fn kernel_set_skips_unavailable_accelerator() {
    let config = BenchConfig { device: DeviceRequest::None, ..BenchConfig::default() };
    let set = KernelSet::from_config(&config);
    assert_eq!(set.list_available_providers().len(), 2);
}

#[test]
fn capabilities_match_build() {
    let caps = device_features::capabilities();
    assert_eq!(caps.cuda_compiled, cfg!(feature = "cuda"));
    assert_eq!(caps.simd_level, SimdLevel::detect());
}
