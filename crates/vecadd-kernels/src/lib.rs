//! Element-wise addition kernels for vecadd
//!
//! Three kernel families compute `result[i] = a[i] + b[i]`:
//!
//! - [`cpu::FallbackKernel`]: the scalar baseline, a single sequential pass.
//! - Lane kernels ([`AvxKernel`], [`NeonKernel`],
//!   [`cpu::PortableLaneKernel`]): fixed-width lanes plus a scalar tail.
//! - [`device::AcceleratorKernel`]: offload to a [`device::Device`]
//!   (CUDA, a host thread pool, or the unavailable stub).
//!
//! All of them implement [`KernelProvider`]. Every provider checks that the
//! `(a, b, result)` lengths agree before it touches `result`.

use std::sync::OnceLock;
use vecadd_common::{Backend, BenchConfig, DeviceRequest, Element, KernelError};

pub mod cpu;
pub mod device;
pub mod device_features;
#[cfg(feature = "cuda")]
pub mod gpu;
mod stubs;

/// Result type returned by kernels
pub type KernelResult<T> = std::result::Result<T, KernelError>;

/// Kernel provider trait
///
/// Implementations write every element of `out` on success and leave it
/// untouched on failure.
pub trait KernelProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn backend(&self) -> Backend;
    fn is_available(&self) -> bool;
    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> KernelResult<()>;
    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> KernelResult<()>;

    /// Host/device traffic so far, for providers that move data to a device
    fn transfer_stats(&self) -> Option<device::TransferSnapshot> {
        None
    }
}

/// Routes a generic element type to the matching [`KernelProvider`] entry point.
pub trait KernelElement: Element {
    fn dispatch_add<K: KernelProvider + ?Sized>(
        kernel: &K,
        a: &[Self],
        b: &[Self],
        out: &mut [Self],
    ) -> KernelResult<()>;
}

impl KernelElement for f32 {
    fn dispatch_add<K: KernelProvider + ?Sized>(
        kernel: &K,
        a: &[f32],
        b: &[f32],
        out: &mut [f32],
    ) -> KernelResult<()> {
        kernel.add_f32(a, b, out)
    }
}

impl KernelElement for i32 {
    fn dispatch_add<K: KernelProvider + ?Sized>(
        kernel: &K,
        a: &[i32],
        b: &[i32],
        out: &mut [i32],
    ) -> KernelResult<()> {
        kernel.add_i32(a, b, out)
    }
}

/// Add `a` and `b` with `kernel` into a freshly allocated result.
///
/// Lengths are checked before allocating, so a mismatch produces no array.
pub fn add_with<T, K>(kernel: &K, a: &[T], b: &[T]) -> KernelResult<Vec<T>>
where
    T: KernelElement,
    K: KernelProvider + ?Sized,
{
    KernelError::check_lengths(a.len(), b.len(), a.len())?;
    let mut out = vec![T::default(); a.len()];
    T::dispatch_add(kernel, a, b, &mut out)?;
    Ok(out)
}

/// Scalar reference addition
pub fn baseline_add<T: KernelElement>(a: &[T], b: &[T]) -> KernelResult<Vec<T>> {
    add_with(&cpu::FallbackKernel, a, b)
}

/// Lane-parallel addition on the best SIMD kernel of this CPU
pub fn vector_add<T: KernelElement>(a: &[T], b: &[T]) -> KernelResult<Vec<T>> {
    static SIMD: OnceLock<Box<dyn KernelProvider>> = OnceLock::new();
    add_with(SIMD.get_or_init(select_simd_kernel).as_ref(), a, b)
}

/// Offloaded addition on the accelerator named by the `VECADD_*` environment
///
/// The device is chosen on first use. Reports
/// [`KernelError::DeviceUnavailable`] when no device can be used.
pub fn accelerator_add<T: KernelElement>(a: &[T], b: &[T]) -> KernelResult<Vec<T>> {
    static ACCELERATOR: OnceLock<Box<dyn KernelProvider>> = OnceLock::new();
    let kernel = ACCELERATOR.get_or_init(|| {
        let cfg = BenchConfig::from_env().unwrap_or_else(|e| {
            log::warn!("Ignoring accelerator environment overrides: {}", e);
            BenchConfig::default()
        });
        select_accelerator(cfg.device, cfg.device_index, cfg.work_group_size)
    });
    add_with(kernel.as_ref(), a, b)
}

/// Select the best lane kernel for the running CPU
///
/// Never fails: the portable lane kernel is always available.
pub fn select_simd_kernel() -> Box<dyn KernelProvider> {
    let mut providers: Vec<Box<dyn KernelProvider>> = vec![Box::new(cpu::PortableLaneKernel)];

    #[cfg(target_arch = "x86_64")]
    providers.insert(0, Box::new(cpu::AvxKernel));

    #[cfg(target_arch = "aarch64")]
    providers.insert(0, Box::new(cpu::NeonKernel));

    let selected = providers
        .into_iter()
        .find(|p| p.is_available())
        .unwrap_or_else(|| Box::new(cpu::PortableLaneKernel));
    log::debug!("Selected SIMD kernel: {}", selected.name());
    selected
}

/// Select the accelerator kernel for `request`
///
/// Requests that cannot be satisfied yield a provider that reports
/// device-unavailable on every call, so callers can still run and report.
pub fn select_accelerator(
    request: DeviceRequest,
    device_index: usize,
    work_group_size: u32,
) -> Box<dyn KernelProvider> {
    match request {
        DeviceRequest::Host => {
            let host = device::HostParallelDevice::new(work_group_size as usize);
            log::info!("Using host-parallel device (work group {})", host.work_group_size());
            Box::new(device::AcceleratorKernel::new(host))
        }
        DeviceRequest::None => Box::new(device::AcceleratorKernel::new(
            device::UnavailableDevice::new("accelerator disabled by configuration"),
        )),
        DeviceRequest::Auto | DeviceRequest::Cuda => {
            select_cuda_accelerator(request, device_index, work_group_size)
        }
    }
}

#[cfg(feature = "cuda")]
fn select_cuda_accelerator(
    request: DeviceRequest,
    device_index: usize,
    work_group_size: u32,
) -> Box<dyn KernelProvider> {
    match gpu::CudaDevice::new(device_index, work_group_size) {
        Ok(cuda) => {
            log::info!("CUDA device {} available, adding accelerator", device_index);
            Box::new(device::AcceleratorKernel::new(cuda))
        }
        Err(e) => {
            if request == DeviceRequest::Cuda {
                log::warn!("CUDA requested but unavailable: {}", e);
            } else {
                log::debug!("CUDA not available: {}", e);
            }
            Box::new(device::AcceleratorKernel::new(device::UnavailableDevice::new(e.to_string())))
        }
    }
}

#[cfg(not(feature = "cuda"))]
fn select_cuda_accelerator(
    request: DeviceRequest,
    _device_index: usize,
    _work_group_size: u32,
) -> Box<dyn KernelProvider> {
    if request == DeviceRequest::Cuda {
        log::warn!("CUDA requested but this build has no `cuda` feature");
    }
    Box::new(device::AcceleratorKernel::new(device::UnavailableDevice::new(
        "accelerator support not compiled (enable the `cuda` feature)",
    )))
}

/// The three providers compared by a benchmarking run
pub struct KernelSet {
    baseline: Box<dyn KernelProvider>,
    vectorized: Box<dyn KernelProvider>,
    accelerator: Box<dyn KernelProvider>,
}

impl KernelSet {
    /// Build from explicit providers
    pub fn new(
        baseline: Box<dyn KernelProvider>,
        vectorized: Box<dyn KernelProvider>,
        accelerator: Box<dyn KernelProvider>,
    ) -> Self {
        Self { baseline, vectorized, accelerator }
    }

    /// Scalar baseline, best lane kernel, and the configured accelerator
    pub fn from_config(config: &BenchConfig) -> Self {
        Self::new(
            Box::new(cpu::FallbackKernel),
            select_simd_kernel(),
            select_accelerator(config.device, config.device_index, config.work_group_size),
        )
    }

    pub fn get(&self, backend: Backend) -> &dyn KernelProvider {
        match backend {
            Backend::Baseline => self.baseline.as_ref(),
            Backend::Vectorized => self.vectorized.as_ref(),
            Backend::Accelerator => self.accelerator.as_ref(),
        }
    }

    pub fn baseline(&self) -> &dyn KernelProvider {
        self.baseline.as_ref()
    }

    /// The non-reference providers, in report order
    pub fn candidates(&self) -> [&dyn KernelProvider; 2] {
        [self.vectorized.as_ref(), self.accelerator.as_ref()]
    }

    /// List all available kernel providers
    pub fn list_available_providers(&self) -> Vec<&'static str> {
        Backend::ALL
            .iter()
            .map(|&b| self.get(b))
            .filter(|provider| provider.is_available())
            .map(|provider| provider.name())
            .collect()
    }
}

impl Default for KernelSet {
    fn default() -> Self {
        Self::from_config(&BenchConfig::default())
    }
}

pub use cpu::{FallbackKernel, PortableLaneKernel};
#[cfg(target_arch = "x86_64")]
pub use cpu::AvxKernel;
#[cfg(target_arch = "aarch64")]
pub use cpu::NeonKernel;
pub use device::{AcceleratorKernel, Device, HostParallelDevice, TransferSnapshot, UnavailableDevice};
#[cfg(feature = "cuda")]
pub use gpu::CudaDevice;
pub use stubs::*;
