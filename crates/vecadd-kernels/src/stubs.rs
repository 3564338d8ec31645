//! Stand-ins for kernels and devices that cannot run in this build

use crate::device::Device;
use crate::{KernelProvider, KernelResult};
use vecadd_common::{Backend, DType, HostSlice, HostSliceMut, KernelError};

/// Stub implementation of AvxKernel for non-x86_64 architectures
#[cfg(not(target_arch = "x86_64"))]
pub struct AvxKernel;

#[cfg(not(target_arch = "x86_64"))]
impl KernelProvider for AvxKernel {
    fn name(&self) -> &'static str {
        "avx"
    }

    fn backend(&self) -> Backend {
        Backend::Vectorized
    }

    fn is_available(&self) -> bool {
        false
    }

    fn add_f32(&self, _a: &[f32], _b: &[f32], _out: &mut [f32]) -> KernelResult<()> {
        Err(KernelError::UnsupportedArchitecture {
            arch: "AVX kernel not available on non-x86_64 architectures".to_string(),
        })
    }

    fn add_i32(&self, _a: &[i32], _b: &[i32], _out: &mut [i32]) -> KernelResult<()> {
        Err(KernelError::UnsupportedArchitecture {
            arch: "SSE2 kernel not available on non-x86_64 architectures".to_string(),
        })
    }
}

/// Stub implementation of NeonKernel for non-aarch64 architectures
#[cfg(not(target_arch = "aarch64"))]
pub struct NeonKernel;

#[cfg(not(target_arch = "aarch64"))]
impl KernelProvider for NeonKernel {
    fn name(&self) -> &'static str {
        "neon"
    }

    fn backend(&self) -> Backend {
        Backend::Vectorized
    }

    fn is_available(&self) -> bool {
        false
    }

    fn add_f32(&self, _a: &[f32], _b: &[f32], _out: &mut [f32]) -> KernelResult<()> {
        Err(KernelError::UnsupportedArchitecture {
            arch: "NEON kernel not available on non-ARM64 architectures".to_string(),
        })
    }

    fn add_i32(&self, _a: &[i32], _b: &[i32], _out: &mut [i32]) -> KernelResult<()> {
        Err(KernelError::UnsupportedArchitecture {
            arch: "NEON kernel not available on non-ARM64 architectures".to_string(),
        })
    }
}

/// Device that is never reachable
///
/// Selected when the accelerator is not compiled in, disabled by
/// configuration, or failed to initialize. Every stage reports
/// [`KernelError::DeviceUnavailable`] with the recorded reason.
#[derive(Debug, Clone)]
pub struct UnavailableDevice {
    reason: String,
}

impl UnavailableDevice {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn fail<T>(&self) -> KernelResult<T> {
        Err(KernelError::DeviceUnavailable { reason: self.reason.clone() })
    }
}

impl Device for UnavailableDevice {
    type Buffer = ();

    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn unavailable_reason(&self) -> String {
        self.reason.clone()
    }

    fn transfer_in(&self, _host: HostSlice<'_>) -> KernelResult<()> {
        self.fail()
    }

    fn alloc_output(&self, _dtype: DType, _len: usize) -> KernelResult<()> {
        self.fail()
    }

    fn launch_add(&self, _a: &(), _b: &(), _out: &mut (), _len: usize) -> KernelResult<()> {
        self.fail()
    }

    fn transfer_out(&self, _buffer: &(), _host: HostSliceMut<'_>) -> KernelResult<()> {
        self.fail()
    }
}
