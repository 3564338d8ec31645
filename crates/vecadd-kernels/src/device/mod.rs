//! Accelerator offload
//!
//! A [`Device`] is a parallel-execution provider with its own memory. The
//! [`AcceleratorKernel`] drives one addition through the device in three
//! stages (transfer in, launch, transfer out) and turns a failure at any
//! stage into a distinct [`KernelError`] without touching the caller's
//! result buffer.

mod host;

pub use crate::stubs::UnavailableDevice;
pub use host::{HostBuffer, HostParallelDevice};

use crate::{KernelProvider, KernelResult};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use vecadd_common::{Backend, DType, Element, HostSlice, HostSliceMut, KernelError};

/// Parallel-execution provider with separate memory
pub trait Device: Send + Sync {
    /// Device-resident array
    type Buffer;

    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    /// Reason reported when [`Device::is_available`] is false
    fn unavailable_reason(&self) -> String {
        format!("{} is not available", self.name())
    }

    /// Copy a host array into device memory
    fn transfer_in(&self, host: HostSlice<'_>) -> KernelResult<Self::Buffer>;

    /// Allocate an output array of `len` elements on the device
    fn alloc_output(&self, dtype: DType, len: usize) -> KernelResult<Self::Buffer>;

    /// `out[i] = a[i] + b[i]` as one independent task per index
    fn launch_add(
        &self,
        a: &Self::Buffer,
        b: &Self::Buffer,
        out: &mut Self::Buffer,
        len: usize,
    ) -> KernelResult<()>;

    /// Copy a device array back into host memory, in index order
    fn transfer_out(&self, buffer: &Self::Buffer, host: HostSliceMut<'_>) -> KernelResult<()>;
}

/// Host/device traffic counters
#[derive(Debug, Default)]
pub struct TransferStats {
    launches: AtomicU64,
    bytes_h2d: AtomicU64,
    bytes_d2h: AtomicU64,
}

/// Point-in-time copy of [`TransferStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSnapshot {
    pub launches: u64,
    pub bytes_h2d: u64,
    pub bytes_d2h: u64,
}

impl TransferStats {
    pub fn snapshot(&self) -> TransferSnapshot {
        TransferSnapshot {
            launches: self.launches.load(Ordering::Relaxed),
            bytes_h2d: self.bytes_h2d.load(Ordering::Relaxed),
            bytes_d2h: self.bytes_d2h.load(Ordering::Relaxed),
        }
    }

    fn record_h2d(&self, bytes: usize) {
        self.bytes_h2d.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn record_d2h(&self, bytes: usize) {
        self.bytes_d2h.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    fn record_launch(&self) {
        self.launches.fetch_add(1, Ordering::Relaxed);
    }
}

/// Kernel provider that offloads addition to a [`Device`]
///
/// Blocking from the caller's point of view: returns once the result is
/// back in host memory.
pub struct AcceleratorKernel<D> {
    device: D,
    stats: TransferStats,
}

impl<D: Device> AcceleratorKernel<D> {
    pub fn new(device: D) -> Self {
        Self { device, stats: TransferStats::default() }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn stats(&self) -> TransferSnapshot {
        self.stats.snapshot()
    }

    fn offload<T: Element>(&self, a: &[T], b: &[T], out: &mut [T]) -> KernelResult<()> {
        KernelError::check_lengths(a.len(), b.len(), out.len())?;

        if !self.device.is_available() {
            return Err(KernelError::DeviceUnavailable { reason: self.device.unavailable_reason() });
        }

        let len = a.len();
        if len == 0 {
            return Ok(());
        }

        log::debug!("Offloading {} x {} to {}", len, T::DTYPE, self.device.name());

        let a_dev = self.device.transfer_in(T::as_host(a))?;
        let b_dev = self.device.transfer_in(T::as_host(b))?;
        self.stats.record_h2d(2 * len * T::DTYPE.size_in_bytes());

        let mut out_dev = self.device.alloc_output(T::DTYPE, len)?;
        self.device.launch_add(&a_dev, &b_dev, &mut out_dev, len)?;
        self.stats.record_launch();

        // Stage through host memory so a failed copy never leaves `out` half written
        let mut staging = vec![T::default(); len];
        self.device.transfer_out(&out_dev, T::as_host_mut(&mut staging))?;
        self.stats.record_d2h(len * T::DTYPE.size_in_bytes());

        out.copy_from_slice(&staging);
        Ok(())
    }
}

impl<D: Device> KernelProvider for AcceleratorKernel<D> {
    fn name(&self) -> &'static str {
        self.device.name()
    }

    fn backend(&self) -> Backend {
        Backend::Accelerator
    }

    fn is_available(&self) -> bool {
        self.device.is_available()
    }

    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> KernelResult<()> {
        self.offload(a, b, out)
    }

    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> KernelResult<()> {
        self.offload(a, b, out)
    }

    fn transfer_stats(&self) -> Option<TransferSnapshot> {
        Some(self.stats())
    }
}
