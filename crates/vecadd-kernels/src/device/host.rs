//! Host thread pool standing in for an accelerator
//!
//! Device memory is emulated with owned copies so the transfer stages are
//! real copies, and the launch runs one rayon task per index grouped into
//! work groups of `work_group_size` elements.

use super::Device;
use crate::KernelResult;
use rayon::prelude::*;
use vecadd_common::{DType, Element, HostSlice, HostSliceMut, KernelError, TransferDirection};

/// Array resident in emulated device memory
#[derive(Debug, Clone, PartialEq)]
pub enum HostBuffer {
    F32(Vec<f32>),
    I32(Vec<i32>),
}

impl HostBuffer {
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I32(_) => DType::I32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::I32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Data-parallel "device" backed by the rayon thread pool
pub struct HostParallelDevice {
    work_group_size: usize,
}

impl HostParallelDevice {
    pub fn new(work_group_size: usize) -> Self {
        Self { work_group_size: work_group_size.max(1) }
    }

    pub fn work_group_size(&self) -> usize {
        self.work_group_size
    }

    fn add_parallel<T: Element>(&self, a: &[T], b: &[T], out: &mut [T]) {
        out.par_iter_mut()
            .zip(a.par_iter())
            .zip(b.par_iter())
            .with_min_len(self.work_group_size)
            .for_each(|((o, &x), &y)| *o = x.scalar_add(y));
    }
}

fn launch_error(reason: String) -> KernelError {
    KernelError::LaunchFailed { reason }
}

impl Device for HostParallelDevice {
    type Buffer = HostBuffer;

    fn name(&self) -> &'static str {
        "host-parallel"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn transfer_in(&self, host: HostSlice<'_>) -> KernelResult<HostBuffer> {
        Ok(match host {
            HostSlice::F32(s) => HostBuffer::F32(s.to_vec()),
            HostSlice::I32(s) => HostBuffer::I32(s.to_vec()),
        })
    }

    fn alloc_output(&self, dtype: DType, len: usize) -> KernelResult<HostBuffer> {
        Ok(match dtype {
            DType::F32 => HostBuffer::F32(vec![0.0; len]),
            DType::I32 => HostBuffer::I32(vec![0; len]),
        })
    }

    fn launch_add(
        &self,
        a: &HostBuffer,
        b: &HostBuffer,
        out: &mut HostBuffer,
        len: usize,
    ) -> KernelResult<()> {
        if a.len() != len || b.len() != len || out.len() != len {
            return Err(launch_error(format!(
                "buffer lengths ({}, {}, {}) do not match launch size {}",
                a.len(),
                b.len(),
                out.len(),
                len
            )));
        }

        match (a, b, out) {
            (HostBuffer::F32(a), HostBuffer::F32(b), HostBuffer::F32(out)) => {
                self.add_parallel(a.as_slice(), b.as_slice(), out.as_mut_slice())
            }
            (HostBuffer::I32(a), HostBuffer::I32(b), HostBuffer::I32(out)) => {
                self.add_parallel(a.as_slice(), b.as_slice(), out.as_mut_slice())
            }
            (a, b, out) => {
                return Err(launch_error(format!(
                    "mixed element types: {} + {} -> {}",
                    a.dtype(),
                    b.dtype(),
                    out.dtype()
                )))
            }
        }
        Ok(())
    }

    fn transfer_out(&self, buffer: &HostBuffer, host: HostSliceMut<'_>) -> KernelResult<()> {
        let mismatch = |host_len: usize, host_dtype: DType| KernelError::TransferFailed {
            direction: TransferDirection::DeviceToHost,
            reason: format!(
                "device buffer {} x {} does not fit host buffer {} x {}",
                buffer.len(),
                buffer.dtype(),
                host_len,
                host_dtype
            ),
        };

        match (buffer, host) {
            (HostBuffer::F32(src), HostSliceMut::F32(dst)) if src.len() == dst.len() => {
                dst.copy_from_slice(src)
            }
            (HostBuffer::I32(src), HostSliceMut::I32(dst)) if src.len() == dst.len() => {
                dst.copy_from_slice(src)
            }
            (_, host) => return Err(mismatch(host.len(), host.dtype())),
        }
        Ok(())
    }
}
