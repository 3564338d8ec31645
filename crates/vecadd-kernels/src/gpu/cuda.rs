//! CUDA device using cudarc 0.17

use crate::device::Device;
use crate::KernelResult;
use cudarc::driver::{
    sys::CUdevice_attribute, CudaContext, CudaFunction, CudaModule, CudaSlice, CudaStream,
    DeviceRepr, LaunchConfig, PushKernelArg,
};
use cudarc::nvrtc::compile_ptx;
use std::sync::Arc;
use vecadd_common::{DType, HostSlice, HostSliceMut, KernelError, TransferDirection};

/// CUDA device information
#[derive(Debug, Clone)]
pub struct CudaDeviceInfo {
    pub device_id: usize,
    pub name: String,
    pub compute_capability: (i32, i32),
    pub multiprocessor_count: i32,
    pub max_threads_per_block: i32,
}

/// Array resident in CUDA device memory
pub enum CudaBuffer {
    F32(CudaSlice<f32>),
    I32(CudaSlice<i32>),
}

impl CudaBuffer {
    fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I32(_) => DType::I32,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::F32(s) => s.len(),
            Self::I32(s) => s.len(),
        }
    }
}

/// CUDA device with the addition kernels compiled and loaded
pub struct CudaDevice {
    _ctx: Arc<CudaContext>,
    stream: Arc<CudaStream>,
    _module: Arc<CudaModule>,
    add_f32: CudaFunction,
    add_i32: CudaFunction,
    block_size: u32,
    info: CudaDeviceInfo,
}

fn unavailable(reason: String) -> KernelError {
    KernelError::DeviceUnavailable { reason }
}

fn h2d_error(reason: String) -> KernelError {
    KernelError::TransferFailed { direction: TransferDirection::HostToDevice, reason }
}

fn d2h_error(reason: String) -> KernelError {
    KernelError::TransferFailed { direction: TransferDirection::DeviceToHost, reason }
}

fn launch_error(reason: String) -> KernelError {
    KernelError::LaunchFailed { reason }
}

impl CudaDevice {
    /// Initialize device `device_id` and compile the addition kernels
    ///
    /// Any failure here means the device cannot be used and is reported as
    /// [`KernelError::DeviceUnavailable`].
    pub fn new(device_id: usize, block_size: u32) -> KernelResult<Self> {
        log::info!("Initializing CUDA device {}", device_id);

        let ctx = CudaContext::new(device_id).map_err(|e| {
            unavailable(format!("failed to create CUDA context for device {}: {:?}", device_id, e))
        })?;
        let stream = ctx.default_stream();

        let ptx = compile_ptx(include_str!("kernels/vec_add.cu"))
            .map_err(|e| unavailable(format!("failed to compile PTX: {:?}", e)))?;
        let module = ctx
            .load_module(ptx)
            .map_err(|e| unavailable(format!("failed to load CUDA module: {:?}", e)))?;
        let add_f32 = module
            .load_function("vec_add_f32")
            .map_err(|e| unavailable(format!("failed to load vec_add_f32: {:?}", e)))?;
        let add_i32 = module
            .load_function("vec_add_i32")
            .map_err(|e| unavailable(format!("failed to load vec_add_i32: {:?}", e)))?;

        let info = Self::query_info(&ctx, device_id)?;
        let block_size = block_size.clamp(1, info.max_threads_per_block.max(1) as u32);
        log::info!("CUDA device info: {:?}, block size {}", info, block_size);

        Ok(Self { _ctx: ctx, stream, _module: module, add_f32, add_i32, block_size, info })
    }

    fn query_info(ctx: &CudaContext, device_id: usize) -> KernelResult<CudaDeviceInfo> {
        let attr = |a: CUdevice_attribute| {
            ctx.attribute(a)
                .map_err(|e| unavailable(format!("failed to query device attribute: {:?}", e)))
        };
        let major = attr(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR)?;
        let minor = attr(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR)?;

        Ok(CudaDeviceInfo {
            device_id,
            name: format!("cuda:{} (sm_{}{})", device_id, major, minor),
            compute_capability: (major, minor),
            multiprocessor_count: attr(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MULTIPROCESSOR_COUNT)?,
            max_threads_per_block: attr(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_THREADS_PER_BLOCK)?,
        })
    }

    pub fn info(&self) -> &CudaDeviceInfo {
        &self.info
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    fn launch<T: DeviceRepr>(
        &self,
        func: &CudaFunction,
        a: &CudaSlice<T>,
        b: &CudaSlice<T>,
        out: &mut CudaSlice<T>,
        len: usize,
    ) -> KernelResult<()> {
        let n = i32::try_from(len).map_err(|_| {
            launch_error(format!("{} elements exceed the kernel's 32-bit index range", len))
        })?;
        let grid = (len as u32).div_ceil(self.block_size);
        let cfg = LaunchConfig {
            grid_dim: (grid, 1, 1),
            block_dim: (self.block_size, 1, 1),
            shared_mem_bytes: 0,
        };
        log::debug!("Launching CUDA add: {} elements, grid {} x block {}", len, grid, self.block_size);

        let mut builder = self.stream.launch_builder(func);
        builder.arg(a);
        builder.arg(b);
        builder.arg(out);
        builder.arg(&n);

        // Safety: argument list matches the kernel signature and every buffer holds `len` elements.
        unsafe { builder.launch(cfg) }
            .map_err(|e| launch_error(format!("CUDA kernel launch failed: {:?}", e)))?;

        self.stream
            .synchronize()
            .map_err(|e| launch_error(format!("stream synchronize failed: {:?}", e)))
    }
}

impl Device for CudaDevice {
    type Buffer = CudaBuffer;

    fn name(&self) -> &'static str {
        "cuda"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn transfer_in(&self, host: HostSlice<'_>) -> KernelResult<CudaBuffer> {
        match host {
            HostSlice::F32(s) => self.stream.memcpy_stod(s).map(CudaBuffer::F32),
            HostSlice::I32(s) => self.stream.memcpy_stod(s).map(CudaBuffer::I32),
        }
        .map_err(|e| h2d_error(format!("failed to copy input to device: {:?}", e)))
    }

    fn alloc_output(&self, dtype: DType, len: usize) -> KernelResult<CudaBuffer> {
        match dtype {
            DType::F32 => self.stream.alloc_zeros::<f32>(len).map(CudaBuffer::F32),
            DType::I32 => self.stream.alloc_zeros::<i32>(len).map(CudaBuffer::I32),
        }
        .map_err(|e| launch_error(format!("failed to allocate output on device: {:?}", e)))
    }

    fn launch_add(
        &self,
        a: &CudaBuffer,
        b: &CudaBuffer,
        out: &mut CudaBuffer,
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
            (CudaBuffer::F32(a), CudaBuffer::F32(b), CudaBuffer::F32(out)) => {
                self.launch(&self.add_f32, a, b, out, len)
            }
            (CudaBuffer::I32(a), CudaBuffer::I32(b), CudaBuffer::I32(out)) => {
                self.launch(&self.add_i32, a, b, out, len)
            }
            (a, b, out) => Err(launch_error(format!(
                "mixed element types: {} + {} -> {}",
                a.dtype(),
                b.dtype(),
                out.dtype()
            ))),
        }
    }

    fn transfer_out(&self, buffer: &CudaBuffer, host: HostSliceMut<'_>) -> KernelResult<()> {
        match (buffer, host) {
            (CudaBuffer::F32(src), HostSliceMut::F32(dst)) if src.len() == dst.len() => {
                let values: Vec<f32> = self
                    .stream
                    .memcpy_dtov(src)
                    .map_err(|e| d2h_error(format!("failed to copy result back: {:?}", e)))?;
                dst.copy_from_slice(&values);
            }
            (CudaBuffer::I32(src), HostSliceMut::I32(dst)) if src.len() == dst.len() => {
                let values: Vec<i32> = self
                    .stream
                    .memcpy_dtov(src)
                    .map_err(|e| d2h_error(format!("failed to copy result back: {:?}", e)))?;
                dst.copy_from_slice(&values);
            }
            (_, host) => {
                return Err(d2h_error(format!(
                    "device buffer {} x {} does not fit host buffer {} x {}",
                    buffer.len(),
                    buffer.dtype(),
                    host.len(),
                    host.dtype()
                )))
            }
        }
        Ok(())
    }
}

/// Check if a CUDA device can be initialized
pub fn is_cuda_available() -> bool {
    CudaContext::new(0).is_ok()
}
