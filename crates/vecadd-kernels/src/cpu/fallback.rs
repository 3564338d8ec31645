//! Fallback CPU kernel implementation
//!
//! The scalar baseline: one sequential pass with the element type's native
//! addition. It is the oracle every other backend is verified against, so it
//! stays free of reordering, chunking and unsafe code.

use crate::{KernelProvider, KernelResult};
use vecadd_common::{Backend, Element, KernelError};

/// Scalar CPU kernel that works on any architecture
///
/// Always available. Also used as the remainder path of the lane kernels.
pub struct FallbackKernel;

impl KernelProvider for FallbackKernel {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn backend(&self) -> Backend {
        Backend::Baseline
    }

    fn is_available(&self) -> bool {
        true
    }

    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> KernelResult<()> {
        scalar_add(a, b, out)
    }

    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> KernelResult<()> {
        scalar_add(a, b, out)
    }
}

/// `out[i] = a[i] + b[i]` for every `i`, in index order
pub fn scalar_add<T: Element>(a: &[T], b: &[T], out: &mut [T]) -> KernelResult<()> {
    KernelError::check_lengths(a.len(), b.len(), out.len())?;

    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = x.scalar_add(y);
    }

    Ok(())
}
