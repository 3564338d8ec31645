//! x86_64 CPU kernels with AVX/SSE2 lanes
#![allow(unsafe_op_in_unsafe_fn)]

use crate::cpu::lanes::{lane_add, LaneOps, PortableLanes};
use crate::{KernelProvider, KernelResult};
use std::arch::x86_64::*;
use vecadd_common::{Backend, KernelError};

/// x86_64 vectorized kernel
///
/// f32 uses 256-bit AVX registers (8 lanes), i32 uses 128-bit SSE2
/// registers (4 lanes). Without AVX the f32 path runs the portable lane loop.
pub struct AvxKernel;

impl KernelProvider for AvxKernel {
    fn name(&self) -> &'static str {
        "avx"
    }

    fn backend(&self) -> Backend {
        Backend::Vectorized
    }

    fn is_available(&self) -> bool {
        is_x86_feature_detected!("sse2")
    }

    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> KernelResult<()> {
        match AvxLanes::detect() {
            Some(lanes) => lane_add(&lanes, a, b, out),
            None => {
                log::debug!("AVX not detected, f32 lanes use the portable loop");
                lane_add(&PortableLanes, a, b, out)
            }
        }
    }

    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> KernelResult<()> {
        let lanes = Sse2Lanes::detect().ok_or_else(|| KernelError::UnsupportedHardware {
            required: "SSE2".to_string(),
            available: "none".to_string(),
        })?;
        lane_add(&lanes, a, b, out)
    }
}

/// Proof that AVX was detected on this CPU
#[derive(Clone, Copy)]
struct AvxLanes(());

impl AvxLanes {
    fn detect() -> Option<Self> {
        is_x86_feature_detected!("avx").then_some(AvxLanes(()))
    }
}

impl LaneOps<f32> for AvxLanes {
    fn add_lanes(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
        // Safety: an AvxLanes only exists after AVX detection succeeded
        unsafe { add_f32_avx(a, b, out) }
    }
}

/// Proof that SSE2 was detected on this CPU
#[derive(Clone, Copy)]
struct Sse2Lanes(());

impl Sse2Lanes {
    fn detect() -> Option<Self> {
        is_x86_feature_detected!("sse2").then_some(Sse2Lanes(()))
    }
}

impl LaneOps<i32> for Sse2Lanes {
    fn add_lanes(&self, a: &[i32], b: &[i32], out: &mut [i32]) {
        // Safety: an Sse2Lanes only exists after SSE2 detection succeeded
        unsafe { add_i32_sse2(a, b, out) }
    }
}

/// 8 × f32 per iteration with unaligned 256-bit loads and stores
#[target_feature(enable = "avx")]
unsafe fn add_f32_avx(a: &[f32], b: &[f32], out: &mut [f32]) {
    debug_assert!(a.len() == b.len() && a.len() == out.len() && a.len() % 8 == 0);

    for ((lo, la), lb) in out.chunks_exact_mut(8).zip(a.chunks_exact(8)).zip(b.chunks_exact(8)) {
        let va = _mm256_loadu_ps(la.as_ptr());
        let vb = _mm256_loadu_ps(lb.as_ptr());
        _mm256_storeu_ps(lo.as_mut_ptr(), _mm256_add_ps(va, vb));
    }
}

/// 4 × i32 per iteration; `paddd` wraps on overflow like `i32::wrapping_add`
#[target_feature(enable = "sse2")]
unsafe fn add_i32_sse2(a: &[i32], b: &[i32], out: &mut [i32]) {
    debug_assert!(a.len() == b.len() && a.len() == out.len() && a.len() % 4 == 0);

    for ((lo, la), lb) in out.chunks_exact_mut(4).zip(a.chunks_exact(4)).zip(b.chunks_exact(4)) {
        let va = _mm_loadu_si128(la.as_ptr() as *const __m128i);
        let vb = _mm_loadu_si128(lb.as_ptr() as *const __m128i);
        _mm_storeu_si128(lo.as_mut_ptr() as *mut __m128i, _mm_add_epi32(va, vb));
    }
}
