//! ARM NEON optimized kernel implementations
//!
//! NEON registers are 128 bits wide, so an 8-wide f32 lane is issued as a
//! pair of `vaddq_f32` operations; i32 lanes map onto a single `vaddq_s32`.
#![allow(unsafe_op_in_unsafe_fn)]

use crate::cpu::lanes::{lane_add, LaneOps};
use crate::{KernelProvider, KernelResult};
use std::arch::aarch64::*;
use vecadd_common::{Backend, KernelError};

/// NEON optimized kernel for ARM64 architectures
pub struct NeonKernel;

impl KernelProvider for NeonKernel {
    fn name(&self) -> &'static str {
        "neon"
    }

    fn backend(&self) -> Backend {
        Backend::Vectorized
    }

    fn is_available(&self) -> bool {
        // NEON is mandatory on ARM64, but check for safety
        std::arch::is_aarch64_feature_detected!("neon")
    }

    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> KernelResult<()> {
        lane_add(&NeonLanes::detect()?, a, b, out)
    }

    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> KernelResult<()> {
        lane_add(&NeonLanes::detect()?, a, b, out)
    }
}

/// Proof that NEON was detected on this CPU
#[derive(Clone, Copy)]
struct NeonLanes(());

impl NeonLanes {
    fn detect() -> KernelResult<Self> {
        if std::arch::is_aarch64_feature_detected!("neon") {
            Ok(NeonLanes(()))
        } else {
            Err(KernelError::UnsupportedHardware {
                required: "NEON".to_string(),
                available: "none".to_string(),
            })
        }
    }
}

impl LaneOps<f32> for NeonLanes {
    fn add_lanes(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
        // Safety: a NeonLanes only exists after NEON detection succeeded
        unsafe { add_f32_neon(a, b, out) }
    }
}

impl LaneOps<i32> for NeonLanes {
    fn add_lanes(&self, a: &[i32], b: &[i32], out: &mut [i32]) {
        // Safety: a NeonLanes only exists after NEON detection succeeded
        unsafe { add_i32_neon(a, b, out) }
    }
}

#[target_feature(enable = "neon")]
unsafe fn add_f32_neon(a: &[f32], b: &[f32], out: &mut [f32]) {
    debug_assert!(a.len() == b.len() && a.len() == out.len() && a.len() % 8 == 0);

    for ((lo, la), lb) in out.chunks_exact_mut(8).zip(a.chunks_exact(8)).zip(b.chunks_exact(8)) {
        let lo_half = vaddq_f32(vld1q_f32(la.as_ptr()), vld1q_f32(lb.as_ptr()));
        let hi_half = vaddq_f32(vld1q_f32(la.as_ptr().add(4)), vld1q_f32(lb.as_ptr().add(4)));
        vst1q_f32(lo.as_mut_ptr(), lo_half);
        vst1q_f32(lo.as_mut_ptr().add(4), hi_half);
    }
}

#[target_feature(enable = "neon")]
unsafe fn add_i32_neon(a: &[i32], b: &[i32], out: &mut [i32]) {
    debug_assert!(a.len() == b.len() && a.len() == out.len() && a.len() % 4 == 0);

    for ((lo, la), lb) in out.chunks_exact_mut(4).zip(a.chunks_exact(4)).zip(b.chunks_exact(4)) {
        vst1q_s32(lo.as_mut_ptr(), vaddq_s32(vld1q_s32(la.as_ptr()), vld1q_s32(lb.as_ptr())));
    }
}
