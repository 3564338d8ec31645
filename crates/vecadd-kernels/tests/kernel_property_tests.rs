//! Property tests for the addition kernels.
//!
//! 1. **Cross-backend equivalence**: every available provider matches the
//!    scalar baseline exactly, for both element types.
//! 2. **Tail handling**: lengths that are not a multiple of the lane width
//!    are computed in full.
//! 3. **Idempotence**: repeated runs give identical results.
//! 4. **Size mismatch**: rejected before the result buffer is touched.

use proptest::prelude::*;
use vecadd_common::{DeviceRequest, KernelError};
use vecadd_kernels::{
    add_with, baseline_add, select_accelerator, select_simd_kernel, vector_add, FallbackKernel,
    KernelProvider, PortableLaneKernel,
};

fn float_pair(max_len: usize) -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (0..max_len).prop_flat_map(|n| {
        (
            prop::collection::vec(-1.0e6f32..1.0e6f32, n),
            prop::collection::vec(-1.0e6f32..1.0e6f32, n),
        )
    })
}

fn int_pair(max_len: usize) -> impl Strategy<Value = (Vec<i32>, Vec<i32>)> {
    (0..max_len).prop_flat_map(|n| {
        (prop::collection::vec(any::<i32>(), n), prop::collection::vec(any::<i32>(), n))
    })
}

fn candidates() -> Vec<Box<dyn KernelProvider>> {
    vec![
        select_simd_kernel(),
        Box::new(PortableLaneKernel),
        select_accelerator(DeviceRequest::Host, 0, 16),
    ]
}

fn bits(values: &[f32]) -> Vec<u32> {
    values.iter().map(|v| v.to_bits()).collect()
}

// ---------------------------------------------------------------------------
// Properties: cross-backend equivalence
// ---------------------------------------------------------------------------

proptest! {
    /// Finite float inputs give bit-identical sums on every backend.
    #[test]
    fn prop_float_backends_match_baseline((a, b) in float_pair(300)) {
        let reference = baseline_add(&a, &b).unwrap();
        for kernel in candidates() {
            let got = add_with(kernel.as_ref(), &a, &b).unwrap();
            prop_assert_eq!(bits(&got), bits(&reference), "backend {}", kernel.name());
        }
    }

    /// Integer sums agree everywhere, including wrap-around.
    #[test]
    fn prop_int_backends_match_baseline((a, b) in int_pair(300)) {
        let reference = baseline_add(&a, &b).unwrap();
        for (i, (&x, &y)) in a.iter().zip(&b).enumerate() {
            prop_assert_eq!(reference[i], x.wrapping_add(y));
        }
        for kernel in candidates() {
            let got = add_with(kernel.as_ref(), &a, &b).unwrap();
            prop_assert_eq!(&got, &reference, "backend {}", kernel.name());
        }
    }
}

// ---------------------------------------------------------------------------
// Properties: tail handling and idempotence
// ---------------------------------------------------------------------------

proptest! {
    /// Every index past the last full lane block is still written.
    #[test]
    fn prop_tail_elements_written(n in 0usize..64) {
        let a: Vec<f32> = (0..n).map(|i| i as f32).collect();
        let b = vec![0.5f32; n];
        let got = vector_add(&a, &b).unwrap();
        prop_assert_eq!(got.len(), n);
        for (i, v) in got.iter().enumerate() {
            prop_assert_eq!(*v, i as f32 + 0.5);
        }
    }

    /// Running a kernel twice on the same inputs gives the same bits.
    #[test]
    fn prop_repeated_runs_identical((a, b) in float_pair(100)) {
        for kernel in candidates() {
            let first = add_with(kernel.as_ref(), &a, &b).unwrap();
            let second = add_with(kernel.as_ref(), &a, &b).unwrap();
            prop_assert_eq!(bits(&first), bits(&second));
        }
    }

    /// Mismatched lengths are rejected by every kernel without writing.
    #[test]
    fn prop_size_mismatch_rejected(n in 0usize..40, extra in 1usize..5) {
        let a = vec![1i32; n];
        let b = vec![2i32; n + extra];
        let mut out = vec![-7i32; n];

        let mut kernels = candidates();
        kernels.push(Box::new(FallbackKernel));
        for kernel in kernels {
            let err = kernel.add_i32(&a, &b, &mut out).unwrap_err();
            prop_assert_eq!(err, KernelError::SizeMismatch { a: n, b: n + extra, out: n });
            prop_assert!(out.iter().all(|&v| v == -7));
        }
    }
}

#[test]
fn ten_element_example_every_backend() {
    let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    let b = [0.5f32; 10];
    for kernel in candidates() {
        let got = add_with(kernel.as_ref(), &a, &b).unwrap();
        assert_eq!(got, [1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.5, 8.5, 9.5, 10.5], "{}", kernel.name());
    }
}

#[test]
fn sub_lane_integer_input() {
    let got = vector_add(&[1, 2, 3], &[10, 20, 30]).unwrap();
    assert_eq!(got, [11, 22, 33]);
}

#[test]
fn zero_length_input_every_backend() {
    for kernel in candidates() {
        let got: Vec<i32> = add_with(kernel.as_ref(), &[], &[]).unwrap();
        assert!(got.is_empty());
    }
    assert!(baseline_add::<f32>(&[], &[]).unwrap().is_empty());
}

#[test]
fn free_function_rejects_mismatch_before_allocating() {
    let err = baseline_add(&[1.0f32, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
    assert_eq!(err, KernelError::SizeMismatch { a: 3, b: 2, out: 3 });
}
