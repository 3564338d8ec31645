//! Deterministic benchmark inputs
//!
//! Both inputs are ascending sequences: `a` starts at [`A_START`] and `b` at
//! [`B_START`], so `a[i] + b[i] == 101 + 2 * i` while the values stay exact.

use vecadd_kernels::KernelElement;

/// First value of input `a`
pub const A_START: i32 = 1;
/// First value of input `b`
pub const B_START: i32 = 100;

/// Element types with an ascending-sequence generator
pub trait InputElement: KernelElement {
    /// `len` values starting at `start`, each one greater than the last
    ///
    /// Built by repeated increment: floats stop growing once the step is
    /// below their precision and integers wrap at the type boundary.
    fn iota(len: usize, start: i32) -> Vec<Self>;
}

impl InputElement for f32 {
    fn iota(len: usize, start: i32) -> Vec<f32> {
        let mut value = start as f32;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(value);
            value += 1.0;
        }
        out
    }
}

impl InputElement for i32 {
    fn iota(len: usize, start: i32) -> Vec<i32> {
        let mut value = start;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(value);
            value = value.wrapping_add(1);
        }
        out
    }
}

/// The `(a, b)` pair used by a benchmarking run
pub fn benchmark_inputs<T: InputElement>(len: usize) -> (Vec<T>, Vec<T>) {
    (T::iota(len, A_START), T::iota(len, B_START))
}
