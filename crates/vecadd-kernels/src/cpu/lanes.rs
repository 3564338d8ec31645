//! Lane-parallel addition shared by every vectorized kernel
//!
//! A vectorized kernel is a [`LaneOps`] implementation plugged into
//! [`lane_add`]: the lane operation handles the `floor(n / W)` full lanes and
//! `lane_add` finishes the `n mod W` tail with scalar addition. When
//! `n < W` the lane operation receives empty slices and the tail covers
//! the whole array.

use crate::{KernelProvider, KernelResult};
use vecadd_common::{Backend, Element, KernelError};

/// Hardware lane addition for element type `T`
///
/// Implementations may assume `a`, `b` and `out` have equal length that is a
/// multiple of `T::LANES`, and must produce exactly `a[i].scalar_add(b[i])`
/// for every element.
pub trait LaneOps<T: Element> {
    fn add_lanes(&self, a: &[T], b: &[T], out: &mut [T]);
}

/// Lane operation without hardware support: a scalar loop per lane
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableLanes;

impl<T: Element> LaneOps<T> for PortableLanes {
    #[inline]
    fn add_lanes(&self, a: &[T], b: &[T], out: &mut [T]) {
        for ((lo, la), lb) in
            out.chunks_exact_mut(T::LANES).zip(a.chunks_exact(T::LANES)).zip(b.chunks_exact(T::LANES))
        {
            for ((o, &x), &y) in lo.iter_mut().zip(la).zip(lb) {
                *o = x.scalar_add(y);
            }
        }
    }
}

/// Full lanes through `lanes`, then a scalar pass over the remainder
pub fn lane_add<T, L>(lanes: &L, a: &[T], b: &[T], out: &mut [T]) -> KernelResult<()>
where
    T: Element,
    L: LaneOps<T> + ?Sized,
{
    KernelError::check_lengths(a.len(), b.len(), out.len())?;

    let body = a.len() - a.len() % T::LANES;
    let (a_body, a_tail) = a.split_at(body);
    let (b_body, b_tail) = b.split_at(body);
    let (out_body, out_tail) = out.split_at_mut(body);

    lanes.add_lanes(a_body, b_body, out_body);

    for ((o, &x), &y) in out_tail.iter_mut().zip(a_tail).zip(b_tail) {
        *o = x.scalar_add(y);
    }

    Ok(())
}

/// Vectorized kernel built on [`PortableLanes`]; available everywhere
pub struct PortableLaneKernel;

impl KernelProvider for PortableLaneKernel {
    fn name(&self) -> &'static str {
        "portable-lanes"
    }

    fn backend(&self) -> Backend {
        Backend::Vectorized
    }

    fn is_available(&self) -> bool {
        true
    }

    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) -> KernelResult<()> {
        lane_add(&PortableLanes, a, b, out)
    }

    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) -> KernelResult<()> {
        lane_add(&PortableLanes, a, b, out)
    }
}
