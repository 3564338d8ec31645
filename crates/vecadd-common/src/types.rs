//! Element types shared by every kernel family

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element data type of a numeric array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    F32,
    I32,
}

impl DType {
    /// Size of one element in bytes
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F32 | Self::I32 => 4,
        }
    }

    /// Elements per vector-kernel iteration for this type
    pub const fn lanes(self) -> usize {
        match self {
            Self::F32 => f32::LANES,
            Self::I32 => i32::LANES,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32 => write!(f, "f32"),
            Self::I32 => write!(f, "i32"),
        }
    }
}

/// Equality rule used when certifying two results as equivalent.
///
/// Integers compare exactly and ignore `epsilon`. Floats are equal when they
/// compare equal, are both NaN, or differ by at most `epsilon`.
pub trait Numeric: Copy + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Does `candidate` match `reference` under this type's rule?
    fn matches(reference: Self, candidate: Self, epsilon: f64) -> bool;

    /// `|reference - candidate|` widened to f64
    fn abs_error(reference: Self, candidate: Self) -> f64;
}

impl Numeric for i32 {
    #[inline]
    fn matches(reference: Self, candidate: Self, _epsilon: f64) -> bool {
        reference == candidate
    }

    #[inline]
    fn abs_error(reference: Self, candidate: Self) -> f64 {
        (i64::from(reference) - i64::from(candidate)).unsigned_abs() as f64
    }
}

impl Numeric for f32 {
    #[inline]
    fn matches(reference: Self, candidate: Self, epsilon: f64) -> bool {
        if reference == candidate || (reference.is_nan() && candidate.is_nan()) {
            return true;
        }
        // NaN on one side yields a NaN difference, which never passes
        Self::abs_error(reference, candidate) <= epsilon
    }

    #[inline]
    fn abs_error(reference: Self, candidate: Self) -> f64 {
        (f64::from(reference) - f64::from(candidate)).abs()
    }
}

impl Numeric for f64 {
    #[inline]
    fn matches(reference: Self, candidate: Self, epsilon: f64) -> bool {
        if reference == candidate || (reference.is_nan() && candidate.is_nan()) {
            return true;
        }
        Self::abs_error(reference, candidate) <= epsilon
    }

    #[inline]
    fn abs_error(reference: Self, candidate: Self) -> f64 {
        (reference - candidate).abs()
    }
}

/// A kernel-addressable element type (32-bit float or 32-bit signed integer)
pub trait Element: Numeric + Default {
    /// Runtime tag for this type
    const DTYPE: DType;

    /// Vector lane width: 8 for f32 (256-bit), 4 for i32 (128-bit)
    const LANES: usize;

    /// Scalar addition with the type's native semantics
    fn scalar_add(self, rhs: Self) -> Self;

    /// Type-erased view used at the device boundary
    fn as_host(slice: &[Self]) -> HostSlice<'_>;

    /// Type-erased mutable view used at the device boundary
    fn as_host_mut(slice: &mut [Self]) -> HostSliceMut<'_>;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
    const LANES: usize = 8;

    #[inline(always)]
    fn scalar_add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn as_host(slice: &[Self]) -> HostSlice<'_> {
        HostSlice::F32(slice)
    }

    fn as_host_mut(slice: &mut [Self]) -> HostSliceMut<'_> {
        HostSliceMut::F32(slice)
    }
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;
    const LANES: usize = 4;

    #[inline(always)]
    fn scalar_add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    fn as_host(slice: &[Self]) -> HostSlice<'_> {
        HostSlice::I32(slice)
    }

    fn as_host_mut(slice: &mut [Self]) -> HostSliceMut<'_> {
        HostSliceMut::I32(slice)
    }
}

/// Borrowed host array with its element type erased
#[derive(Debug, Clone, Copy)]
pub enum HostSlice<'a> {
    F32(&'a [f32]),
    I32(&'a [i32]),
}

impl HostSlice<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I32(_) => DType::I32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::F32(s) => s.len(),
            Self::I32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn size_in_bytes(&self) -> usize {
        self.len() * self.dtype().size_in_bytes()
    }
}

/// Mutable host array with its element type erased
#[derive(Debug)]
pub enum HostSliceMut<'a> {
    F32(&'a mut [f32]),
    I32(&'a mut [i32]),
}

impl HostSliceMut<'_> {
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I32(_) => DType::I32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::F32(s) => s.len(),
            Self::I32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn size_in_bytes(&self) -> usize {
        self.len() * self.dtype().size_in_bytes()
    }
}
