//! CPU kernel implementations

pub mod fallback;
pub mod lanes;

#[cfg(target_arch = "x86_64")]
pub mod x86;

#[cfg(target_arch = "aarch64")]
pub mod arm;

pub use fallback::FallbackKernel;
pub use lanes::{lane_add, LaneOps, PortableLaneKernel, PortableLanes};

#[cfg(target_arch = "x86_64")]
pub use x86::AvxKernel;

#[cfg(target_arch = "aarch64")]
pub use arm::NeonKernel;
