//! GPU device implementations

pub mod cuda;

pub use cuda::*;
