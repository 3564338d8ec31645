//! Common types, traits, and utilities for vecadd
//!
//! This crate provides the foundational types shared by the kernel and
//! cross-validation crates: element typing, the backend registry, error
//! handling and benchmark configuration.

pub mod config;
pub mod error;
pub mod kernel_registry;
pub mod types;

pub use config::{BenchConfig, ConfigError, DeviceRequest, DEFAULT_EPSILON, ENV_OVERRIDES};
pub use error::*;
pub use kernel_registry::{Backend, KernelCapabilities, SimdLevel};
pub use types::*;
