//! `vecadd devices`: what this build and host can run

use crate::exit::EXIT_SUCCESS;
use crate::output::OutputConfig;
use anyhow::Result;
use clap::Args;
use serde::Serialize;
use vecadd_common::{Backend, BenchConfig, KernelCapabilities};
use vecadd_kernels::{device_features, KernelSet};

/// Show SIMD level, accelerator status and available kernels
#[derive(Args, Debug, Default, Clone)]
pub struct DevicesCommand {}

/// Capability report
#[derive(Debug, Serialize)]
pub struct DeviceReport {
    pub capabilities: KernelCapabilities,
    pub simd_kernel: String,
    pub accelerator: String,
    /// Why the accelerator cannot run, if it cannot
    pub accelerator_unavailable: Option<String>,
    pub available_kernels: Vec<String>,
}

impl DevicesCommand {
    pub fn report(&self, config: &BenchConfig) -> DeviceReport {
        let kernels = KernelSet::from_config(config);
        let accelerator = kernels.get(Backend::Accelerator);

        // An empty addition reaches the availability check without touching memory
        let accelerator_unavailable =
            accelerator.add_f32(&[], &[], &mut []).err().map(|e| e.to_string());

        DeviceReport {
            capabilities: device_features::capabilities(),
            simd_kernel: kernels.get(Backend::Vectorized).name().to_string(),
            accelerator: accelerator.name().to_string(),
            accelerator_unavailable,
            available_kernels: kernels
                .list_available_providers()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn execute(&self, config: &BenchConfig, output: &OutputConfig) -> Result<i32> {
        let report = self.report(config);
        output.emit(&report, |r| {
            let accelerator = match &r.accelerator_unavailable {
                None => r.accelerator.clone(),
                Some(reason) => format!("{} ({})", r.accelerator, reason),
            };
            format!(
                "{}  Vectorized kernel: {}\n  Accelerator kernel: {}\n  Available kernels: {}\n",
                device_features::device_capability_summary(),
                r.simd_kernel,
                accelerator,
                r.available_kernels.join(", ")
            )
        })?;
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecadd_common::DeviceRequest;

    #[test]
    fn host_device_is_listed() {
        let config = BenchConfig { device: DeviceRequest::Host, ..BenchConfig::default() };
        let report = DevicesCommand::default().report(&config);
        assert_eq!(report.accelerator, "host-parallel");
        assert!(report.accelerator_unavailable.is_none());
        assert_eq!(report.available_kernels.len(), 3);
    }

    #[test]
    fn disabled_device_explains_why() {
        let config = BenchConfig { device: DeviceRequest::None, ..BenchConfig::default() };
        let report = DevicesCommand::default().report(&config);
        assert_eq!(report.accelerator, "unavailable");
        let reason = report.accelerator_unavailable.unwrap();
        assert!(reason.contains("disabled by configuration"));
        assert!(!report.available_kernels.contains(&"unavailable".to_string()));
    }
}
