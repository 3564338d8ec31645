//! `vecadd run`: time and cross-validate every backend on both element types

use crate::exit::{EXIT_SUCCESS, EXIT_VERIFICATION_FAIL};
use crate::output::OutputConfig;
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use vecadd_common::{Backend, BenchConfig, KernelCapabilities};
use vecadd_crossval::{benchmark_inputs, InputElement, ParityHarness, ParityReport};
use vecadd_kernels::{device_features, TransferSnapshot};

/// Benchmark the scalar, vectorized, and accelerator kernels
#[derive(Args, Debug, Default, Clone)]
pub struct RunCommand {
    /// Elements in both suites
    #[arg(short = 'n', long, value_name = "N")]
    pub elements: Option<usize>,

    /// Elements in the f32 suite
    #[arg(long, value_name = "N")]
    pub float_elements: Option<usize>,

    /// Elements in the i32 suite
    #[arg(long, value_name = "N")]
    pub int_elements: Option<usize>,

    /// Absolute tolerance for f32 verification
    #[arg(short, long, value_name = "EPS")]
    pub epsilon: Option<f64>,

    /// Timed repetitions per backend (fastest is reported)
    #[arg(short, long, value_name = "N")]
    pub iterations: Option<u32>,

    /// Run the candidate backends on separate threads
    #[arg(long)]
    pub concurrent: bool,

    /// Also write the JSON report to this file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// Everything one run produced
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub capabilities: KernelCapabilities,
    pub float: ParityReport<f32>,
    pub int: ParityReport<i32>,
    /// Host/device traffic of the accelerator across both suites
    pub accelerator_transfers: Option<TransferSnapshot>,
    pub all_verified: bool,
}

impl RunCommand {
    fn apply(&self, config: &mut BenchConfig) {
        if let Some(n) = self.elements {
            config.float_elements = n;
            config.int_elements = n;
        }
        if let Some(n) = self.float_elements {
            config.float_elements = n;
        }
        if let Some(n) = self.int_elements {
            config.int_elements = n;
        }
        if let Some(eps) = self.epsilon {
            config.epsilon = eps;
        }
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if self.concurrent {
            config.concurrent_backends = true;
        }
    }

    /// Run both suites and return the summary without printing it
    pub fn summarize(&self, mut config: BenchConfig) -> Result<RunSummary> {
        self.apply(&mut config);
        config.validate().context("Invalid run options")?;

        let harness = ParityHarness::from_config(&config);
        info!(
            "Running {} iteration(s), accelerator {}",
            config.iterations,
            harness.kernels().candidates()[1].name()
        );

        let float = suite::<f32>(&harness, config.float_elements, config.iterations);
        let int = suite::<i32>(&harness, config.int_elements, config.iterations);
        let all_verified = float.all_verified() && int.all_verified();
        let accelerator_transfers = harness.kernels().get(Backend::Accelerator).transfer_stats();

        Ok(RunSummary {
            capabilities: device_features::capabilities(),
            float,
            int,
            accelerator_transfers,
            all_verified,
        })
    }

    /// Execute the command and return the process exit code
    pub fn execute(&self, config: BenchConfig, output: &OutputConfig) -> Result<i32> {
        let summary = self.summarize(config)?;

        if let Some(path) = &self.report {
            let json = serde_json::to_string_pretty(&summary)?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            output.status(&format!("Report written to {}", path.display()));
        }

        output.emit(&summary, render_text)?;

        Ok(if summary.all_verified { EXIT_SUCCESS } else { EXIT_VERIFICATION_FAIL })
    }
}

fn suite<T: InputElement>(harness: &ParityHarness, elements: usize, iterations: u32) -> ParityReport<T> {
    let (a, b) = benchmark_inputs::<T>(elements);
    info!("{} suite: {} elements", T::DTYPE, elements);
    harness.run_repeated(&a, &b, iterations)
}

/// Human-readable rendering of a [`RunSummary`]
pub fn render_text(summary: &RunSummary) -> String {
    let mut text = format!("{}\n\n", style(summary.capabilities.summary()).dim());
    text.push_str(&summary.float.to_string());
    text.push('\n');
    text.push_str(&summary.int.to_string());
    text.push('\n');

    if let Some(t) = summary.accelerator_transfers.filter(|t| t.launches > 0) {
        text.push_str(&format!(
            "Accelerator traffic: {} launches, {} bytes in, {} bytes out\n\n",
            t.launches, t.bytes_h2d, t.bytes_d2h
        ));
    }

    let verdict = if summary.all_verified {
        style("All backends verified successfully").green().bold()
    } else {
        style("Verification FAILED").red().bold()
    };
    text.push_str(&format!("{}\n", verdict));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecadd_common::DeviceRequest;

    fn small(device: DeviceRequest) -> BenchConfig {
        BenchConfig {
            float_elements: 1_003,
            int_elements: 17,
            device,
            ..BenchConfig::default()
        }
    }

    #[test]
    fn host_device_run_verifies() {
        let summary = RunCommand::default().summarize(small(DeviceRequest::Host)).unwrap();
        assert!(summary.all_verified);
        assert_eq!(summary.float.elements, 1_003);
        assert_eq!(summary.int.elements, 17);
        assert!(render_text(&summary).contains("All backends verified successfully"));
    }

    #[test]
    fn accelerator_traffic_is_summarized() {
        let cmd = RunCommand { iterations: Some(2), ..RunCommand::default() };
        let summary = cmd.summarize(small(DeviceRequest::Host)).unwrap();

        // two suites, two iterations each, a and b in and the sum out
        let elements = (1_003 + 17) * 2;
        let transfers = summary.accelerator_transfers.unwrap();
        assert_eq!(transfers.launches, 4);
        assert_eq!(transfers.bytes_h2d, 2 * 4 * elements);
        assert_eq!(transfers.bytes_d2h, 4 * elements);
        assert!(render_text(&summary).contains("Accelerator traffic: 4 launches"));
    }

    #[test]
    fn disabled_accelerator_moves_no_data() {
        let summary = RunCommand::default().summarize(small(DeviceRequest::None)).unwrap();
        assert_eq!(summary.accelerator_transfers, Some(TransferSnapshot::default()));
        assert!(!render_text(&summary).contains("Accelerator traffic"));
    }

    #[test]
    fn disabled_device_fails_verification_but_completes() {
        let cmd = RunCommand { elements: Some(10), ..RunCommand::default() };
        let summary = cmd.summarize(small(DeviceRequest::None)).unwrap();
        assert!(!summary.all_verified);
        assert_eq!(summary.float.elements, 10);
        assert_eq!(summary.float.failures().count(), 1);
        assert!(render_text(&summary).contains("failed to execute"));
    }

    #[test]
    fn flag_overrides_are_validated() {
        let cmd = RunCommand { iterations: Some(0), ..RunCommand::default() };
        assert!(cmd.summarize(small(DeviceRequest::Host)).is_err());
    }

    #[test]
    fn report_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let cmd = RunCommand {
            elements: Some(8),
            report: Some(path.clone()),
            ..RunCommand::default()
        };

        let output = OutputConfig::new(crate::output::OutputFormat::Json);
        let code = cmd.execute(small(DeviceRequest::Host), &output).unwrap();

        assert_eq!(code, EXIT_SUCCESS);
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["all_verified"], true);
        assert_eq!(json["int"]["dtype"], "i32");
    }
}
