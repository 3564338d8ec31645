//! Fan one input pair out to every backend and verify each candidate
//!
//! No backend failure stops the run: each outcome is recorded
//! independently and every backend is attempted.

use crate::report::{BackendOutcome, BackendRun, ParityReport};
use crate::verify::verify;
use std::time::{Duration, Instant};
use vecadd_common::{BenchConfig, KernelError};
use vecadd_kernels::{add_with, KernelElement, KernelProvider, KernelResult, KernelSet};

/// Runs baseline, vectorized, and accelerator kernels on the same inputs
pub struct ParityHarness {
    kernels: KernelSet,
    epsilon: f64,
    concurrent: bool,
}

impl ParityHarness {
    pub fn new(kernels: KernelSet, epsilon: f64) -> Self {
        Self { kernels, epsilon, concurrent: false }
    }

    /// Kernels, epsilon and concurrency taken from `config`
    pub fn from_config(config: &BenchConfig) -> Self {
        Self::new(KernelSet::from_config(config), config.epsilon)
            .with_concurrency(config.concurrent_backends)
    }

    /// Run the candidates on their own threads
    ///
    /// Inputs are shared read-only and each backend writes only its own
    /// result, so no synchronization is needed.
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn kernels(&self) -> &KernelSet {
        &self.kernels
    }

    /// Compute the baseline, then every candidate, and verify each one
    pub fn run<T: KernelElement>(&self, a: &[T], b: &[T]) -> ParityReport<T> {
        let baseline = self.kernels.baseline();
        let (elapsed, reference) = timed(baseline, a, b);
        if let Err(e) = &reference {
            log::warn!("Baseline kernel {} failed, candidates cannot be verified: {}", baseline.name(), e);
        }

        let candidates = self.kernels.candidates();
        let results: Vec<(Duration, KernelResult<Vec<T>>)> = if self.concurrent {
            std::thread::scope(|scope| {
                let handles: Vec<_> = candidates
                    .iter()
                    .map(|&kernel| scope.spawn(move || timed(kernel, a, b)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle.join().unwrap_or_else(|_| {
                            let reason = "backend thread panicked".to_string();
                            (Duration::ZERO, Err(KernelError::LaunchFailed { reason }))
                        })
                    })
                    .collect()
            })
        } else {
            candidates.iter().map(|&kernel| timed(kernel, a, b)).collect()
        };

        let mut runs = Vec::with_capacity(candidates.len() + 1);
        runs.push(BackendRun {
            backend: baseline.backend(),
            kernel: baseline.name().to_string(),
            elapsed_ms: millis(elapsed),
            outcome: match &reference {
                Ok(_) => BackendOutcome::Reference,
                Err(error) => BackendOutcome::Failed { error: error.clone() },
            },
        });

        for (kernel, (elapsed, result)) in candidates.iter().zip(results) {
            let outcome = match (result, &reference) {
                (Err(error), _) => {
                    log::warn!("{} kernel {} failed: {}", kernel.backend(), kernel.name(), error);
                    BackendOutcome::Failed { error }
                }
                (Ok(_), Err(_)) => BackendOutcome::Unverified,
                (Ok(out), Ok(expected)) => {
                    let verification = verify(expected, &out, self.epsilon);
                    if verification.ok {
                        BackendOutcome::Verified { max_abs_diff: verification.max_abs_diff }
                    } else {
                        log::warn!("{} kernel {}: {}", kernel.backend(), kernel.name(), verification);
                        BackendOutcome::Mismatch { verification }
                    }
                }
            };
            runs.push(BackendRun {
                backend: kernel.backend(),
                kernel: kernel.name().to_string(),
                elapsed_ms: millis(elapsed),
                outcome,
            });
        }

        ParityReport { dtype: T::DTYPE, elements: a.len(), epsilon: self.epsilon, runs }
    }

    /// [`run`](Self::run) `iterations` times, keeping each backend's fastest time
    ///
    /// A backend that fails or mismatches in any iteration keeps that outcome.
    pub fn run_repeated<T: KernelElement>(
        &self,
        a: &[T],
        b: &[T],
        iterations: u32,
    ) -> ParityReport<T> {
        let mut report = self.run(a, b);
        for _ in 1..iterations {
            let next = self.run(a, b);
            for (kept, run) in report.runs.iter_mut().zip(next.runs) {
                kept.elapsed_ms = kept.elapsed_ms.min(run.elapsed_ms);
                if kept.passed() && !run.passed() {
                    kept.outcome = run.outcome;
                }
            }
        }
        report
    }
}

fn timed<T: KernelElement>(
    kernel: &dyn KernelProvider,
    a: &[T],
    b: &[T],
) -> (Duration, KernelResult<Vec<T>>) {
    let start = Instant::now();
    let result = add_with(kernel, a, b);
    let elapsed = start.elapsed();
    log::debug!("{} kernel {} took {:?}", kernel.backend(), kernel.name(), elapsed);
    (elapsed, result)
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1e3
}
