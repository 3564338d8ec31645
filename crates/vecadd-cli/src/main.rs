//! vecadd CLI
//!
//! Times element-wise addition on the scalar, vectorized, and accelerator
//! backends and cross-validates every result against the scalar baseline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use vecadd_cli::commands::{ConfigArgs, DevicesCommand, RunCommand};
use vecadd_cli::exit::EXIT_GENERIC_FAIL;
use vecadd_cli::output::{OutputConfig, OutputFormat};

/// vecadd - multi-backend vector addition benchmark
#[derive(Parser)]
#[command(name = "vecadd")]
#[command(about = "Benchmark and cross-validate element-wise addition kernels")]
#[command(long_about = r#"
Adds two large arrays (f32, then i32) on every backend: the scalar baseline,
the SIMD lane kernel, and the accelerator. Each result is verified against
the baseline and the run exits non-zero if any backend failed or disagreed.

Examples:
  # Default run (25M elements per suite, accelerator auto-detected)
  vecadd run

  # Smaller run on the host thread-pool device, JSON output
  vecadd --device host --format json run --elements 1000000

  # Show what this build can run
  vecadd devices
"#)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Log format (pretty, compact, json)
    #[arg(long, value_name = "FORMAT", default_value = "compact", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark and verify every backend (default)
    #[command(alias = "bench")]
    Run(RunCommand),

    /// Show SIMD level and accelerator availability
    #[command(alias = "info")]
    Devices(DevicesCommand),
}

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level, &cli.log_format);

    let code = match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("Command failed: {}", e);
            for cause in e.chain().skip(1) {
                error!("  Caused by: {}", cause);
            }
            eprintln!("Error: {:#}", e);
            EXIT_GENERIC_FAIL
        }
    };
    std::process::exit(code);
}

fn execute(cli: Cli) -> Result<i32> {
    let config = cli.config.load()?;
    let output = OutputConfig::new(cli.format);

    match cli.command {
        Some(Commands::Run(cmd)) => cmd.execute(config, &output),
        Some(Commands::Devices(cmd)) => cmd.execute(&config, &output),
        None => RunCommand::default().execute(config, &output),
    }
}

/// Install the tracing subscriber; `RUST_LOG` wins over `--log-level`.
///
/// `log` records from the library crates are forwarded to it.
fn setup_logging(level: &str, format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        "json" => {
            subscriber.json().with_timer(tracing_subscriber::fmt::time::uptime()).init();
        }
        "pretty" => {
            subscriber.pretty().init();
        }
        _ => {
            subscriber.compact().init();
        }
    }
}
