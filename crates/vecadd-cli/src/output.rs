//! Where command results go
//!
//! A command produces one serializable value. With `--format json` that value
//! is the only thing on stdout; otherwise the command's renderer turns it into
//! text. Progress notes always go to stderr.

use clap::ValueEnum;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl OutputConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Progress note on stderr; dropped in JSON mode
    pub fn status(&self, msg: &str) {
        if self.format == OutputFormat::Text {
            eprintln!("{msg}");
        }
    }

    /// Write `value` to stdout, as pretty JSON or through `render`
    pub fn emit<T: Serialize>(
        &self,
        value: &T,
        render: impl FnOnce(&T) -> String,
    ) -> anyhow::Result<()> {
        let text = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)? + "\n",
            OutputFormat::Text => render(value),
        };
        std::io::stdout().lock().write_all(text.as_bytes())?;
        Ok(())
    }
}
