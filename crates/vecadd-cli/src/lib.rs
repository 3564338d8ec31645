//! Library side of the `vecadd` binary: subcommands and output plumbing.

pub mod commands;
pub mod exit;
pub mod output;
