//! CLI module for coderefine - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
