//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - run: refine a task until the evaluator accepts a program
//! - exec: run one file through the sandbox
//! - schema: print the execute_python function schema

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coderefine - generate, execute and refine programs until they pass review
#[derive(Parser, Debug)]
#[command(name = "coderefine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and refine a program for a task
    Run {
        /// Task description
        task: String,

        /// Override the configured attempt budget
        #[arg(short = 'n', long)]
        max_attempts: Option<u32>,
    },

    /// Execute a source file once in the sandbox
    Exec {
        /// File whose contents are executed
        file: PathBuf,

        /// Deadline in seconds (1-30)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Print the execute_python function schema as JSON
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["coderefine"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["coderefine", "-v", "schema"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["coderefine", "schema", "-c", "/path/to/config.yml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::try_parse_from(["coderefine", "run", "print the first 10 primes"]).unwrap();
        match cli.command {
            Commands::Run { task, max_attempts } => {
                assert_eq!(task, "print the first 10 primes");
                assert!(max_attempts.is_none());
            }
            other => panic!("expected Run, got {:?}", other),
        }
    }

    #[test]
    fn test_run_command_max_attempts() {
        let cli = Cli::try_parse_from(["coderefine", "run", "task", "--max-attempts", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::Run { max_attempts: Some(5), .. }));
    }

    #[test]
    fn test_exec_command() {
        let cli = Cli::try_parse_from(["coderefine", "exec", "script.py", "-t", "5"]).unwrap();
        match cli.command {
            Commands::Exec { file, timeout } => {
                assert_eq!(file, PathBuf::from("script.py"));
                assert_eq!(timeout, Some(5));
            }
            other => panic!("expected Exec, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_command() {
        let cli = Cli::try_parse_from(["coderefine", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
