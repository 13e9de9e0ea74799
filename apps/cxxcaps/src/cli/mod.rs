//! # cxxcaps CLI Module
//!
//! This module implements the CLI interface for cxxcaps.
//!
//! ## Available Commands
//!
//! - `identify` - Show the compiler identity and version
//! - `resolve` - Show identity, version and the full feature table
//! - `header` - Generate a portability header
//! - `table` - Show the classification order and capability rules
//!
//! Every command except `table` reads its environment from `--macros`,
//! `--profile`, `--define`, `--std` and `--probe`.

mod commands;

use clap::{Args, Parser, Subcommand};
use cxxcaps_core::{CapsError, EnvironmentError};
use std::path::PathBuf;
use thiserror::Error;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// cxxcaps - Toolchain Capability Resolver
///
/// Identifies the C++ compiler behind a set of predefined macros and
/// resolves which language features it supports.
#[derive(Parser, Debug)]
#[command(name = "cxxcaps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the environment comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Predefined-macro dump (`cc -dM -E -x c++ /dev/null`), or `-` for stdin
    #[arg(short, long, value_name = "FILE")]
    pub macros: Option<PathBuf>,

    /// TOML environment profile
    #[arg(short, long, value_name = "FILE", conflicts_with = "macros")]
    pub profile: Option<PathBuf>,

    /// Language standard, overrides __cplusplus (c++98 .. c++23)
    #[arg(short = 's', long = "std", value_name = "LEVEL")]
    pub standard: Option<String>,

    /// Capability probe answering true (repeatable)
    #[arg(long = "probe", value_name = "NAME")]
    pub probes: Vec<String>,

    /// Extra definition NAME or NAME=VALUE (repeatable)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    pub defines: Vec<String>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the compiler identity and version
    Identify {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Resolve the complete feature table
    Resolve {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Generate a portability header
    Header {
        #[command(flatten)]
        input: InputArgs,

        /// Prefix of every generated macro
        #[arg(long, default_value = "CXX")]
        prefix: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the classification order and capability rules
    Table,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Everything that can make a command fail.
#[derive(Debug, Error)]
pub enum CliError {
    /// Malformed input.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// The toolchain is unsupported.
    #[error(transparent)]
    Caps(#[from] CapsError),

    /// A file could not be read or written.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An input file exceeds the size limit.
    #[error("File '{path}' is {size} bytes, exceeding the limit of {limit} bytes")]
    FileTooLarge { path: String, size: u64, limit: u64 },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), CliError> {
    let json_mode = cli.json;

    match cli.command {
        Commands::Identify { input } => cmd_identify(&load_environment(&input)?, json_mode),
        Commands::Resolve { input } => cmd_resolve(&load_environment(&input)?, json_mode),
        Commands::Header {
            input,
            prefix,
            output,
        } => cmd_header(
            &load_environment(&input)?,
            json_mode,
            &prefix,
            output.as_deref(),
        ),
        Commands::Table => cmd_table(json_mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeatable_inputs() {
        let cli = Cli::try_parse_from([
            "cxxcaps", "--json", "resolve", "--std", "c++14", "-D", "__GNUC__=9", "-D",
            "__GNUC_MINOR__=3", "--probe", "cxx_constexpr",
        ])
        .expect("parse");
        assert!(cli.json);
        match cli.command {
            Commands::Resolve { input } => {
                assert_eq!(input.standard.as_deref(), Some("c++14"));
                assert_eq!(input.defines.len(), 2);
                assert_eq!(input.probes, vec!["cxx_constexpr".to_string()]);
            }
            other => unreachable!("parsed {:?}", other),
        }
    }

    #[test]
    fn macros_and_profile_conflict() {
        let result = Cli::try_parse_from([
            "cxxcaps", "identify", "--macros", "a.txt", "--profile", "b.toml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn header_prefix_defaults_to_cxx() {
        let cli = Cli::try_parse_from(["cxxcaps", "header"]).expect("parse");
        match cli.command {
            Commands::Header { prefix, output, .. } => {
                assert_eq!(prefix, "CXX");
                assert!(output.is_none());
            }
            other => unreachable!("parsed {:?}", other),
        }
    }
}
