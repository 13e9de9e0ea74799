//! # cxxcaps - Toolchain Capability Resolver
//!
//! The main binary for the cxxcaps resolver.
//!
//! This application provides:
//! - Compiler identification from predefined macros
//! - Feature table resolution
//! - Portability header generation
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                apps/cxxcaps (THE BINARY)              │
//! │                                                       │
//! │  ┌─────────────┐   ┌──────────────┐   ┌───────────┐  │
//! │  │    CLI      │   │ Input loader │   │  Reports  │  │
//! │  │   (clap)    │   │ (dump, TOML) │   │ (text/JSON│  │
//! │  └──────┬──────┘   └──────┬───────┘   └─────┬─────┘  │
//! │         └─────────────────┼─────────────────┘        │
//! │                           ▼                          │
//! │                   ┌───────────────┐                  │
//! │                   │ cxxcaps-core  │                  │
//! │                   │  (THE LOGIC)  │                  │
//! │                   └───────────────┘                  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Identify the compiler from its macro dump
//! g++ -dM -E -x c++ /dev/null | cxxcaps identify --macros -
//!
//! # Resolve features for a described toolchain
//! cxxcaps resolve -D __GNUC__=4 -D __GNUC_MINOR__=9 --std c++98
//!
//! # Generate a header
//! cxxcaps header --profile clang10.toml --prefix APP -o app_compiler.h
//! ```

use clap::Parser;
use cxxcaps::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse first: --verbose and --quiet pick the default log level.
    let cli = cli::Cli::parse();

    // CXXCAPS_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("CXXCAPS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "cxxcaps=debug"
    } else if cli.quiet {
        "cxxcaps=warn"
    } else {
        "cxxcaps=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries results only.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
