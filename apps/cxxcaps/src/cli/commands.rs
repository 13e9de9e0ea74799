//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{CliError, InputArgs};
use crate::report::{HeaderReport, IdentifyReport, ResolveReport, TableReport};
use cxxcaps_core::{
    Environment, LanguageStandard, detect, environment_from_profile, formats::profile::MAX_PROFILE_SIZE,
    identify, matching_signatures, render_header,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a predefined-macro dump (16 MB).
///
/// Real dumps are a few tens of kilobytes.
const MAX_MACROS_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Path argument that selects standard input.
const STDIN_PATH: &str = "-";

fn io_error(path: &Path, source: std::io::Error) -> CliError {
    CliError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Validate input file path and size, returning the canonical path.
fn validate_input_file(path: &Path, max_size: u64) -> Result<PathBuf, CliError> {
    // Canonicalize resolves "..", symlinks, and validates existence
    let canonical = path.canonicalize().map_err(|e| io_error(path, e))?;

    if !canonical.is_file() {
        return Err(io_error(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        ));
    }

    let size = std::fs::metadata(&canonical)
        .map_err(|e| io_error(path, e))?
        .len();
    if size > max_size {
        return Err(CliError::FileTooLarge {
            path: path.display().to_string(),
            size,
            limit: max_size,
        });
    }

    Ok(canonical)
}

/// Validate output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, CliError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| io_error(parent, e))?;
    if !canonical_parent.is_dir() {
        return Err(io_error(
            parent,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let filename = path.file_name().ok_or_else(|| {
        io_error(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "output path has no filename"),
        )
    })?;

    Ok(canonical_parent.join(filename))
}

/// Read a text input from a file, or from stdin when the path is `-`.
fn read_input(path: &Path, max_size: u64) -> Result<String, CliError> {
    if path.as_os_str() == STDIN_PATH {
        let mut text = String::new();
        std::io::stdin()
            .take(max_size.saturating_add(1))
            .read_to_string(&mut text)
            .map_err(|e| io_error(path, e))?;
        let size = text.len() as u64;
        if size > max_size {
            return Err(CliError::FileTooLarge {
                path: STDIN_PATH.to_string(),
                size,
                limit: max_size,
            });
        }
        return Ok(text);
    }

    let canonical = validate_input_file(path, max_size)?;
    std::fs::read_to_string(&canonical).map_err(|e| io_error(path, e))
}

// =============================================================================
// ENVIRONMENT LOADING
// =============================================================================

/// Build the environment described by the input arguments.
///
/// The base comes from `--profile` or `--macros` (empty if neither is given);
/// `--define`, then `--std`, then `--probe` are applied on top.
pub fn load_environment(input: &InputArgs) -> Result<Environment, CliError> {
    let mut env = if let Some(path) = &input.profile {
        let text = read_input(path, MAX_PROFILE_SIZE as u64)?;
        let env = environment_from_profile(&text)?;
        debug!("Loaded profile {:?} ({} definitions)", path, env.len());
        env
    } else if let Some(path) = &input.macros {
        let text = read_input(path, MAX_MACROS_FILE_SIZE)?;
        let env = Environment::from_predefined_macros(&text)?;
        debug!("Loaded macro dump {:?} ({} definitions)", path, env.len());
        env
    } else {
        Environment::new()
    };

    for assignment in &input.defines {
        env.insert_assignment(assignment)?;
    }
    if let Some(standard) = &input.standard {
        env.set_standard(standard.parse::<LanguageStandard>()?);
    }
    for probe in &input.probes {
        env.insert_probe(probe.as_str())?;
    }

    debug!(
        "Environment ready: {} definitions, fingerprint {:016x}",
        env.len(),
        env.fingerprint()
    );
    Ok(env)
}

// =============================================================================
// IDENTIFY COMMAND
// =============================================================================

/// Show the compiler identity and version.
pub fn cmd_identify(env: &Environment, json_mode: bool) -> Result<(), CliError> {
    let identification = identify(env)?;
    let report = IdentifyReport::new(&identification, matching_signatures(env), env);
    info!(
        "Identified {} {}",
        report.identity, report.version_string
    );

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        return Ok(());
    }

    println!("Compiler Identification");
    println!("=======================");
    println!("Compiler:    {}", report.identity);
    println!("Version:     {}", report.version_string);
    if let Some(simulated) = &report.simulated {
        println!("Simulates:   {}", simulated);
    }
    let candidates: Vec<&str> = report.candidates.iter().map(|id| id.name()).collect();
    println!("Candidates:  {}", candidates.join(", "));
    if !report.probes.is_empty() {
        println!("Probes:      {}", report.probes.join(", "));
    }
    println!("Fingerprint: {}", report.fingerprint);

    Ok(())
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

/// Resolve and print the complete feature table.
pub fn cmd_resolve(env: &Environment, json_mode: bool) -> Result<(), CliError> {
    let resolution = detect(env)?;
    let report = ResolveReport::from(&resolution);
    info!(
        "Resolved {} {}: {} features supported",
        report.identity, report.version_string, report.supported_count
    );

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        return Ok(());
    }

    println!("Compiler: {} {}", report.identity, report.version_string);
    if let Some(simulated) = &report.simulated {
        println!("Simulates: {}", simulated);
    }
    println!();
    for (feature, supported) in report.features.iter() {
        println!(
            "  {:<22} {}",
            feature.name(),
            if supported { "yes" } else { "no" }
        );
    }
    println!();
    println!(
        "{} of {} features supported",
        report.supported_count,
        report.features.iter().count()
    );

    Ok(())
}

// =============================================================================
// HEADER COMMAND
// =============================================================================

/// Generate a portability header on stdout or into a file.
pub fn cmd_header(
    env: &Environment,
    json_mode: bool,
    prefix: &str,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let resolution = detect(env)?;
    let header = render_header(&resolution, prefix)?;

    let Some(output) = output else {
        if json_mode {
            let output = serde_json::json!({
                "identity": resolution.identity,
                "prefix": prefix,
                "header": header
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        } else {
            print!("{}", header);
        }
        return Ok(());
    };

    let path = validate_output_path(output)?;
    std::fs::write(&path, &header).map_err(|e| io_error(&path, e))?;
    info!("Wrote {} bytes to {:?}", header.len(), path);

    if json_mode {
        let report = HeaderReport {
            identity: resolution.identity,
            prefix: prefix.to_string(),
            path: path.display().to_string(),
            bytes: header.len(),
        };
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
    } else {
        println!(
            "Header for {} written to {}",
            resolution.identity,
            path.display()
        );
    }

    Ok(())
}

// =============================================================================
// TABLE COMMAND
// =============================================================================

/// Show the classification order and the capability rules.
pub fn cmd_table(json_mode: bool) -> Result<(), CliError> {
    let report = TableReport::built_in();

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
        return Ok(());
    }

    println!("Classification Order");
    println!("====================");
    for row in &report.signatures {
        println!(
            "{:>3}. {:<12} {}{}",
            row.priority,
            row.identity.name(),
            row.predicate,
            if row.has_capabilities { "" } else { "  (no capability table)" }
        );
    }

    for table in &report.capabilities {
        println!();
        println!("{} (minimum {})", table.identity, table.floor);
        println!("{}", "-".repeat(table.identity.name().len() + 12));
        for rule in &table.rules {
            let mut line = format!(
                "  {:<22} >= {:<6} {}",
                rule.feature.name(),
                rule.floor.to_string(),
                rule.gate
            );
            if let Some(shortcut) = &rule.shortcut {
                line.push_str(&format!("  or {}", shortcut));
            }
            println!("{}", line);
        }
    }

    Ok(())
}
