//! # cxxcaps-core
//!
//! The deterministic toolchain capability resolver - THE LOGIC.
//!
//! Given the predefined symbols of an unknown C++ build environment, this
//! crate determines which compiler product is in use, its version, and which
//! of a fixed set of language features that compiler supports at that
//! version.
//!
//! ## Pipeline
//!
//! ```text
//! Environment → classify → CompilerId → resolve → Resolution
//!                                        ├─ version::decode
//!                                        ├─ version::decode_simulated
//!                                        └─ rules::table_for → FeatureTable
//! ```
//!
//! ## Architectural Constraints
//!
//! - Pure Rust: no async, no I/O, no process spawning
//! - Deterministic: BTreeMap/BTreeSet only, no floats
//! - Closed: identities and features are fixed enumerations
//! - Fail fast: unrecognized toolchains and versions below the floor are
//!   errors, never guesses
//!
//! ## Example
//!
//! ```
//! use cxxcaps_core::{CompilerId, Environment, Feature, LanguageStandard, detect};
//!
//! let env = Environment::new()
//!     .define("__GNUC__", 7)
//!     .define("__GNUC_MINOR__", 0)
//!     .with_standard(LanguageStandard::Cxx11);
//!
//! let resolution = detect(&env).unwrap();
//! assert_eq!(resolution.identity, CompilerId::Gnu);
//! assert!(resolution.supports(Feature::Constexpr));
//! assert!(!resolution.supports(Feature::AttributeDeprecated));
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod cache;
pub mod environment;
pub mod formats;
pub mod identity;
pub mod primitives;
pub mod resolver;
pub mod rules;
pub mod spelling;
pub mod types;
pub mod version;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ALL_COMPILERS, ALL_FEATURES, CapsError, CompilerId, EnvironmentError, Feature,
    LanguageStandard, SimulatedIdentity, VersionComponents, VersionFloor,
};

// =============================================================================
// RE-EXPORTS: Resolver
// =============================================================================

pub use cache::ResolutionCache;
pub use environment::{Environment, parse_integer_literal};
pub use identity::{Signature, classify, matching_signatures, signatures};
pub use resolver::{FeatureTable, Identification, Resolution, detect, identify, resolve};
pub use rules::{CapabilityRule, CapabilityTable, Gate, Shortcut, table_for, tables};
pub use spelling::{Body, Spelling, Spellings, render_header, validate_prefix};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{MacroValue, Profile, environment_from_profile};
