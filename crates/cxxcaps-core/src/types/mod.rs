//! # Core Type Definitions
//!
//! This module contains the closed vocabularies of the resolver:
//! - Compiler identities (`CompilerId`)
//! - Capability flags (`Feature`)
//! - Language standard levels (`LanguageStandard`)
//! - Version data (`VersionComponents`, `VersionFloor`, `SimulatedIdentity`)
//! - Error types (`CapsError`, `EnvironmentError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Are plain `Copy`/owned data, `Send + Sync`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// COMPILER IDENTITY
// =============================================================================

/// A compiler product, selected from a closed enumeration.
///
/// Declaration order matches classification priority (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompilerId {
    Comeau,
    Intel,
    PathScale,
    Embarcadero,
    Borland,
    Watcom,
    OpenWatcom,
    SunPro,
    #[serde(rename = "HP")]
    Hp,
    Compaq,
    #[serde(rename = "zOS")]
    ZOs,
    #[serde(rename = "XLClang")]
    XlClang,
    #[serde(rename = "XL")]
    Xl,
    VisualAge,
    #[serde(rename = "PGI")]
    Pgi,
    Cray,
    #[serde(rename = "TI")]
    Ti,
    Fujitsu,
    #[serde(rename = "GHS")]
    Ghs,
    #[serde(rename = "SCO")]
    Sco,
    #[serde(rename = "ARMCC")]
    Armcc,
    AppleClang,
    #[serde(rename = "ARMClang")]
    ArmClang,
    Clang,
    #[serde(rename = "GNU")]
    Gnu,
    #[serde(rename = "MSVC")]
    Msvc,
    #[serde(rename = "ADSP")]
    Adsp,
    #[serde(rename = "IAR")]
    Iar,
    #[serde(rename = "MIPSpro")]
    MipsPro,
}

/// Every identity, in declaration order.
pub const ALL_COMPILERS: [CompilerId; 29] = [
    CompilerId::Comeau,
    CompilerId::Intel,
    CompilerId::PathScale,
    CompilerId::Embarcadero,
    CompilerId::Borland,
    CompilerId::Watcom,
    CompilerId::OpenWatcom,
    CompilerId::SunPro,
    CompilerId::Hp,
    CompilerId::Compaq,
    CompilerId::ZOs,
    CompilerId::XlClang,
    CompilerId::Xl,
    CompilerId::VisualAge,
    CompilerId::Pgi,
    CompilerId::Cray,
    CompilerId::Ti,
    CompilerId::Fujitsu,
    CompilerId::Ghs,
    CompilerId::Sco,
    CompilerId::Armcc,
    CompilerId::AppleClang,
    CompilerId::ArmClang,
    CompilerId::Clang,
    CompilerId::Gnu,
    CompilerId::Msvc,
    CompilerId::Adsp,
    CompilerId::Iar,
    CompilerId::MipsPro,
];

impl CompilerId {
    /// Canonical product name (also the serialized form).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CompilerId::Comeau => "Comeau",
            CompilerId::Intel => "Intel",
            CompilerId::PathScale => "PathScale",
            CompilerId::Embarcadero => "Embarcadero",
            CompilerId::Borland => "Borland",
            CompilerId::Watcom => "Watcom",
            CompilerId::OpenWatcom => "OpenWatcom",
            CompilerId::SunPro => "SunPro",
            CompilerId::Hp => "HP",
            CompilerId::Compaq => "Compaq",
            CompilerId::ZOs => "zOS",
            CompilerId::XlClang => "XLClang",
            CompilerId::Xl => "XL",
            CompilerId::VisualAge => "VisualAge",
            CompilerId::Pgi => "PGI",
            CompilerId::Cray => "Cray",
            CompilerId::Ti => "TI",
            CompilerId::Fujitsu => "Fujitsu",
            CompilerId::Ghs => "GHS",
            CompilerId::Sco => "SCO",
            CompilerId::Armcc => "ARMCC",
            CompilerId::AppleClang => "AppleClang",
            CompilerId::ArmClang => "ARMClang",
            CompilerId::Clang => "Clang",
            CompilerId::Gnu => "GNU",
            CompilerId::Msvc => "MSVC",
            CompilerId::Adsp => "ADSP",
            CompilerId::Iar => "IAR",
            CompilerId::MipsPro => "MIPSpro",
        }
    }

    /// Whether this identity can report a simulated (emulated) toolchain.
    #[must_use]
    pub fn can_simulate(&self) -> bool {
        matches!(
            self,
            CompilerId::Clang | CompilerId::AppleClang | CompilerId::Intel
        )
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompilerId {
    type Err = EnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_COMPILERS
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EnvironmentError::UnknownIdentity(s.to_string()))
    }
}

// =============================================================================
// FEATURE FLAGS
// =============================================================================

/// A language capability whose availability is resolved per identity/version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "cxx_constexpr")]
    Constexpr,
    #[serde(rename = "cxx_deleted_functions")]
    DeletedFunctions,
    #[serde(rename = "cxx_final")]
    Final,
    #[serde(rename = "cxx_noexcept")]
    Noexcept,
    #[serde(rename = "cxx_override")]
    Override,
    #[serde(rename = "cxx_alignas")]
    Alignas,
    #[serde(rename = "cxx_alignof")]
    Alignof,
    #[serde(rename = "cxx_nullptr")]
    Nullptr,
    #[serde(rename = "cxx_static_assert")]
    StaticAssert,
    #[serde(rename = "cxx_attribute_deprecated")]
    AttributeDeprecated,
    #[serde(rename = "cxx_thread_local")]
    ThreadLocal,
}

/// Every feature, in declaration order.
pub const ALL_FEATURES: [Feature; 11] = [
    Feature::Constexpr,
    Feature::DeletedFunctions,
    Feature::Final,
    Feature::Noexcept,
    Feature::Override,
    Feature::Alignas,
    Feature::Alignof,
    Feature::Nullptr,
    Feature::StaticAssert,
    Feature::AttributeDeprecated,
    Feature::ThreadLocal,
];

impl Feature {
    /// Feature name as used by build systems (`cxx_constexpr`, ...).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Constexpr => "cxx_constexpr",
            Feature::DeletedFunctions => "cxx_deleted_functions",
            Feature::Final => "cxx_final",
            Feature::Noexcept => "cxx_noexcept",
            Feature::Override => "cxx_override",
            Feature::Alignas => "cxx_alignas",
            Feature::Alignof => "cxx_alignof",
            Feature::Nullptr => "cxx_nullptr",
            Feature::StaticAssert => "cxx_static_assert",
            Feature::AttributeDeprecated => "cxx_attribute_deprecated",
            Feature::ThreadLocal => "cxx_thread_local",
        }
    }

    /// Upper-case suffix used in generated macro names (`CONSTEXPR`, ...).
    #[must_use]
    pub fn macro_suffix(&self) -> &'static str {
        match self {
            Feature::Constexpr => "CONSTEXPR",
            Feature::DeletedFunctions => "DELETED_FUNCTIONS",
            Feature::Final => "FINAL",
            Feature::Noexcept => "NOEXCEPT",
            Feature::Override => "OVERRIDE",
            Feature::Alignas => "ALIGNAS",
            Feature::Alignof => "ALIGNOF",
            Feature::Nullptr => "NULLPTR",
            Feature::StaticAssert => "STATIC_ASSERT",
            Feature::AttributeDeprecated => "ATTRIBUTE_DEPRECATED",
            Feature::ThreadLocal => "THREAD_LOCAL",
        }
    }

    /// Position of this feature in [`ALL_FEATURES`].
    #[must_use]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = EnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.strip_prefix("cxx_").unwrap_or(s);
        ALL_FEATURES
            .iter()
            .copied()
            .find(|feature| feature.name().trim_start_matches("cxx_") == wanted)
            .ok_or_else(|| EnvironmentError::UnknownFeature(s.to_string()))
    }
}

// =============================================================================
// LANGUAGE STANDARD
// =============================================================================

/// A C++ language standard level, as reported through `__cplusplus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageStandard {
    Cxx98,
    Cxx11,
    Cxx14,
    Cxx17,
    Cxx20,
    Cxx23,
}

impl LanguageStandard {
    /// Value of `__cplusplus` for this level.
    #[must_use]
    pub const fn cplusplus(self) -> i64 {
        match self {
            LanguageStandard::Cxx98 => 199_711,
            LanguageStandard::Cxx11 => 201_103,
            LanguageStandard::Cxx14 => 201_402,
            LanguageStandard::Cxx17 => 201_703,
            LanguageStandard::Cxx20 => 202_002,
            LanguageStandard::Cxx23 => 202_302,
        }
    }

    /// Short year tag (`98`, `11`, ...).
    #[must_use]
    pub fn year(self) -> &'static str {
        match self {
            LanguageStandard::Cxx98 => "98",
            LanguageStandard::Cxx11 => "11",
            LanguageStandard::Cxx14 => "14",
            LanguageStandard::Cxx17 => "17",
            LanguageStandard::Cxx20 => "20",
            LanguageStandard::Cxx23 => "23",
        }
    }
}

impl fmt::Display for LanguageStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c++{}", self.year())
    }
}

impl FromStr for LanguageStandard {
    type Err = EnvironmentError;

    /// Accepts `c++11`, `cxx11`, `gnu++11`, `11`, and the pre-standard
    /// aliases `c++0x`, `c++1y`, `c++1z`, `c++2a`, `c++2b`, `c++03`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let year = ["c++", "cxx", "gnu++"]
            .iter()
            .find_map(|prefix| lower.strip_prefix(prefix))
            .unwrap_or(&lower);

        match year {
            "98" | "03" => Ok(LanguageStandard::Cxx98),
            "11" | "0x" => Ok(LanguageStandard::Cxx11),
            "14" | "1y" => Ok(LanguageStandard::Cxx14),
            "17" | "1z" => Ok(LanguageStandard::Cxx17),
            "20" | "2a" => Ok(LanguageStandard::Cxx20),
            "23" | "2b" => Ok(LanguageStandard::Cxx23),
            _ => Err(EnvironmentError::UnknownStandard(s.to_string())),
        }
    }
}

// =============================================================================
// VERSION DATA
// =============================================================================

/// Normalized version components.
///
/// Each component is present only if the environment exposes the datum for
/// the resolved identity. An absent component is not the same as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct VersionComponents {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub major: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub minor: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub patch: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tweak: Option<u64>,
}

impl VersionComponents {
    /// No component reported.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            major: None,
            minor: None,
            patch: None,
            tweak: None,
        }
    }

    /// Major/minor/patch triplet, all present.
    #[must_use]
    pub const fn triplet(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major: Some(major),
            minor: Some(minor),
            patch: Some(patch),
            tweak: None,
        }
    }

    /// Replace the tweak component.
    #[must_use]
    pub const fn with_tweak(mut self, tweak: Option<u64>) -> Self {
        self.tweak = tweak;
        self
    }

    /// True if no component is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.major.is_none() && self.minor.is_none() && self.patch.is_none() && self.tweak.is_none()
    }

    /// Compare against a floor on (major, minor); absent components read as 0.
    #[must_use]
    pub fn at_least(&self, floor: VersionFloor) -> bool {
        let have = (self.major.unwrap_or(0), self.minor.unwrap_or(0));
        have >= (floor.major, floor.minor)
    }
}

impl fmt::Display for VersionComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [self.major, self.minor, self.patch, self.tweak];
        let present: Vec<String> = parts
            .iter()
            .map_while(|part| part.map(|v| v.to_string()))
            .collect();

        if present.is_empty() {
            f.write_str("unknown")
        } else {
            f.write_str(&present.join("."))
        }
    }
}

/// Minimum (major, minor) version for a rule or an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionFloor {
    pub major: u64,
    pub minor: u64,
}

impl VersionFloor {
    #[must_use]
    pub const fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for VersionFloor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A secondary identity a toolchain reports for CLI/ABI compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulatedIdentity {
    pub identity: CompilerId,
    pub version: VersionComponents,
}

impl SimulatedIdentity {
    #[must_use]
    pub const fn new(identity: CompilerId, version: VersionComponents) -> Self {
        Self { identity, version }
    }
}

impl fmt::Display for SimulatedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identity, self.version)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Terminal resolution failures.
///
/// These are the only two ways a resolution can fail. Neither is retryable:
/// the environment does not change within a build run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapsError {
    /// No identity matched, or the matched identity has no capability table.
    #[error("{}", describe_unsupported(.identity))]
    UnsupportedToolchain { identity: Option<CompilerId> },

    /// The identity matched but reports a version below its floor.
    #[error("Unsupported {identity} version {version} (minimum supported is {floor})")]
    UnsupportedVersion {
        identity: CompilerId,
        version: VersionComponents,
        floor: VersionFloor,
    },
}

fn describe_unsupported(identity: &Option<CompilerId>) -> String {
    match identity {
        Some(id) => format!("Unsupported toolchain: {} has no capability table", id),
        None => "Unsupported toolchain: no compiler identity matched".to_string(),
    }
}

/// Errors in external input: macro dumps, names, profiles, header prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    /// A line of a predefined-macro dump could not be understood.
    #[error("Invalid definition at line {line}: {reason}")]
    InvalidDefinition { line: usize, reason: String },

    /// An input limit from `primitives` was exceeded.
    #[error("{what} exceeds limit of {limit}")]
    LimitExceeded { what: &'static str, limit: usize },

    /// The language standard string was not recognized.
    #[error("Unknown language standard: {0}")]
    UnknownStandard(String),

    /// The compiler identity name was not recognized.
    #[error("Unknown compiler identity: {0}")]
    UnknownIdentity(String),

    /// The feature name was not recognized.
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// A TOML profile could not be parsed.
    #[error("Profile error: {0}")]
    Profile(String),

    /// A generated-header prefix is not a usable C identifier.
    #[error("Invalid header prefix: '{0}'")]
    InvalidPrefix(String),
}

// =============================================================================
// TESTS
// =============================================================================
