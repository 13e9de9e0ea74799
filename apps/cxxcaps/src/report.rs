//! # Report Types
//!
//! Serializable shapes of the `--json` output of every command.

use cxxcaps_core::{
    CapabilityTable, CompilerId, Environment, Feature, FeatureTable, Gate, Identification,
    Resolution, SimulatedIdentity, VersionComponents, VersionFloor, signatures, table_for, tables,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// IDENTIFY
// =============================================================================

/// Output of `cxxcaps identify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyReport {
    pub identity: CompilerId,
    pub version: VersionComponents,
    /// Dotted form of `version` (`unknown` if nothing is reported).
    pub version_string: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub simulated: Option<SimulatedIdentity>,
    /// Every identity whose signature matched, in priority order.
    pub candidates: Vec<CompilerId>,
    /// Capability probes that answered true, in name order.
    #[serde(default)]
    pub probes: Vec<String>,
    /// Environment fingerprint, 16 hex digits.
    pub fingerprint: String,
    /// BLAKE3 digest of the canonical environment encoding.
    pub digest: String,
}

impl IdentifyReport {
    #[must_use]
    pub fn new(
        identification: &Identification,
        candidates: Vec<CompilerId>,
        env: &Environment,
    ) -> Self {
        Self {
            identity: identification.identity,
            version: identification.version,
            version_string: identification.version.to_string(),
            simulated: identification.simulated,
            candidates,
            probes: env.probes().map(str::to_string).collect(),
            fingerprint: format!("{:016x}", env.fingerprint()),
            digest: env.blake3_digest(),
        }
    }
}

// =============================================================================
// RESOLVE
// =============================================================================

/// Output of `cxxcaps resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveReport {
    pub identity: CompilerId,
    pub version: VersionComponents,
    pub version_string: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub simulated: Option<SimulatedIdentity>,
    pub features: FeatureTable,
    pub supported_count: usize,
}

impl From<&Resolution> for ResolveReport {
    fn from(resolution: &Resolution) -> Self {
        Self {
            identity: resolution.identity,
            version: resolution.version,
            version_string: resolution.version.to_string(),
            simulated: resolution.simulated,
            features: resolution.features,
            supported_count: resolution.features.supported().count(),
        }
    }
}

// =============================================================================
// HEADER
// =============================================================================

/// Output of `cxxcaps header --output FILE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderReport {
    pub identity: CompilerId,
    pub prefix: String,
    pub path: String,
    pub bytes: usize,
}

// =============================================================================
// TABLE
// =============================================================================

/// One classification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRow {
    pub priority: usize,
    pub identity: CompilerId,
    pub predicate: String,
    pub has_capabilities: bool,
}

/// One capability rule, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRow {
    pub feature: Feature,
    pub floor: VersionFloor,
    pub gate: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub shortcut: Option<String>,
}

/// Rules of one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRows {
    pub identity: CompilerId,
    pub floor: VersionFloor,
    pub rules: Vec<RuleRow>,
}

impl From<&CapabilityTable> for CapabilityRows {
    fn from(table: &CapabilityTable) -> Self {
        Self {
            identity: table.identity,
            floor: table.floor,
            rules: table
                .rules
                .iter()
                .map(|rule| RuleRow {
                    feature: rule.feature,
                    floor: rule.floor,
                    gate: rule.gate.to_string(),
                    shortcut: rule.shortcut.map(|s| match s.gate {
                        Gate::Always => format!("{} >= {}", s.symbol, s.minimum),
                        gate => format!("{} >= {} && {}", s.symbol, s.minimum, gate),
                    }),
                })
                .collect(),
        }
    }
}

/// Output of `cxxcaps table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    pub signatures: Vec<SignatureRow>,
    pub capabilities: Vec<CapabilityRows>,
}

impl TableReport {
    /// Snapshot of the built-in classification and capability tables.
    #[must_use]
    pub fn built_in() -> Self {
        let signatures = signatures()
            .iter()
            .enumerate()
            .map(|(index, signature)| SignatureRow {
                priority: index + 1,
                identity: signature.identity,
                predicate: signature.predicate.to_string(),
                has_capabilities: table_for(signature.identity).is_some(),
            })
            .collect();

        let capabilities = tables()
            .iter()
            .map(CapabilityRows::from)
            .collect();

        Self {
            signatures,
            capabilities,
        }
    }
}
