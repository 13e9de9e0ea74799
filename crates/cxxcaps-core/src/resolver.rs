//! # Capability Resolver
//!
//! Second stage of detection: (identity, environment) → [`Resolution`].
//!
//! 1. Look up the identity's rule table (`UnsupportedToolchain` if none)
//! 2. Decode the version and check it against the identity floor
//!    (`UnsupportedVersion` if below)
//! 3. Decode the simulated identity
//! 4. Evaluate every rule independently into a total [`FeatureTable`]
//!
//! There is no partial result: either every flag is decided or the call fails.

use crate::{
    ALL_FEATURES, CapsError, CompilerId, Environment, Feature, SimulatedIdentity,
    VersionComponents, identity, rules, version,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// FEATURE TABLE
// =============================================================================

/// Total mapping from every [`Feature`] to its availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "BTreeMap<Feature, bool>", try_from = "BTreeMap<Feature, bool>")]
pub struct FeatureTable {
    flags: [bool; 11],
}

impl FeatureTable {
    /// Build a table by deciding each feature.
    pub fn from_fn(mut decide: impl FnMut(Feature) -> bool) -> Self {
        let mut flags = [false; 11];
        for feature in ALL_FEATURES {
            flags[feature.index()] = decide(feature);
        }
        Self { flags }
    }

    /// Availability of `feature`.
    #[must_use]
    pub fn get(&self, feature: Feature) -> bool {
        self.flags[feature.index()]
    }

    /// All (feature, flag) pairs in feature order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, bool)> + '_ {
        ALL_FEATURES.iter().map(|feature| (*feature, self.get(*feature)))
    }

    /// Features whose flag is set.
    pub fn supported(&self) -> impl Iterator<Item = Feature> + '_ {
        self.iter().filter_map(|(feature, on)| on.then_some(feature))
    }
}

impl From<FeatureTable> for BTreeMap<Feature, bool> {
    fn from(table: FeatureTable) -> Self {
        table.iter().collect()
    }
}

impl TryFrom<BTreeMap<Feature, bool>> for FeatureTable {
    type Error = String;

    fn try_from(map: BTreeMap<Feature, bool>) -> Result<Self, Self::Error> {
        if let Some(missing) = ALL_FEATURES.iter().find(|f| !map.contains_key(*f)) {
            return Err(format!("feature table is missing {}", missing));
        }
        Ok(Self::from_fn(|feature| map.get(&feature).copied().unwrap_or(false)))
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Identity and version of a recognized toolchain, without capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub identity: CompilerId,
    pub version: VersionComponents,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub simulated: Option<SimulatedIdentity>,
}

/// The complete output of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub identity: CompilerId,
    pub version: VersionComponents,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub simulated: Option<SimulatedIdentity>,
    pub features: FeatureTable,
}

impl Resolution {
    /// Availability of `feature`.
    #[must_use]
    pub fn supports(&self, feature: Feature) -> bool {
        self.features.get(feature)
    }

    /// The identification part of this resolution.
    #[must_use]
    pub fn identification(&self) -> Identification {
        Identification {
            identity: self.identity,
            version: self.version,
            simulated: self.simulated,
        }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Resolve the capabilities of a known identity.
///
/// # Errors
/// - `UnsupportedToolchain { identity: Some(_) }` if the identity has no table
/// - `UnsupportedVersion` if the decoded version is below the identity floor
pub fn resolve(identity: CompilerId, env: &Environment) -> Result<Resolution, CapsError> {
    let table = rules::table_for(identity).ok_or(CapsError::UnsupportedToolchain {
        identity: Some(identity),
    })?;

    let version = version::decode(identity, env);
    if !version.at_least(table.floor) {
        return Err(CapsError::UnsupportedVersion {
            identity,
            version,
            floor: table.floor,
        });
    }

    let features = FeatureTable::from_fn(|feature| table.rule(feature).evaluate(&version, env));

    Ok(Resolution {
        identity,
        version,
        simulated: version::decode_simulated(identity, env),
        features,
    })
}

/// Classify the environment and decode its version, for any recognized identity.
pub fn identify(env: &Environment) -> Result<Identification, CapsError> {
    let identity = identity::classify(env)?;
    Ok(Identification {
        identity,
        version: version::decode(identity, env),
        simulated: version::decode_simulated(identity, env),
    })
}

/// Classify then resolve.
pub fn detect(env: &Environment) -> Result<Resolution, CapsError> {
    let identity = identity::classify(env)?;
    resolve(identity, env)
}
