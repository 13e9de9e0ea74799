//! # Capability Rules
//!
//! Static per-identity rule tables. A rule grants its feature when
//!
//! ```text
//! (version >= floor AND gate) OR shortcut
//! ```
//!
//! Gates test the language mode or a capability probe; shortcuts are
//! alternative conditions (SD-6 feature-test macros) that grant the feature
//! regardless of version. Only GNU, Clang, AppleClang, MSVC and Intel carry a
//! table.

use crate::primitives::{CXX11_CPLUSPLUS, CXX14_DRAFT_CPLUSPLUS};
use crate::{CompilerId, Environment, Feature, VersionComponents, VersionFloor};
use serde::Serialize;
use std::fmt;

// =============================================================================
// GATES
// =============================================================================

/// Additional condition a rule requires beyond its version floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gate {
    /// No extra condition.
    Always,
    /// `__cplusplus >= 201103L` or a non-zero `__GXX_EXPERIMENTAL_CXX0X__`.
    Cxx11OrExperimental,
    /// `__cplusplus >= 201103L`.
    Cxx11,
    /// `__cplusplus > 201103L`.
    AfterCxx11,
    /// `__has_feature(name)`.
    Probe(&'static str),
    /// Intel's C++11 mode: the standard level or either mode marker.
    IntelCxx11,
    /// Intel's `[[deprecated]]` support, which depends on the exact update.
    IntelDeprecated,
}

impl Gate {
    /// Evaluate the gate against an environment.
    #[must_use]
    pub fn holds(&self, env: &Environment) -> bool {
        let cplusplus = env.cplusplus();
        match self {
            Gate::Always => true,
            Gate::Cxx11OrExperimental => {
                cplusplus >= CXX11_CPLUSPLUS
                    || env.number_or_zero("__GXX_EXPERIMENTAL_CXX0X__") != 0
            }
            Gate::Cxx11 => cplusplus >= CXX11_CPLUSPLUS,
            Gate::AfterCxx11 => cplusplus > CXX11_CPLUSPLUS,
            Gate::Probe(name) => env.probe(name),
            Gate::IntelCxx11 => {
                cplusplus >= CXX11_CPLUSPLUS
                    || env.is_defined("__INTEL_CXX11_MODE__")
                    || env.is_defined("__GXX_EXPERIMENTAL_CXX0X__")
            }
            Gate::IntelDeprecated => {
                let cxx11_mode = env.is_defined("__INTEL_CXX11_MODE__");
                let fifteen_update_one = env.number_or_zero("__INTEL_COMPILER") == 1500
                    && env.number_or_zero("__INTEL_COMPILER_UPDATE") == 1;

                cplusplus >= CXX14_DRAFT_CPLUSPLUS
                    || (cplusplus == CXX11_CPLUSPLUS && !cxx11_mode)
                    || (fifteen_update_one
                        && env.is_defined("__GXX_EXPERIMENTAL_CXX0X__")
                        && !cxx11_mode)
                    || (cxx11_mode && env.is_defined("__cpp_aggregate_nsdmi"))
            }
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Always => f.write_str("-"),
            Gate::Cxx11OrExperimental => f.write_str("c++11|experimental"),
            Gate::Cxx11 => f.write_str("c++11"),
            Gate::AfterCxx11 => f.write_str(">c++11"),
            Gate::Probe(name) => write!(f, "has_feature({})", name),
            Gate::IntelCxx11 => f.write_str("intel-c++11"),
            Gate::IntelDeprecated => f.write_str("intel-deprecated"),
        }
    }
}

/// Condition that grants a feature independently of the version floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    /// Feature-test macro to read.
    pub symbol: &'static str,
    /// Minimum value of `symbol`.
    pub minimum: i64,
    /// Gate that must also hold.
    pub gate: Gate,
}

impl Shortcut {
    #[must_use]
    pub fn holds(&self, env: &Environment) -> bool {
        env.number_or_zero(self.symbol) >= self.minimum && self.gate.holds(env)
    }
}

// =============================================================================
// RULES AND TABLES
// =============================================================================

/// How one (identity, feature) pair is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityRule {
    pub feature: Feature,
    pub floor: VersionFloor,
    pub gate: Gate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<Shortcut>,
}

impl CapabilityRule {
    const fn gated(feature: Feature, major: u64, minor: u64, gate: Gate) -> Self {
        Self {
            feature,
            floor: VersionFloor::new(major, minor),
            gate,
            shortcut: None,
        }
    }

    const fn or(mut self, shortcut: Shortcut) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    /// Decide the feature for a decoded version and its environment.
    #[must_use]
    pub fn evaluate(&self, version: &VersionComponents, env: &Environment) -> bool {
        (version.at_least(self.floor) && self.gate.holds(env))
            || self.shortcut.is_some_and(|shortcut| shortcut.holds(env))
    }
}

/// The complete rule set of one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityTable {
    pub identity: CompilerId,
    /// Minimum supported version; resolution refuses anything older.
    pub floor: VersionFloor,
    /// One rule per feature, in [`crate::ALL_FEATURES`] order.
    pub rules: [CapabilityRule; 11],
}

impl CapabilityTable {
    /// Rule deciding `feature`.
    #[must_use]
    pub fn rule(&self, feature: Feature) -> &CapabilityRule {
        &self.rules[feature.index()]
    }
}

/// Rule table for `identity`, if it has one.
#[must_use]
pub fn table_for(identity: CompilerId) -> Option<&'static CapabilityTable> {
    TABLES.iter().find(|table| table.identity == identity)
}

/// Every identity that carries a capability table.
#[must_use]
pub fn tables() -> &'static [CapabilityTable] {
    &TABLES
}

use CapabilityRule as R;
use Feature as F;

const fn msvc(feature: Feature, major: u64) -> CapabilityRule {
    R::gated(feature, major, 0, Gate::Always)
}

const fn gnu(feature: Feature, minor: u64, gate: Gate) -> CapabilityRule {
    R::gated(feature, 4, minor, gate)
}

const fn probed(feature: Feature, floor: VersionFloor, probe: &'static str) -> CapabilityRule {
    R::gated(feature, floor.major, floor.minor, Gate::Probe(probe))
}

const fn intel(feature: Feature, major: u64, minor: u64) -> CapabilityRule {
    R::gated(feature, major, minor, Gate::IntelCxx11)
}

const CLANG_FLOOR: VersionFloor = VersionFloor::new(3, 1);
const APPLE_CLANG_FLOOR: VersionFloor = VersionFloor::new(4, 0);

const fn clang_family(identity: CompilerId, floor: VersionFloor, deprecated: VersionFloor) -> CapabilityTable {
    CapabilityTable {
        identity,
        floor,
        rules: [
            probed(F::Constexpr, floor, "cxx_constexpr"),
            probed(F::DeletedFunctions, floor, "cxx_deleted_functions"),
            probed(F::Final, floor, "cxx_override_control"),
            probed(F::Noexcept, floor, "cxx_noexcept"),
            probed(F::Override, floor, "cxx_override_control"),
            probed(F::Alignas, floor, "cxx_alignas"),
            probed(F::Alignof, floor, "cxx_alignas"),
            probed(F::Nullptr, floor, "cxx_nullptr"),
            probed(F::StaticAssert, floor, "cxx_static_assert"),
            R::gated(F::AttributeDeprecated, deprecated.major, deprecated.minor, Gate::AfterCxx11),
            probed(F::ThreadLocal, floor, "cxx_thread_local"),
        ],
    }
}

const TABLES: [CapabilityTable; 5] = [
    CapabilityTable {
        identity: CompilerId::Msvc,
        floor: VersionFloor::new(16, 0),
        rules: [
            msvc(F::Constexpr, 19),
            msvc(F::DeletedFunctions, 19),
            msvc(F::Final, 17),
            msvc(F::Noexcept, 19),
            msvc(F::Override, 16),
            msvc(F::Alignas, 19),
            msvc(F::Alignof, 19),
            msvc(F::Nullptr, 16),
            msvc(F::StaticAssert, 16),
            msvc(F::AttributeDeprecated, 19),
            msvc(F::ThreadLocal, 19),
        ],
    },
    CapabilityTable {
        identity: CompilerId::Gnu,
        floor: VersionFloor::new(4, 4),
        rules: [
            gnu(F::Constexpr, 6, Gate::Cxx11OrExperimental),
            gnu(F::DeletedFunctions, 4, Gate::Cxx11OrExperimental),
            gnu(F::Final, 7, Gate::Cxx11),
            gnu(F::Noexcept, 6, Gate::Cxx11OrExperimental),
            // Contextual keyword, accepted outside C++11 mode.
            gnu(F::Override, 7, Gate::Always),
            gnu(F::Alignas, 8, Gate::Cxx11),
            gnu(F::Alignof, 8, Gate::Cxx11),
            gnu(F::Nullptr, 6, Gate::Cxx11OrExperimental),
            gnu(F::StaticAssert, 4, Gate::Cxx11OrExperimental),
            gnu(F::AttributeDeprecated, 9, Gate::AfterCxx11),
            gnu(F::ThreadLocal, 8, Gate::Cxx11),
        ],
    },
    clang_family(CompilerId::Clang, CLANG_FLOOR, VersionFloor::new(3, 4)),
    clang_family(CompilerId::AppleClang, APPLE_CLANG_FLOOR, VersionFloor::new(5, 1)),
    CapabilityTable {
        identity: CompilerId::Intel,
        floor: VersionFloor::new(12, 1),
        rules: [
            intel(F::Constexpr, 14, 0).or(Shortcut {
                symbol: "__cpp_constexpr",
                minimum: 200_704,
                gate: Gate::Always,
            }),
            intel(F::DeletedFunctions, 12, 1),
            intel(F::Final, 14, 0),
            intel(F::Noexcept, 14, 0),
            intel(F::Override, 14, 0),
            intel(F::Alignas, 15, 0),
            intel(F::Alignof, 15, 0),
            intel(F::Nullptr, 12, 1),
            intel(F::StaticAssert, 12, 1).or(Shortcut {
                symbol: "__cpp_static_assert",
                minimum: 200_410,
                gate: Gate::IntelCxx11,
            }),
            R::gated(F::AttributeDeprecated, 15, 0, Gate::IntelDeprecated),
            intel(F::ThreadLocal, 15, 0),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ALL_COMPILERS, ALL_FEATURES, LanguageStandard};

    #[test]
    fn rules_are_in_feature_order() {
        for table in tables() {
            for (rule, feature) in table.rules.iter().zip(ALL_FEATURES) {
                assert_eq!(rule.feature, feature, "{}", table.identity);
            }
        }
    }

    #[test]
    fn only_five_identities_have_tables() {
        let with_tables: Vec<CompilerId> = ALL_COMPILERS
            .into_iter()
            .filter(|id| table_for(*id).is_some())
            .collect();
        assert_eq!(
            with_tables,
            vec![
                CompilerId::Intel,
                CompilerId::AppleClang,
                CompilerId::Clang,
                CompilerId::Gnu,
                CompilerId::Msvc,
            ]
        );
    }

    #[test]
    fn no_rule_sits_below_its_identity_floor() {
        for table in tables() {
            for rule in &table.rules {
                assert!(rule.floor >= table.floor, "{} {}", table.identity, rule.feature);
            }
        }
    }

    #[test]
    fn gnu_experimental_marker_must_be_nonzero() {
        let off = Environment::new().define("__GXX_EXPERIMENTAL_CXX0X__", 0);
        let on = Environment::new().define_flag("__GXX_EXPERIMENTAL_CXX0X__");
        assert!(!Gate::Cxx11OrExperimental.holds(&off));
        assert!(Gate::Cxx11OrExperimental.holds(&on));
    }

    #[test]
    fn intel_marker_only_needs_definition() {
        let env = Environment::new().define("__GXX_EXPERIMENTAL_CXX0X__", 0);
        assert!(Gate::IntelCxx11.holds(&env));
    }

    #[test]
    fn after_cxx11_is_strict() {
        let cxx11 = Environment::new().with_standard(LanguageStandard::Cxx11);
        let cxx14 = Environment::new().with_standard(LanguageStandard::Cxx14);
        assert!(!Gate::AfterCxx11.holds(&cxx11));
        assert!(Gate::AfterCxx11.holds(&cxx14));
    }

    #[test]
    fn intel_constexpr_shortcut_ignores_version() {
        let rule = table_for(CompilerId::Intel).expect("table").rule(F::Constexpr);
        let env = Environment::new().define("__cpp_constexpr", 200_704);
        assert!(rule.evaluate(&VersionComponents::triplet(12, 1, 0), &env));
        assert!(!rule.evaluate(&VersionComponents::triplet(12, 1, 0), &Environment::new()));
    }

    #[test]
    fn intel_deprecated_in_cxx11_mode_marker_needs_nsdmi() {
        let marker = Environment::new()
            .with_standard(LanguageStandard::Cxx11)
            .define_flag("__INTEL_CXX11_MODE__");
        assert!(!Gate::IntelDeprecated.holds(&marker));
        assert!(Gate::IntelDeprecated.holds(&marker.define("__cpp_aggregate_nsdmi", 201_304)));
    }

    #[test]
    fn gate_display() {
        assert_eq!(Gate::Probe("cxx_alignas").to_string(), "has_feature(cxx_alignas)");
        assert_eq!(Gate::Always.to_string(), "-");
    }
}
