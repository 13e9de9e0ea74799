//! # Identity Classifier
//!
//! Selects exactly one [`CompilerId`] from an [`Environment`].
//!
//! Signatures are evaluated in a fixed priority order and the first match
//! wins. Several toolchains define the symbols of the ones they imitate
//! (Intel defines `__GNUC__`, AppleClang defines `__clang__`), so the order
//! of [`signatures`] is part of the contract and must not be rearranged.

use crate::{CapsError, CompilerId, Environment};
use serde::Serialize;

/// One row of the classification table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Signature {
    /// Identity selected when the predicate holds.
    pub identity: CompilerId,
    /// Human-readable form of the predicate.
    pub predicate: &'static str,
    #[serde(skip)]
    test: fn(&Environment) -> bool,
}

impl Signature {
    /// Evaluate the predicate against an environment.
    #[must_use]
    pub fn matches(&self, env: &Environment) -> bool {
        (self.test)(env)
    }
}

// =============================================================================
// CLASSIFICATION TABLE
// =============================================================================

const SIGNATURES: [Signature; 29] = [
    Signature {
        identity: CompilerId::Comeau,
        predicate: "defined(__COMO__)",
        test: |env| env.is_defined("__COMO__"),
    },
    Signature {
        identity: CompilerId::Intel,
        predicate: "defined(__INTEL_COMPILER) || defined(__ICC)",
        test: |env| env.is_defined("__INTEL_COMPILER") || env.is_defined("__ICC"),
    },
    Signature {
        identity: CompilerId::PathScale,
        predicate: "defined(__PATHCC__)",
        test: |env| env.is_defined("__PATHCC__"),
    },
    Signature {
        identity: CompilerId::Embarcadero,
        predicate: "defined(__BORLANDC__) && defined(__CODEGEARC_VERSION__)",
        test: |env| env.is_defined("__BORLANDC__") && env.is_defined("__CODEGEARC_VERSION__"),
    },
    Signature {
        identity: CompilerId::Borland,
        predicate: "defined(__BORLANDC__)",
        test: |env| env.is_defined("__BORLANDC__"),
    },
    Signature {
        identity: CompilerId::Watcom,
        predicate: "defined(__WATCOMC__) && __WATCOMC__ < 1200",
        test: |env| env.is_defined("__WATCOMC__") && env.number_or_zero("__WATCOMC__") < 1200,
    },
    Signature {
        identity: CompilerId::OpenWatcom,
        predicate: "defined(__WATCOMC__)",
        test: |env| env.is_defined("__WATCOMC__"),
    },
    Signature {
        identity: CompilerId::SunPro,
        predicate: "defined(__SUNPRO_CC)",
        test: |env| env.is_defined("__SUNPRO_CC"),
    },
    Signature {
        identity: CompilerId::Hp,
        predicate: "defined(__HP_aCC)",
        test: |env| env.is_defined("__HP_aCC"),
    },
    Signature {
        identity: CompilerId::Compaq,
        predicate: "defined(__DECCXX)",
        test: |env| env.is_defined("__DECCXX"),
    },
    Signature {
        identity: CompilerId::ZOs,
        predicate: "defined(__IBMCPP__) && defined(__COMPILER_VER__)",
        test: |env| env.is_defined("__IBMCPP__") && env.is_defined("__COMPILER_VER__"),
    },
    Signature {
        identity: CompilerId::XlClang,
        predicate: "defined(__ibmxl__) && defined(__clang__)",
        test: |env| env.is_defined("__ibmxl__") && env.is_defined("__clang__"),
    },
    Signature {
        identity: CompilerId::Xl,
        predicate: "defined(__IBMCPP__) && !defined(__COMPILER_VER__) && __IBMCPP__ >= 800",
        test: |env| {
            env.is_defined("__IBMCPP__")
                && !env.is_defined("__COMPILER_VER__")
                && env.number_or_zero("__IBMCPP__") >= 800
        },
    },
    Signature {
        identity: CompilerId::VisualAge,
        predicate: "defined(__IBMCPP__) && !defined(__COMPILER_VER__) && __IBMCPP__ < 800",
        test: |env| {
            env.is_defined("__IBMCPP__")
                && !env.is_defined("__COMPILER_VER__")
                && env.number_or_zero("__IBMCPP__") < 800
        },
    },
    Signature {
        identity: CompilerId::Pgi,
        predicate: "defined(__PGI)",
        test: |env| env.is_defined("__PGI"),
    },
    Signature {
        identity: CompilerId::Cray,
        predicate: "defined(_CRAYC)",
        test: |env| env.is_defined("_CRAYC"),
    },
    Signature {
        identity: CompilerId::Ti,
        predicate: "defined(__TI_COMPILER_VERSION__)",
        test: |env| env.is_defined("__TI_COMPILER_VERSION__"),
    },
    Signature {
        identity: CompilerId::Fujitsu,
        predicate: "defined(__FUJITSU) || defined(__FCC_VERSION) || defined(__fcc_version)",
        test: |env| {
            env.is_defined("__FUJITSU")
                || env.is_defined("__FCC_VERSION")
                || env.is_defined("__fcc_version")
        },
    },
    Signature {
        identity: CompilerId::Ghs,
        predicate: "defined(__ghs__)",
        test: |env| env.is_defined("__ghs__"),
    },
    Signature {
        identity: CompilerId::Sco,
        predicate: "defined(__SCO_VERSION__)",
        test: |env| env.is_defined("__SCO_VERSION__"),
    },
    Signature {
        identity: CompilerId::Armcc,
        predicate: "defined(__ARMCC_VERSION) && !defined(__clang__)",
        test: |env| env.is_defined("__ARMCC_VERSION") && !env.is_defined("__clang__"),
    },
    Signature {
        identity: CompilerId::AppleClang,
        predicate: "defined(__clang__) && defined(__apple_build_version__)",
        test: |env| env.is_defined("__clang__") && env.is_defined("__apple_build_version__"),
    },
    Signature {
        identity: CompilerId::ArmClang,
        predicate: "defined(__clang__) && defined(__ARMCOMPILER_VERSION)",
        test: |env| env.is_defined("__clang__") && env.is_defined("__ARMCOMPILER_VERSION"),
    },
    Signature {
        identity: CompilerId::Clang,
        predicate: "defined(__clang__)",
        test: |env| env.is_defined("__clang__"),
    },
    Signature {
        identity: CompilerId::Gnu,
        predicate: "defined(__GNUC__) || defined(__GNUG__)",
        test: |env| env.is_defined("__GNUC__") || env.is_defined("__GNUG__"),
    },
    Signature {
        identity: CompilerId::Msvc,
        predicate: "defined(_MSC_VER)",
        test: |env| env.is_defined("_MSC_VER"),
    },
    Signature {
        identity: CompilerId::Adsp,
        predicate: "defined(__VISUALDSPVERSION__) || defined(__ADSPBLACKFIN__) || defined(__ADSPTS__) || defined(__ADSP21000__)",
        test: |env| {
            ["__VISUALDSPVERSION__", "__ADSPBLACKFIN__", "__ADSPTS__", "__ADSP21000__"]
                .iter()
                .any(|name| env.is_defined(name))
        },
    },
    Signature {
        identity: CompilerId::Iar,
        predicate: "defined(__IAR_SYSTEMS_ICC__) || defined(__IAR_SYSTEMS_ICC)",
        test: |env| env.is_defined("__IAR_SYSTEMS_ICC__") || env.is_defined("__IAR_SYSTEMS_ICC"),
    },
    Signature {
        identity: CompilerId::MipsPro,
        predicate: "defined(__sgi) && (defined(_SGI_COMPILER_VERSION) || defined(_COMPILER_VERSION))",
        test: |env| {
            env.is_defined("__sgi")
                && (env.is_defined("_SGI_COMPILER_VERSION") || env.is_defined("_COMPILER_VERSION"))
        },
    },
];

/// The classification table, highest priority first.
#[must_use]
pub fn signatures() -> &'static [Signature] {
    &SIGNATURES
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Select the identity of the first signature that matches.
///
/// # Errors
/// `CapsError::UnsupportedToolchain { identity: None }` if nothing matches.
pub fn classify(env: &Environment) -> Result<CompilerId, CapsError> {
    SIGNATURES
        .iter()
        .find(|signature| signature.matches(env))
        .map(|signature| signature.identity)
        .ok_or(CapsError::UnsupportedToolchain { identity: None })
}

/// Every identity whose signature holds, in priority order.
///
/// Ambiguous environments list several entries; `classify` picks the first.
#[must_use]
pub fn matching_signatures(env: &Environment) -> Vec<CompilerId> {
    SIGNATURES
        .iter()
        .filter(|signature| signature.matches(env))
        .map(|signature| signature.identity)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ALL_COMPILERS;

    #[test]
    fn table_follows_declaration_order() {
        let order: Vec<CompilerId> = signatures().iter().map(|s| s.identity).collect();
        assert_eq!(order, ALL_COMPILERS.to_vec());
    }

    #[test]
    fn empty_environment_is_unsupported() {
        assert_eq!(
            classify(&Environment::new()),
            Err(CapsError::UnsupportedToolchain { identity: None })
        );
    }

    #[test]
    fn intel_wins_over_gnu() {
        let env = Environment::new()
            .define("__INTEL_COMPILER", 1600)
            .define("__GNUC__", 5);
        assert_eq!(classify(&env), Ok(CompilerId::Intel));
        assert_eq!(
            matching_signatures(&env),
            vec![CompilerId::Intel, CompilerId::Gnu]
        );
    }

    #[test]
    fn clang_variants_precede_generic_clang() {
        let apple = Environment::new()
            .define_flag("__clang__")
            .define("__apple_build_version__", 10_010_046);
        assert_eq!(classify(&apple), Ok(CompilerId::AppleClang));

        let arm = Environment::new()
            .define_flag("__clang__")
            .define("__ARMCOMPILER_VERSION", 6_100_001);
        assert_eq!(classify(&arm), Ok(CompilerId::ArmClang));

        let xl = Environment::new()
            .define_flag("__clang__")
            .define_flag("__ibmxl__");
        assert_eq!(classify(&xl), Ok(CompilerId::XlClang));
    }

    #[test]
    fn watcom_split_on_version() {
        let old = Environment::new().define("__WATCOMC__", 1100);
        let open = Environment::new().define("__WATCOMC__", 1290);
        assert_eq!(classify(&old), Ok(CompilerId::Watcom));
        assert_eq!(classify(&open), Ok(CompilerId::OpenWatcom));
    }

    #[test]
    fn ibm_split_on_version_and_platform() {
        let zos = Environment::new()
            .define("__IBMCPP__", 1300)
            .define("__COMPILER_VER__", "0x42010000");
        let xl = Environment::new().define("__IBMCPP__", 1300);
        let visual_age = Environment::new().define("__IBMCPP__", 600);
        assert_eq!(classify(&zos), Ok(CompilerId::ZOs));
        assert_eq!(classify(&xl), Ok(CompilerId::Xl));
        assert_eq!(classify(&visual_age), Ok(CompilerId::VisualAge));
    }

    #[test]
    fn armcc_requires_absent_clang() {
        let armcc = Environment::new().define("__ARMCC_VERSION", 5_060_750);
        assert_eq!(classify(&armcc), Ok(CompilerId::Armcc));

        let clang_based = armcc.define_flag("__clang__");
        assert_eq!(classify(&clang_based), Ok(CompilerId::Clang));
    }

    #[test]
    fn embarcadero_precedes_borland() {
        let env = Environment::new()
            .define("__BORLANDC__", "0x0730")
            .define("__CODEGEARC_VERSION__", "0x07030000");
        assert_eq!(classify(&env), Ok(CompilerId::Embarcadero));
        assert_eq!(
            classify(&env.undefine("__CODEGEARC_VERSION__")),
            Ok(CompilerId::Borland)
        );
    }

    #[test]
    fn gnu_via_gnug_only() {
        let env = Environment::new().define("__GNUG__", 9);
        assert_eq!(classify(&env), Ok(CompilerId::Gnu));
    }

    #[test]
    fn mipspro_needs_version_symbol() {
        let bare = Environment::new().define_flag("__sgi");
        assert!(classify(&bare).is_err());
        let env = bare.define("_COMPILER_VERSION", 741);
        assert_eq!(classify(&env), Ok(CompilerId::MipsPro));
    }

    #[test]
    fn predicate_text_is_populated() {
        assert!(signatures().iter().all(|s| s.predicate.contains("defined(")));
    }
}
