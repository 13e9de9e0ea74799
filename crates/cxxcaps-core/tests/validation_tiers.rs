//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the resolver is INVALID.
//!
//! ## Tiers
//! - T0: Classification Precedence
//! - T1: Version Floors
//! - T2: Capability Rules
//! - T3: Simulation and Ingestion

use cxxcaps_core::{
    CapsError, CompilerId, Environment, Feature, LanguageStandard, VersionComponents,
    VersionFloor, classify, detect, identify, render_header,
};

fn gnu(major: u64, minor: u64) -> Environment {
    Environment::new()
        .define("__GNUC__", major)
        .define("__GNUC_MINOR__", minor)
        .define("__GNUC_PATCHLEVEL__", 0)
}

fn clang(major: u64, minor: u64) -> Environment {
    Environment::new()
        .define_flag("__clang__")
        .define("__clang_major__", major)
        .define("__clang_minor__", minor)
        .define("__clang_patchlevel__", 0)
}

fn intel(version: u64) -> Environment {
    Environment::new().define("__INTEL_COMPILER", version)
}

// =============================================================================
// TIER T0: CLASSIFICATION PRECEDENCE
// =============================================================================

mod t0_classification {
    use super::*;

    /// T0.1: Nothing recognizable fails with UnsupportedToolchain.
    #[test]
    fn no_identifying_symbol() {
        let env = Environment::new()
            .define("__x86_64__", 1)
            .with_standard(LanguageStandard::Cxx17);
        assert_eq!(
            detect(&env),
            Err(CapsError::UnsupportedToolchain { identity: None })
        );
        assert!(identify(&env).is_err());
    }

    /// T0.2: A vendor build marker selects the vendor-flavored Clang.
    #[test]
    fn vendor_clang_beats_generic_clang() {
        let env = clang(12, 0).define("__apple_build_version__", 12_000_032);
        assert_eq!(classify(&env), Ok(CompilerId::AppleClang));
        assert_eq!(classify(&clang(12, 0)), Ok(CompilerId::Clang));
    }

    /// T0.3: Clang defines the GNU symbols too and still classifies as Clang.
    #[test]
    fn clang_beats_gnu() {
        let env = clang(10, 0).define("__GNUC__", 4).define("__GNUC_MINOR__", 2);
        assert_eq!(classify(&env), Ok(CompilerId::Clang));
    }

    /// T0.4: Intel beats both GNU and MSVC.
    #[test]
    fn intel_beats_emulated_toolchains() {
        let env = intel(1900).define("__GNUC__", 9).define("_MSC_VER", 1920);
        assert_eq!(classify(&env), Ok(CompilerId::Intel));
    }

    /// T0.5: clang-cl reports _MSC_VER and classifies as Clang.
    #[test]
    fn clang_beats_msvc() {
        let env = clang(11, 0).define("_MSC_VER", 1928);
        assert_eq!(classify(&env), Ok(CompilerId::Clang));
    }

    /// T0.6: Recognized identities without tables still identify.
    #[test]
    fn recognized_without_table() {
        let env = Environment::new()
            .define_flag("__PGI")
            .define("__PGIC__", 19)
            .define("__PGIC_MINOR__", 10);
        let id = identify(&env).expect("identify");
        assert_eq!(id.identity, CompilerId::Pgi);
        assert_eq!(id.version.major, Some(19));
        assert_eq!(id.version.patch, None);
        assert_eq!(
            detect(&env),
            Err(CapsError::UnsupportedToolchain {
                identity: Some(CompilerId::Pgi)
            })
        );
    }
}

// =============================================================================
// TIER T1: VERSION FLOORS
// =============================================================================

mod t1_version_floors {
    use super::*;

    /// T1.1: GNU older than 4.4 is refused with no feature table.
    #[test]
    fn gnu_below_floor() {
        let err = detect(&gnu(4, 3)).expect_err("below floor");
        assert!(matches!(
            err,
            CapsError::UnsupportedVersion {
                identity: CompilerId::Gnu,
                floor: VersionFloor { major: 4, minor: 4 },
                ..
            }
        ));
    }

    /// T1.2: Each floor accepts exactly its own version.
    #[test]
    fn floors_are_inclusive() {
        assert!(detect(&gnu(4, 4)).is_ok());
        assert!(detect(&clang(3, 1)).is_ok());
        assert!(detect(&clang(3, 0)).is_err());
        assert!(detect(&intel(1210)).is_ok());
        assert!(detect(&intel(1200)).is_err());
        assert!(detect(&Environment::new().define("_MSC_VER", 1600)).is_ok());
        assert!(detect(&Environment::new().define("_MSC_VER", 1500)).is_err());
    }

    /// T1.3: AppleClang has its own, higher floor.
    #[test]
    fn apple_clang_floor() {
        let old = clang(3, 2).define("__apple_build_version__", 1);
        assert!(matches!(
            detect(&old),
            Err(CapsError::UnsupportedVersion {
                identity: CompilerId::AppleClang,
                ..
            })
        ));
    }

    /// T1.4: Intel identified only via __ICC has no version and is refused.
    #[test]
    fn intel_without_version_is_refused() {
        let env = Environment::new().define_flag("__ICC");
        assert!(matches!(
            detect(&env),
            Err(CapsError::UnsupportedVersion {
                identity: CompilerId::Intel,
                version: VersionComponents { major: None, .. },
                ..
            })
        ));
    }
}

// =============================================================================
// TIER T2: CAPABILITY RULES
// =============================================================================

mod t2_capability_rules {
    use super::*;

    /// T2.1: GNU 4.9 in pre-11 mode: no constexpr, override by version alone.
    #[test]
    fn gnu_49_pre_cxx11() {
        let env = gnu(4, 9).with_standard(LanguageStandard::Cxx98);
        let resolution = detect(&env).expect("resolve");
        assert_eq!(resolution.identity, CompilerId::Gnu);
        assert!(!resolution.supports(Feature::Constexpr));
        assert!(resolution.supports(Feature::Override));
    }

    /// T2.2: GNU 7.0: deprecated attribute needs a mode after C++11.
    #[test]
    fn gnu_70_deprecated_attribute_by_mode() {
        let cxx11 = detect(&gnu(7, 0).with_standard(LanguageStandard::Cxx11)).expect("resolve");
        assert!(cxx11.supports(Feature::Constexpr));
        assert!(!cxx11.supports(Feature::AttributeDeprecated));

        let cxx14 = detect(&gnu(7, 0).with_standard(LanguageStandard::Cxx14)).expect("resolve");
        assert!(cxx14.supports(Feature::AttributeDeprecated));
    }

    /// T2.3: GNU experimental C++0x mode unlocks the early features.
    #[test]
    fn gnu_experimental_mode() {
        let env = gnu(4, 6)
            .with_standard(LanguageStandard::Cxx98)
            .define_flag("__GXX_EXPERIMENTAL_CXX0X__");
        let resolution = detect(&env).expect("resolve");
        assert!(resolution.supports(Feature::Constexpr));
        assert!(resolution.supports(Feature::Nullptr));
        assert!(!resolution.supports(Feature::Final));
    }

    /// T2.4: Clang features follow the probes, not only the version.
    #[test]
    fn clang_follows_probes() {
        let env = clang(9, 0)
            .with_standard(LanguageStandard::Cxx17)
            .with_probe("cxx_override_control");
        let resolution = detect(&env).expect("resolve");
        assert!(resolution.supports(Feature::Final));
        assert!(resolution.supports(Feature::Override));
        assert!(!resolution.supports(Feature::Constexpr));
        assert!(resolution.supports(Feature::AttributeDeprecated));
    }

    /// T2.5: Intel 15.0 update 1 in GNU experimental mode gets [[deprecated]].
    #[test]
    fn intel_15_update_1_deprecated() {
        let base = intel(1500)
            .with_standard(LanguageStandard::Cxx98)
            .define_flag("__GXX_EXPERIMENTAL_CXX0X__");

        let update_0 = detect(&base).expect("resolve");
        assert!(!update_0.supports(Feature::AttributeDeprecated));

        let update_1 = detect(&base.define("__INTEL_COMPILER_UPDATE", 1)).expect("resolve");
        assert!(update_1.supports(Feature::AttributeDeprecated));
    }

    /// T2.6: Intel feature-test macro shortcut grants constexpr below 14.0.
    #[test]
    fn intel_constexpr_shortcut() {
        let env = intel(1300).define("__cpp_constexpr", 200_704);
        assert!(detect(&env).expect("resolve").supports(Feature::Constexpr));
        assert!(!detect(&intel(1300)).expect("resolve").supports(Feature::Constexpr));
    }

    /// T2.7: MSVC feature set grows with each release.
    #[test]
    fn msvc_releases() {
        let vs2012 = detect(&Environment::new().define("_MSC_VER", 1700)).expect("resolve");
        assert!(vs2012.supports(Feature::Final));
        assert!(!vs2012.supports(Feature::Noexcept));

        let vs2015 = detect(&Environment::new().define("_MSC_VER", 1900)).expect("resolve");
        assert!(vs2015.features.iter().all(|(_, on)| on));
    }
}

// =============================================================================
// TIER T3: SIMULATION AND INGESTION
// =============================================================================

mod t3_simulation_and_ingestion {
    use super::*;

    /// T3.1: Intel with GNU symbols reports a GNU simulated identity.
    #[test]
    fn intel_simulating_gnu() {
        let env = intel(1600)
            .define("__INTEL_COMPILER_UPDATE", 3)
            .define("__GNUC__", 5)
            .define("__GNUC_MINOR__", 4)
            .define("__GNUC_PATCHLEVEL__", 0)
            .with_standard(LanguageStandard::Cxx11);
        let resolution = detect(&env).expect("resolve");

        assert_eq!(resolution.identity, CompilerId::Intel);
        assert_eq!(resolution.version, VersionComponents::triplet(16, 0, 3));

        let simulated = resolution.simulated.expect("simulated");
        assert_eq!(simulated.identity, CompilerId::Gnu);
        assert_eq!(simulated.version, VersionComponents::triplet(5, 4, 0));
    }

    /// T3.2: A real predefined-macro dump resolves end to end.
    #[test]
    fn gcc_dump_end_to_end() {
        let dump = "\
#define __STDC__ 1
#define __cplusplus 201703L
#define __GNUC__ 10
#define __GNUC_MINOR__ 2
#define __GNUC_PATCHLEVEL__ 1
#define __GNUG__ 10
#define __VERSION__ \"10.2.1 20210110\"
#define __GXX_EXPERIMENTAL_CXX0X__ 1
#define __has_include(STR) __has_include__(STR)
";
        let env = Environment::from_predefined_macros(dump).expect("parse");
        let resolution = detect(&env).expect("resolve");
        assert_eq!(resolution.identity, CompilerId::Gnu);
        assert_eq!(resolution.version, VersionComponents::triplet(10, 2, 1));
        assert_eq!(resolution.features.supported().count(), 11);

        let header = render_header(&resolution, "APP").expect("render");
        assert!(header.contains("#define APP_COMPILER_VERSION_PATCH 1\n"));
        assert!(header.contains("#define APP_NULLPTR nullptr\n"));
    }
}
