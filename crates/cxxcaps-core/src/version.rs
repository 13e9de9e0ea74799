//! # Version Decoding
//!
//! Turns the identity-specific version symbols into [`VersionComponents`].
//!
//! Each vendor packs its version differently (`_MSC_VER = VVRR`,
//! `__INTEL_COMPILER = VRP`, SunPro in BCD, ...). A component is present only
//! when the symbol it is derived from is defined and numeric.

use crate::{CompilerId, Environment, SimulatedIdentity, VersionComponents};

/// Decode the primary version of `identity` from `env`.
#[must_use]
pub fn decode(identity: CompilerId, env: &Environment) -> VersionComponents {
    let n = |name: &str| env.unsigned(name);

    match identity {
        CompilerId::Msvc => decode_msvc(env),
        CompilerId::Gnu => gnu_style(env),
        CompilerId::Clang => clang_style(env),
        CompilerId::AppleClang => clang_style(env).with_tweak(n("__apple_build_version__")),
        CompilerId::ArmClang => n("__ARMCOMPILER_VERSION")
            .map(|v| VersionComponents::triplet(v / 1_000_000, v / 10_000 % 100, v % 10_000))
            .unwrap_or_default(),
        CompilerId::Intel => {
            let Some(v) = n("__INTEL_COMPILER") else {
                return VersionComponents::none();
            };
            let patch = n("__INTEL_COMPILER_UPDATE").unwrap_or(v % 10);
            VersionComponents::triplet(v / 100, v / 10 % 10, patch)
                .with_tweak(n("__INTEL_COMPILER_BUILD_DATE"))
        }
        CompilerId::Comeau => n("__COMO_VERSION__")
            .map(|v| VersionComponents {
                major: Some(v / 100),
                minor: Some(v % 100),
                ..VersionComponents::none()
            })
            .unwrap_or_default(),
        CompilerId::PathScale => VersionComponents {
            major: n("__PATHCC__"),
            minor: n("__PATHCC_MINOR__"),
            patch: n("__PATHCC_PATCHLEVEL__"),
            tweak: None,
        },
        CompilerId::Embarcadero => n("__CODEGEARC_VERSION__")
            .map(|v| VersionComponents::triplet((v >> 24) & 0xFF, (v >> 16) & 0xFF, v & 0xFFFF))
            .unwrap_or_default(),
        CompilerId::Borland => n("__BORLANDC__")
            .map(|v| VersionComponents {
                major: Some(v >> 8),
                minor: Some(v & 0xFF),
                ..VersionComponents::none()
            })
            .unwrap_or_default(),
        CompilerId::Watcom => n("__WATCOMC__").map(watcom_style).unwrap_or_default(),
        CompilerId::OpenWatcom => n("__WATCOMC__")
            .map(|v| watcom_style(v.saturating_sub(1100)))
            .unwrap_or_default(),
        CompilerId::SunPro => n("__SUNPRO_CC").map(decode_sunpro).unwrap_or_default(),
        CompilerId::Hp => n("__HP_aCC")
            .map(|v| VersionComponents::triplet(v / 10_000, v / 100 % 100, v % 100))
            .unwrap_or_default(),
        CompilerId::Compaq => n("__DECCXX_VER")
            .map(|v| VersionComponents::triplet(v / 10_000_000, v / 100_000 % 100, v % 10_000))
            .unwrap_or_default(),
        CompilerId::ZOs | CompilerId::Xl | CompilerId::VisualAge => n("__IBMCPP__")
            .map(vrp)
            .unwrap_or_default(),
        CompilerId::XlClang => VersionComponents {
            major: n("__ibmxl_version__"),
            minor: n("__ibmxl_release__"),
            patch: n("__ibmxl_modification__"),
            tweak: n("__ibmxl_ptf_fix_level__"),
        },
        CompilerId::Pgi => VersionComponents {
            major: n("__PGIC__"),
            minor: n("__PGIC_MINOR__"),
            patch: n("__PGIC_PATCHLEVEL__"),
            tweak: None,
        },
        CompilerId::Cray => VersionComponents {
            major: n("_RELEASE_MAJOR"),
            minor: n("_RELEASE_MINOR"),
            ..VersionComponents::none()
        },
        CompilerId::Ti => n("__TI_COMPILER_VERSION__")
            .map(|v| VersionComponents::triplet(v / 1_000_000, v / 1000 % 1000, v % 1000))
            .unwrap_or_default(),
        CompilerId::Fujitsu => VersionComponents {
            major: n("__FCC_major__"),
            minor: n("__FCC_minor__"),
            patch: n("__FCC_patchlevel__"),
            tweak: None,
        },
        CompilerId::Ghs => n("__GHS_VERSION_NUMBER").map(vrp).unwrap_or_default(),
        CompilerId::Armcc => n("__ARMCC_VERSION").map(decode_armcc).unwrap_or_default(),
        CompilerId::Adsp => n("__VISUALDSPVERSION__")
            .map(|v| {
                VersionComponents::triplet(
                    hex_as_decimal(v >> 24),
                    hex_as_decimal((v >> 16) & 0xFF),
                    hex_as_decimal((v >> 8) & 0xFF),
                )
            })
            .unwrap_or_default(),
        CompilerId::Iar => n("__VER__")
            .map(|v| decode_iar(v, env))
            .unwrap_or_default(),
        CompilerId::MipsPro => n("_SGI_COMPILER_VERSION")
            .or_else(|| n("_COMPILER_VERSION"))
            .map(vrp)
            .unwrap_or_default(),
        CompilerId::Sco => VersionComponents::none(),
    }
}

/// Decode the simulated identity reported by `identity`, if any.
///
/// Only Clang, AppleClang and Intel emulate another toolchain. Intel can
/// report both MSVC and GNU symbols; the GNU reading takes precedence.
#[must_use]
pub fn decode_simulated(identity: CompilerId, env: &Environment) -> Option<SimulatedIdentity> {
    if !identity.can_simulate() {
        return None;
    }

    if identity == CompilerId::Intel {
        let gnu = gnu_style(env);
        if gnu.major.is_some() {
            return Some(SimulatedIdentity::new(CompilerId::Gnu, gnu));
        }
    }

    env.unsigned("_MSC_VER").map(|v| {
        SimulatedIdentity::new(
            CompilerId::Msvc,
            VersionComponents {
                major: Some(v / 100),
                minor: Some(v % 100),
                ..VersionComponents::none()
            },
        )
    })
}

// =============================================================================
// DECODERS
// =============================================================================

fn decode_msvc(env: &Environment) -> VersionComponents {
    let Some(v) = env.unsigned("_MSC_VER") else {
        return VersionComponents::none();
    };
    // _MSC_FULL_VER gained a fifth build digit with VS 2005.
    let modulus = if v >= 1400 { 100_000 } else { 10_000 };
    VersionComponents {
        major: Some(v / 100),
        minor: Some(v % 100),
        patch: env.unsigned("_MSC_FULL_VER").map(|full| full % modulus),
        tweak: env.unsigned("_MSC_BUILD"),
    }
}

fn gnu_style(env: &Environment) -> VersionComponents {
    VersionComponents {
        major: env.unsigned("__GNUC__").or_else(|| env.unsigned("__GNUG__")),
        minor: env.unsigned("__GNUC_MINOR__"),
        patch: env.unsigned("__GNUC_PATCHLEVEL__"),
        tweak: None,
    }
}

fn clang_style(env: &Environment) -> VersionComponents {
    VersionComponents {
        major: env.unsigned("__clang_major__"),
        minor: env.unsigned("__clang_minor__"),
        patch: env.unsigned("__clang_patchlevel__"),
        tweak: None,
    }
}

/// `VRP` packing: version*100 + release*10 + patch.
fn vrp(v: u64) -> VersionComponents {
    VersionComponents::triplet(v / 100, v / 10 % 10, v % 10)
}

fn watcom_style(v: u64) -> VersionComponents {
    let patch = v % 10;
    VersionComponents {
        major: Some(v / 100),
        minor: Some(v / 10 % 10),
        patch: (patch > 0).then_some(patch),
        tweak: None,
    }
}

fn decode_sunpro(v: u64) -> VersionComponents {
    // 0x5100 and later use three hex digits for major, minor.
    if v >= 0x5100 {
        VersionComponents::triplet(
            hex_as_decimal(v >> 12),
            hex_as_decimal((v >> 4) & 0xFF),
            hex_as_decimal(v & 0xF),
        )
    } else {
        VersionComponents::triplet(
            hex_as_decimal(v >> 8),
            hex_as_decimal((v >> 4) & 0xF),
            hex_as_decimal(v & 0xF),
        )
    }
}

fn decode_armcc(v: u64) -> VersionComponents {
    if v >= 1_000_000 {
        VersionComponents::triplet(v / 1_000_000, v / 10_000 % 100, v % 10_000)
    } else {
        VersionComponents::triplet(v / 100_000, v / 10_000 % 10, v % 10_000)
    }
}

const IAR_WIDE_VERSION_TARGETS: [&str; 5] = [
    "__ICCARM__",
    "__ICCRX__",
    "__ICCRH850__",
    "__ICCRL78__",
    "__ICCRISCV__",
];

fn decode_iar(v: u64, env: &Environment) -> VersionComponents {
    if IAR_WIDE_VERSION_TARGETS
        .iter()
        .any(|target| env.is_defined(target))
    {
        VersionComponents::triplet(v / 1_000_000, v / 1000 % 1000, v % 1000)
    } else {
        VersionComponents {
            major: Some(v / 100),
            minor: Some(v % 100),
            ..VersionComponents::none()
        }
    }
}

/// Read the hexadecimal digits of `n` as decimal digits (`0x513` → 513).
#[must_use]
pub fn hex_as_decimal(n: u64) -> u64 {
    let mut result = 0u64;
    let mut scale = 1u64;
    let mut rest = n;
    while rest > 0 {
        result = result.saturating_add((rest & 0xF).saturating_mul(scale));
        scale = scale.saturating_mul(10);
        rest >>= 4;
    }
    result
}
