//! # Innate Primitives
//!
//! Hardcoded constants for the resolver.
//!
//! The identity and feature sets are closed; these values are compiled into
//! the binary and are immutable at runtime.

/// `__cplusplus` value of the 2011 standard.
///
/// Rules gated on "C++11 mode" compare `__cplusplus >= CXX11_CPLUSPLUS`.
pub const CXX11_CPLUSPLUS: i64 = 201_103;

/// Lowest `__cplusplus` value treated as the 2014 standard by Intel's
/// deprecated-attribute rule (draft compilers reported 2013xx values).
pub const CXX14_DRAFT_CPLUSPLUS: i64 = 201_300;

/// The macro every C++ compiler defines with its language level.
pub const CPLUSPLUS_MACRO: &str = "__cplusplus";

/// Value recorded for object-like macros defined without a body.
pub const FLAG_VALUE: &str = "1";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of macro definitions in one environment.
///
/// Real compilers predefine a few hundred; this only guards against
/// runaway input.
pub const MAX_MACRO_COUNT: usize = 65_536;

/// Maximum length for a macro name.
pub const MAX_MACRO_NAME_LENGTH: usize = 256;

/// Maximum length for a macro value.
pub const MAX_MACRO_VALUE_LENGTH: usize = 4096;

/// Maximum number of capability probes in one environment.
pub const MAX_PROBE_COUNT: usize = 1024;

/// Maximum length for a generated header prefix.
pub const MAX_PREFIX_LENGTH: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cxx11_threshold_is_201103() {
        assert_eq!(CXX11_CPLUSPLUS, 201_103);
        assert!(CXX14_DRAFT_CPLUSPLUS > CXX11_CPLUSPLUS);
    }

    #[test]
    fn limits_are_ordered() {
        assert!(MAX_MACRO_NAME_LENGTH < MAX_MACRO_VALUE_LENGTH);
        assert!(MAX_PROBE_COUNT < MAX_MACRO_COUNT);
    }
}
