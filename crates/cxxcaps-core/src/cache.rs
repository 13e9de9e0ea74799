//! # Resolution Cache
//!
//! Memoizes [`detect`](crate::detect) by the canonical encoding of the
//! environment. Keys are the full encoding, not the 64-bit fingerprint, so
//! two environments share an entry only if they are equal.
//!
//! Resolution is a pure function of the environment, so a cached entry never
//! goes stale. Terminal errors are cached too: an unsupported toolchain stays
//! unsupported for the rest of the build.

use crate::{CapsError, Environment, Resolution, detect};
use std::collections::BTreeMap;

/// Memo of resolution outcomes keyed by canonical environment bytes.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    entries: BTreeMap<Vec<u8>, Result<Resolution, CapsError>>,
    hits: u64,
    misses: u64,
}

impl ResolutionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `env`, reusing a previous outcome for an equal environment.
    pub fn detect(&mut self, env: &Environment) -> Result<Resolution, CapsError> {
        let key = env.canonical_bytes();
        if let Some(outcome) = self.entries.get(&key) {
            self.hits += 1;
            return outcome.clone();
        }

        self.misses += 1;
        let outcome = detect(env);
        self.entries.insert(key, outcome.clone());
        outcome
    }

    /// Cached outcome for `env`, without resolving.
    #[must_use]
    pub fn peek(&self, env: &Environment) -> Option<&Result<Resolution, CapsError>> {
        self.entries.get(&env.canonical_bytes())
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of distinct environments seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompilerId, LanguageStandard, environment_from_profile};

    fn clang() -> Environment {
        Environment::new()
            .define_flag("__clang__")
            .define("__clang_major__", 10)
            .define("__clang_minor__", 0)
            .define("__clang_patchlevel__", 0)
            .with_standard(LanguageStandard::Cxx14)
            .with_probe("cxx_constexpr")
    }

    #[test]
    fn second_lookup_hits() {
        let mut cache = ResolutionCache::new();
        let first = cache.detect(&clang()).expect("resolve");
        let second = cache.detect(&clang()).expect("resolve");
        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn errors_are_cached() {
        let mut cache = ResolutionCache::new();
        let env = Environment::new();
        assert!(cache.detect(&env).is_err());
        assert!(cache.detect(&env).is_err());
        assert_eq!(cache.hits(), 1);
        assert!(matches!(
            cache.peek(&env),
            Some(Err(CapsError::UnsupportedToolchain { identity: None }))
        ));
    }

    #[test]
    fn distinct_environments_miss() {
        let mut cache = ResolutionCache::new();
        let base = clang();
        let probed = clang().with_probe("cxx_nullptr");
        let a = cache.detect(&base).expect("resolve");
        let b = cache.detect(&probed).expect("resolve");
        assert_eq!(a.identity, CompilerId::Clang);
        assert_ne!(a.features, b.features);
        assert_eq!(cache.misses(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn embedded_separators_get_their_own_entry() {
        let gcc = Environment::new()
            .define("__GNUC__", 4)
            .define("__GNUC_MINOR__", 9);
        let folded =
            environment_from_profile("[macros]\n__GNUC_MINOR__ = \"9\\n__GNUC__\\u00004\"")
                .expect("profile");

        let mut cache = ResolutionCache::new();
        assert_eq!(cache.detect(&gcc).expect("resolve").identity, CompilerId::Gnu);
        assert_eq!(cache.detect(&folded), detect(&folded));
        assert_eq!(
            cache.detect(&folded),
            Err(CapsError::UnsupportedToolchain { identity: None })
        );
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.len(), 2);
    }
}
