//! # Environment Module
//!
//! The read-only input of a resolution: the predefined symbols a toolchain
//! exposes, plus the answers to its capability probes.
//!
//! - Names map to their textual replacement (`__GNUC__` → `"9"`)
//! - Numeric reads follow preprocessor rules: undefined or non-numeric is 0
//! - Probes model `__has_feature(name)` answers
//! - Storage is `BTreeMap`/`BTreeSet`, so iteration and fingerprints are
//!   deterministic

use crate::primitives::{
    CPLUSPLUS_MACRO, FLAG_VALUE, MAX_MACRO_COUNT, MAX_MACRO_NAME_LENGTH, MAX_MACRO_VALUE_LENGTH,
    MAX_PROBE_COUNT,
};
use crate::{EnvironmentError, LanguageStandard};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Predefined symbols and probe answers of one compilation context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Environment {
    macros: BTreeMap<String, String>,
    probes: BTreeSet<String>,
}

impl Environment {
    /// Create an empty environment (matches no identity).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Builder ----
    //
    // The builder methods are unchecked and meant for code and tests that
    // construct known environments. External input goes through `insert`.

    /// Define `name` with the given replacement text.
    #[must_use]
    pub fn define(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.macros.insert(name.into(), value.to_string());
        self
    }

    /// Define `name` as `1`.
    #[must_use]
    pub fn define_flag(self, name: impl Into<String>) -> Self {
        self.define(name, FLAG_VALUE)
    }

    /// Remove a definition.
    #[must_use]
    pub fn undefine(mut self, name: &str) -> Self {
        self.macros.remove(name);
        self
    }

    /// Set `__cplusplus` to the given standard level.
    #[must_use]
    pub fn with_standard(self, standard: LanguageStandard) -> Self {
        self.define(CPLUSPLUS_MACRO, format!("{}L", standard.cplusplus()))
    }

    /// Record that the capability probe answers true for `name`.
    #[must_use]
    pub fn with_probe(mut self, name: impl Into<String>) -> Self {
        self.probes.insert(name.into());
        self
    }

    // ---- Validated mutation ----

    /// Insert a definition, enforcing name syntax and input limits.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), EnvironmentError> {
        let name = name.into();
        let value = value.into();

        validate_identifier(&name, "macro name")?;
        if value.len() > MAX_MACRO_VALUE_LENGTH {
            return Err(EnvironmentError::LimitExceeded {
                what: "macro value length",
                limit: MAX_MACRO_VALUE_LENGTH,
            });
        }
        if !self.macros.contains_key(&name) && self.macros.len() >= MAX_MACRO_COUNT {
            return Err(EnvironmentError::LimitExceeded {
                what: "macro count",
                limit: MAX_MACRO_COUNT,
            });
        }

        self.macros.insert(name, value);
        Ok(())
    }

    /// Remove a definition if present.
    pub fn remove(&mut self, name: &str) {
        self.macros.remove(name);
    }

    /// Insert a probe name, enforcing name syntax and input limits.
    pub fn insert_probe(&mut self, name: impl Into<String>) -> Result<(), EnvironmentError> {
        let name = name.into();
        validate_identifier(&name, "probe name")?;
        if !self.probes.contains(&name) && self.probes.len() >= MAX_PROBE_COUNT {
            return Err(EnvironmentError::LimitExceeded {
                what: "probe count",
                limit: MAX_PROBE_COUNT,
            });
        }
        self.probes.insert(name);
        Ok(())
    }

    /// Apply a `NAME` or `NAME=VALUE` assignment, as given to `-D`.
    pub fn insert_assignment(&mut self, assignment: &str) -> Result<(), EnvironmentError> {
        match assignment.split_once('=') {
            Some((name, value)) => self.insert(name.trim(), value.trim()),
            None => self.insert(assignment.trim(), FLAG_VALUE),
        }
    }

    /// Set `__cplusplus` to the given standard level (validated path).
    pub fn set_standard(&mut self, standard: LanguageStandard) {
        self.macros.insert(
            CPLUSPLUS_MACRO.to_string(),
            format!("{}L", standard.cplusplus()),
        );
    }

    // ---- Queries ----

    /// `defined(name)`.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Replacement text of `name`, if defined.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.macros.get(name).map(String::as_str)
    }

    /// Integer value of `name`, if defined and numeric.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(parse_integer_literal)
    }

    /// Integer value of `name` as `#if` sees it: 0 unless defined and numeric.
    #[must_use]
    pub fn number_or_zero(&self, name: &str) -> i64 {
        self.number(name).unwrap_or(0)
    }

    /// Non-negative integer value of `name`, for version decoding.
    #[must_use]
    pub fn unsigned(&self, name: &str) -> Option<u64> {
        self.number(name).and_then(|n| u64::try_from(n).ok())
    }

    /// Answer of the capability probe for `name`.
    #[must_use]
    pub fn probe(&self, name: &str) -> bool {
        self.probes.contains(name)
    }

    /// Numeric value of `__cplusplus` (0 outside C++).
    #[must_use]
    pub fn cplusplus(&self) -> i64 {
        self.number_or_zero(CPLUSPLUS_MACRO)
    }

    /// Iterate definitions in name order.
    pub fn macros(&self) -> impl Iterator<Item = (&str, &str)> {
        self.macros.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate probe names in order.
    pub fn probes(&self) -> impl Iterator<Item = &str> {
        self.probes.iter().map(String::as_str)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// True if nothing is defined and no probe answers true.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty() && self.probes.is_empty()
    }

    // ---- Ingestion ----

    /// Parse the predefined-macro dump of a compiler (`-dM -E` output).
    ///
    /// Accepted lines:
    /// - `#define NAME VALUE` / `#define NAME` (object-like)
    /// - `#define NAME(args) body` (function-like, skipped)
    /// - `#undef NAME`
    /// - blank lines, `//` comments, single-line `/* */` comments
    ///
    /// # Errors
    /// Returns `EnvironmentError::InvalidDefinition` with the 1-based line
    /// number for anything else, and `LimitExceeded` past the input limits.
    pub fn from_predefined_macros(text: &str) -> Result<Self, EnvironmentError> {
        let mut env = Self::new();
        for (index, raw) in text.lines().enumerate() {
            env.apply_directive(index + 1, raw)?;
        }
        Ok(env)
    }

    fn apply_directive(&mut self, line: usize, raw: &str) -> Result<(), EnvironmentError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.starts_with("//")
            || (trimmed.starts_with("/*") && trimmed.ends_with("*/"))
        {
            return Ok(());
        }

        let invalid = |reason: &str| EnvironmentError::InvalidDefinition {
            line,
            reason: reason.to_string(),
        };

        let directive = trimmed
            .strip_prefix('#')
            .ok_or_else(|| invalid("expected a preprocessor directive"))?
            .trim_start();

        if let Some(rest) = directive.strip_prefix("define") {
            if !rest.starts_with([' ', '\t']) {
                return Err(invalid("expected whitespace after #define"));
            }
            let rest = rest.trim_start();
            let name_end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let (name, body) = rest.split_at(name_end);

            if name.is_empty() {
                return Err(invalid("missing macro name"));
            }
            if body.starts_with('(') {
                // Function-like macros carry no identification data.
                return Ok(());
            }
            if !body.is_empty() && !body.starts_with([' ', '\t']) {
                return Err(invalid("malformed macro name"));
            }

            self.insert(name, body.trim()).map_err(|e| match e {
                EnvironmentError::InvalidDefinition { reason, .. } => {
                    EnvironmentError::InvalidDefinition { line, reason }
                }
                other => other,
            })
        } else if let Some(rest) = directive.strip_prefix("undef") {
            if !rest.starts_with([' ', '\t']) {
                return Err(invalid("expected whitespace after #undef"));
            }
            let name = rest.trim();
            if name.is_empty() {
                return Err(invalid("missing macro name"));
            }
            validate_identifier(name, "macro name").map_err(|e| match e {
                EnvironmentError::InvalidDefinition { reason, .. } => {
                    EnvironmentError::InvalidDefinition { line, reason }
                }
                other => other,
            })?;
            self.remove(name);
            Ok(())
        } else {
            Err(invalid("unsupported directive"))
        }
    }

    // ---- Fingerprinting ----

    /// Canonical byte encoding: sorted definitions, then sorted probes.
    ///
    /// Every count and string is prefixed with its length (`u64`, little
    /// endian), so two environments share an encoding only if they are equal.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        fn push_len(out: &mut Vec<u8>, len: usize) {
            out.extend_from_slice(&(len as u64).to_le_bytes());
        }
        fn push_str(out: &mut Vec<u8>, s: &str) {
            push_len(out, s.len());
            out.extend_from_slice(s.as_bytes());
        }

        let mut out = Vec::new();
        push_len(&mut out, self.macros.len());
        for (name, value) in &self.macros {
            push_str(&mut out, name);
            push_str(&mut out, value);
        }
        push_len(&mut out, self.probes.len());
        for probe in &self.probes {
            push_str(&mut out, probe);
        }
        out
    }

    /// Deterministic 64-bit fingerprint (FNV-1a over `canonical_bytes`).
    ///
    /// Stable across runs and platforms; not collision resistant.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        self.canonical_bytes()
            .iter()
            .fold(FNV_OFFSET, |hash, byte| {
                (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
            })
    }

    /// BLAKE3 hex digest of `canonical_bytes` (64 characters).
    ///
    /// Only available with the `crypto-hash` feature enabled.
    #[cfg(feature = "crypto-hash")]
    #[must_use]
    pub fn blake3_digest(&self) -> String {
        blake3::hash(&self.canonical_bytes()).to_hex().to_string()
    }
}

/// Check that `name` is a C identifier within the name length limit.
pub(crate) fn validate_identifier(name: &str, what: &str) -> Result<(), EnvironmentError> {
    if name.len() > MAX_MACRO_NAME_LENGTH {
        return Err(EnvironmentError::LimitExceeded {
            what: "name length",
            limit: MAX_MACRO_NAME_LENGTH,
        });
    }
    if !is_identifier(name) {
        return Err(EnvironmentError::InvalidDefinition {
            line: 0,
            reason: format!("invalid {}: '{}'", what, name),
        });
    }
    Ok(())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse a C integer literal as the preprocessor would.
///
/// Handles decimal, `0x` hexadecimal, `0b` binary and leading-zero octal
/// forms, `u`/`l`/`ll` suffixes in any case, a leading sign, and redundant
/// parentheses (`(1)`). Returns `None` for anything else.
#[must_use]
pub fn parse_integer_literal(text: &str) -> Option<i64> {
    let mut s = text.trim();
    while let Some(inner) = s.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        s = inner.trim();
    }

    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, s[1..].trim_start()),
        Some(b'+') => (false, s[1..].trim_start()),
        _ => (false, s),
    };

    let digits = s.trim_end_matches(['u', 'U', 'l', 'L']);
    if digits.is_empty() || s.len() - digits.len() > 3 {
        return None;
    }

    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(body, radix).ok()?;
    let value = i64::try_from(magnitude).ok()?;
    Some(if negative { -value } else { value })
}

// =============================================================================
// TESTS
// =============================================================================
