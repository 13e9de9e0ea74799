//! # Profile Format
//!
//! TOML description of a compilation environment, for toolchains that are not
//! installed on the machine running the resolver.
//!
//! ```toml
//! standard = "c++14"
//! probes = ["cxx_constexpr", "cxx_nullptr"]
//!
//! [macros]
//! __clang__ = 1
//! __clang_major__ = 10
//! __VERSION__ = "\"Clang 10.0.0\""
//! ```
//!
//! `standard` is applied after `[macros]` and overrides any `__cplusplus`
//! given there.

use crate::{Environment, EnvironmentError, LanguageStandard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum accepted profile size in bytes.
pub const MAX_PROFILE_SIZE: usize = 1024 * 1024;

/// A macro value as written in a profile: integer or replacement text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MacroValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for MacroValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroValue::Integer(n) => write!(f, "{}", n),
            MacroValue::Text(text) => f.write_str(text),
        }
    }
}

/// Parsed profile document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Language standard (`c++14`, `gnu++17`, `11`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    /// Names answered true by the capability probe.
    #[serde(default)]
    pub probes: Vec<String>,
    /// Predefined macros.
    #[serde(default)]
    pub macros: BTreeMap<String, MacroValue>,
}

impl Profile {
    /// Parse profile text.
    pub fn parse(text: &str) -> Result<Self, EnvironmentError> {
        if text.len() > MAX_PROFILE_SIZE {
            return Err(EnvironmentError::LimitExceeded {
                what: "profile size",
                limit: MAX_PROFILE_SIZE,
            });
        }
        toml::from_str(text).map_err(|e| EnvironmentError::Profile(e.to_string()))
    }

    /// Build the environment this profile describes.
    ///
    /// Names and limits are validated exactly as for any other input.
    pub fn to_environment(&self) -> Result<Environment, EnvironmentError> {
        let mut env = Environment::new();
        for (name, value) in &self.macros {
            env.insert(name.as_str(), value.to_string())?;
        }
        if let Some(standard) = &self.standard {
            env.set_standard(standard.parse::<LanguageStandard>()?);
        }
        for probe in &self.probes {
            env.insert_probe(probe.as_str())?;
        }
        Ok(env)
    }
}

/// Parse profile text straight into an environment.
pub fn environment_from_profile(text: &str) -> Result<Environment, EnvironmentError> {
    Profile::parse(text)?.to_environment()
}
