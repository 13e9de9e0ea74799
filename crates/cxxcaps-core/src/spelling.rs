//! # Portable Spellings
//!
//! Maps a [`Resolution`] to the spelling a portability header uses for each
//! capability: the standard keyword when the flag is set, a vendor extension
//! or an empty expansion otherwise.
//!
//! [`render_header`] emits the complete header text.

use crate::environment::is_identifier;
use crate::primitives::MAX_PREFIX_LENGTH;
use crate::{
    ALL_COMPILERS, ALL_FEATURES, CompilerId, EnvironmentError, Feature, Resolution,
    VersionComponents,
};
use serde::Serialize;

// =============================================================================
// SPELLINGS
// =============================================================================

/// Expansion of one portability macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Body {
    /// Expands to this text (possibly empty).
    Text(&'static str),
    /// Template-based assertion for toolchains without `static_assert`.
    StaticAssertFallback,
    /// Left undefined; using the macro is a compile error.
    Undefined,
}

/// One portability macro, without its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spelling {
    /// Macro name after the prefix (`CONSTEXPR`, `ALIGNAS`, ...).
    pub name: &'static str,
    /// Parameter list of function-like macros (`X`, `X, MSG`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'static str>,
    pub body: Body,
}

impl Spelling {
    const fn object(name: &'static str, body: Body) -> Self {
        Self {
            name,
            params: None,
            body,
        }
    }

    const fn function(name: &'static str, params: &'static str, body: Body) -> Self {
        Self {
            name,
            params: Some(params),
            body,
        }
    }
}

/// The full set of portability macros for one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spellings {
    entries: Vec<Spelling>,
}

impl Spellings {
    /// Select spellings from the resolved flags and identity.
    #[must_use]
    pub fn for_resolution(resolution: &Resolution) -> Self {
        let id = resolution.identity;
        let has = |feature: Feature| resolution.supports(feature);
        let gnu_like = matches!(
            id,
            CompilerId::Gnu | CompilerId::Clang | CompilerId::AppleClang
        );
        let msvc = id == CompilerId::Msvc;

        let keyword_or_empty = |feature: Feature, keyword: &'static str| {
            if has(feature) {
                Body::Text(keyword)
            } else {
                Body::Text("")
            }
        };

        let mut entries = vec![
            Spelling::object("CONSTEXPR", keyword_or_empty(Feature::Constexpr, "constexpr")),
            Spelling::object(
                "DELETED_FUNCTION",
                keyword_or_empty(Feature::DeletedFunctions, "= delete"),
            ),
            Spelling::object("FINAL", keyword_or_empty(Feature::Final, "final")),
            Spelling::object("NOEXCEPT", keyword_or_empty(Feature::Noexcept, "noexcept")),
            Spelling::function(
                "NOEXCEPT_EXPR",
                "X",
                keyword_or_empty(Feature::Noexcept, "noexcept(X)"),
            ),
            Spelling::object("OVERRIDE", keyword_or_empty(Feature::Override, "override")),
        ];

        let alignas = if has(Feature::Alignas) {
            Body::Text("alignas(X)")
        } else if gnu_like {
            Body::Text("__attribute__ ((__aligned__(X)))")
        } else if msvc {
            Body::Text("__declspec(align(X))")
        } else {
            Body::Text("")
        };
        entries.push(Spelling::function("ALIGNAS", "X", alignas));

        let alignof = if has(Feature::Alignof) {
            Body::Text("alignof(X)")
        } else if gnu_like {
            Body::Text("__alignof__(X)")
        } else if msvc {
            Body::Text("__alignof(X)")
        } else {
            Body::Undefined
        };
        entries.push(Spelling::function("ALIGNOF", "X", alignof));

        let nullptr = if has(Feature::Nullptr) {
            Body::Text("nullptr")
        } else if id == CompilerId::Gnu {
            Body::Text("__null")
        } else {
            Body::Text("0")
        };
        entries.push(Spelling::object("NULLPTR", nullptr));

        if has(Feature::StaticAssert) {
            entries.push(Spelling::function(
                "STATIC_ASSERT",
                "X",
                Body::Text("static_assert(X, #X)"),
            ));
            entries.push(Spelling::function(
                "STATIC_ASSERT_MSG",
                "X, MSG",
                Body::Text("static_assert(X, MSG)"),
            ));
        } else {
            entries.push(Spelling::function("STATIC_ASSERT", "X", Body::StaticAssertFallback));
            entries.push(Spelling::function(
                "STATIC_ASSERT_MSG",
                "X, MSG",
                Body::StaticAssertFallback,
            ));
        }

        // AppleClang is not offered the GNU attribute here.
        let (deprecated, deprecated_msg) = if has(Feature::AttributeDeprecated) {
            ("[[deprecated]]", "[[deprecated(MSG)]]")
        } else if matches!(id, CompilerId::Gnu | CompilerId::Clang) {
            (
                "__attribute__((__deprecated__))",
                "__attribute__((__deprecated__(MSG)))",
            )
        } else if msvc {
            ("__declspec(deprecated)", "__declspec(deprecated(MSG))")
        } else {
            ("", "")
        };
        entries.push(Spelling::object("DEPRECATED", Body::Text(deprecated)));
        entries.push(Spelling::function("DEPRECATED_MSG", "MSG", Body::Text(deprecated_msg)));

        let thread_local = if has(Feature::ThreadLocal) {
            Body::Text("thread_local")
        } else if gnu_like {
            Body::Text("__thread")
        } else if msvc {
            Body::Text("__declspec(thread)")
        } else {
            Body::Undefined
        };
        entries.push(Spelling::object("THREAD_LOCAL", thread_local));

        Self { entries }
    }

    /// Spelling of the macro `name` (without prefix).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Spelling> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// All spellings in header order.
    pub fn iter(&self) -> impl Iterator<Item = &Spelling> {
        self.entries.iter()
    }

    fn needs_static_assert_fallback(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.body == Body::StaticAssertFallback)
    }
}

// =============================================================================
// HEADER RENDERING
// =============================================================================

/// First and last spelling of the block a consumer can predefine.
const OVERRIDABLE_FIRST: &str = "DEPRECATED";
const OVERRIDABLE_LAST: &str = "DEPRECATED_MSG";

/// Check that `prefix` can start a macro name.
pub fn validate_prefix(prefix: &str) -> Result<(), EnvironmentError> {
    if prefix.is_empty() || prefix.len() > MAX_PREFIX_LENGTH || !is_identifier(prefix) {
        return Err(EnvironmentError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Render a self-contained portability header for `resolution`.
///
/// # Errors
/// `EnvironmentError::InvalidPrefix` if `prefix` is not a C identifier of at
/// most `MAX_PREFIX_LENGTH` bytes.
pub fn render_header(resolution: &Resolution, prefix: &str) -> Result<String, EnvironmentError> {
    validate_prefix(prefix)?;
    let p = prefix;
    let spellings = Spellings::for_resolution(resolution);

    let mut out = String::new();
    out.push_str("// This is a generated file. Do not edit!\n\n");
    out.push_str(&format!("#ifndef {p}_COMPILER_DETECTION_H\n"));
    out.push_str(&format!("#define {p}_COMPILER_DETECTION_H\n\n"));
    out.push_str("#ifdef __cplusplus\n");

    for id in ALL_COMPILERS {
        let on = u8::from(id == resolution.identity);
        out.push_str(&format!("#define {p}_COMPILER_IS_{} {on}\n", id.name()));
    }
    out.push('\n');

    push_version(&mut out, &format!("{p}_COMPILER_VERSION"), &resolution.version);
    if let Some(simulated) = &resolution.simulated {
        out.push_str(&format!("#define {p}_SIMULATE_ID \"{}\"\n", simulated.identity));
        push_version(&mut out, &format!("{p}_SIMULATE_VERSION"), &simulated.version);
    }
    out.push('\n');

    for feature in ALL_FEATURES {
        let on = u8::from(resolution.supports(feature));
        out.push_str(&format!(
            "#define {p}_COMPILER_CXX_{} {on}\n",
            feature.macro_suffix()
        ));
    }
    out.push('\n');

    if spellings.needs_static_assert_fallback() {
        out.push_str(&format!(
            "#define {p}_STATIC_ASSERT_JOIN(X, Y) {p}_STATIC_ASSERT_JOIN_IMPL(X, Y)\n"
        ));
        out.push_str(&format!("#define {p}_STATIC_ASSERT_JOIN_IMPL(X, Y) X##Y\n"));
        out.push_str(&format!("template<bool> struct {p}StaticAssert;\n"));
        out.push_str(&format!("template<> struct {p}StaticAssert<true>{{}};\n"));
    }

    for spelling in spellings.iter() {
        // A consumer may supply its own deprecation spelling.
        if spelling.name == OVERRIDABLE_FIRST {
            out.push_str(&format!("#ifndef {p}_{OVERRIDABLE_FIRST}\n"));
        }

        let head = match spelling.params {
            Some(params) => format!("{p}_{}({params})", spelling.name),
            None => format!("{p}_{}", spelling.name),
        };
        match spelling.body {
            Body::Text("") => out.push_str(&format!("#define {head}\n")),
            Body::Text(text) => out.push_str(&format!("#define {head} {text}\n")),
            Body::StaticAssertFallback => out.push_str(&format!(
                "#define {head} enum {{ {p}_STATIC_ASSERT_JOIN({p}StaticAssertEnum, __LINE__) = sizeof({p}StaticAssert<X>) }}\n"
            )),
            Body::Undefined => out.push_str(&format!(
                "// {p}_{} not defined for this configuration.\n",
                spelling.name
            )),
        }

        if spelling.name == OVERRIDABLE_LAST {
            out.push_str(&format!("#endif // {p}_{OVERRIDABLE_FIRST}\n"));
        }
    }

    out.push_str("\n#endif // __cplusplus\n");
    out.push_str(&format!("\n#endif // {p}_COMPILER_DETECTION_H\n"));
    Ok(out)
}

fn push_version(out: &mut String, stem: &str, version: &VersionComponents) {
    let parts = [
        ("MAJOR", version.major),
        ("MINOR", version.minor),
        ("PATCH", version.patch),
        ("TWEAK", version.tweak),
    ];
    for (label, value) in parts {
        if let Some(value) = value {
            out.push_str(&format!("#define {stem}_{label} {value}\n"));
        }
    }
}
