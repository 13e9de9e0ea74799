//! # Formats
//!
//! External input formats that produce an [`Environment`](crate::Environment).
//!
//! The predefined-macro dump parser lives on `Environment` itself; this module
//! holds the structured formats. File I/O stays in the app layer.

pub mod profile;

pub use profile::{MacroValue, Profile, environment_from_profile};
