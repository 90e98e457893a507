//! Error taxonomy for the map pipeline.
//!
//! Three classes with different recovery rules:
//!
//! - [`FormatError`] is fatal to loading the file it occurred in and is never
//!   recovered by guessing. It carries enough context (file, line or byte
//!   offset) to point at the offending record.
//! - [`ResolutionError`] is recoverable: the offending instance or texture
//!   reference is dropped, a diagnostic is recorded, and scene construction
//!   continues.
//! - [`ResourceError`] wraps asset-fetch failures and aborts the whole scene
//!   load. There is no partial-scene fallback.

use thiserror::Error;

/// A malformed record in one of the map file formats.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{file}:{line}: expected {expected} fields in '{section}' record, found {found}")]
    FieldCount {
        file: String,
        line: usize,
        section: String,
        expected: &'static str,
        found: usize,
    },
    #[error("{file}:{line}: unparseable number '{value}'")]
    Number {
        file: String,
        line: usize,
        value: String,
    },
    #[error("{file}: buffer truncated at offset {offset:#x} (need {needed} bytes)")]
    Truncated {
        file: String,
        offset: usize,
        needed: usize,
    },
    #[error("{file}: data offset {found:#x} does not match expected {expected:#x}")]
    BadOffset {
        file: String,
        expected: u32,
        found: u32,
    },
}

/// A reference that could not be resolved during scene construction.
///
/// These never abort a load; the scene builder drops the offender, logs it,
/// and keeps the error in [`crate::scene::Diagnostics`].
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    #[error("no definition for placed model '{0}'")]
    UnknownModel(String),
    #[error("no definition for placed object id {0}")]
    UnknownId(i32),
    #[error("texture '{0}' not found in any loaded dictionary")]
    MissingTexture(String),
    #[error("texture '{0}' has unsupported {1}-bit depth")]
    UnsupportedDepth(String, u32),
}

/// A failed asset fetch. Fatal to the scene load that issued it.
#[derive(Debug, Error)]
#[error("failed to fetch '{path}': {source}")]
pub struct ResourceError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}
