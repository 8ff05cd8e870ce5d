//! Error type for descriptor operations.
//!
//! The core either returns a value or fails synchronously with one of
//! these; nothing is swallowed and nothing retries. "No capability found"
//! is *not* an error — repositories signal it with `None` — but a terminal
//! absence surfaces one layer up as [`ReflectError::Resolution`].

use tyr_common::OpaqueToken;

use crate::types::DescId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectError {
    /// An opaque (symbol) property key reached an operation that needs a
    /// textual key form, e.g. a mapped record with a non-empty prefix or
    /// suffix.
    MalformedKey { key: OpaqueToken },
    /// `instantiate` was handed a descriptor that is not a generic
    /// function.
    NotGeneric { descriptor: DescId },
    /// `mapped_record` was handed a source descriptor that is not a
    /// record.
    NotRecord { descriptor: DescId },
    /// `instantiate` received the wrong number of type arguments.
    ArityMismatch { expected: u8, actual: usize },
    /// A dependency lookup exhausted every repository. Carries the
    /// requested descriptor and the lookup key, if one was supplied.
    Resolution {
        descriptor: DescId,
        key: Option<OpaqueToken>,
    },
}

impl std::fmt::Display for ReflectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReflectError::MalformedKey { key } => {
                write!(f, "property key {key} has no textual form to surround")
            }
            ReflectError::NotGeneric { descriptor } => {
                write!(f, "descriptor {descriptor:?} is not a generic function")
            }
            ReflectError::NotRecord { descriptor } => {
                write!(f, "descriptor {descriptor:?} is not a record")
            }
            ReflectError::ArityMismatch { expected, actual } => {
                write!(
                    f,
                    "generic function expects {expected} type argument(s), got {actual}"
                )
            }
            ReflectError::Resolution { descriptor, key } => match key {
                Some(key) => write!(
                    f,
                    "could not resolve dependency: {descriptor:?} (key {key})"
                ),
                None => write!(f, "could not resolve dependency: {descriptor:?}"),
            },
        }
    }
}

impl std::error::Error for ReflectError {}
