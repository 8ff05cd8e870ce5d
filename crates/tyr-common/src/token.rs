//! Opaque unique tokens.
//!
//! A token carries no meaning beyond its uniqueness: two tokens are equal
//! only if one was copied from the other. Brands use them to make
//! structurally identical descriptors non-interchangeable; dependency
//! lookup uses them to distinguish multiple providers of one descriptor.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(0);

/// A process-unique token, optionally labelled for diagnostics. The label
/// never participates in equality or hashing.
#[derive(Debug, Clone, Copy)]
pub struct OpaqueToken {
    id: u64,
    label: Option<&'static str>,
}

impl OpaqueToken {
    /// Allocate a fresh token, unique for the process lifetime.
    pub fn new() -> Self {
        Self {
            id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            label: None,
        }
    }

    /// Allocate a fresh labelled token.
    pub fn labelled(label: &'static str) -> Self {
        Self {
            id: NEXT_TOKEN.fetch_add(1, Ordering::Relaxed),
            label: Some(label),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> Option<&'static str> {
        self.label
    }
}

impl Default for OpaqueToken {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for OpaqueToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OpaqueToken {}

impl PartialOrd for OpaqueToken {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpaqueToken {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::hash::Hash for OpaqueToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for OpaqueToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.label {
            Some(label) => write!(f, "{label}#{}", self.id),
            None => write!(f, "#{}", self.id),
        }
    }
}
