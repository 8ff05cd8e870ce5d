//! Common types and utilities for the tyr runtime reflection workspace.
//!
//! This crate provides foundational types used across all tyr crates:
//! - String interning (`Atom`, `StringInterner`)
//! - Opaque unique tokens (`OpaqueToken`) for brands and lookup keys
//! - Total-order float wrapper (`OrderedFloat`) for number literals

// String interning for key and literal deduplication
pub mod interner;
pub use interner::{Atom, StringInterner};

// Opaque tokens - unique by allocation, compared by value
pub mod token;
pub use token::OpaqueToken;

// Total-order f64 wrapper so number literals can be hashed and interned
pub mod ordered_float;
pub use ordered_float::OrderedFloat;
