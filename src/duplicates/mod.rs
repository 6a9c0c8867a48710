//! Duplicate candidate module.
//!
//! This module provides functionality for:
//! - Size-based candidate grouping ([`SizeBuckets`], filled by the indexer)
//! - Duplicate sets ([`DuplicateSet`], the rule engine's input)
//! - Content verification between the two ([`ContentVerifier`])

pub mod groups;
pub mod verify;

pub use groups::{DuplicateSet, SizeBuckets};
pub use verify::{Blake3Verifier, ContentVerifier};
