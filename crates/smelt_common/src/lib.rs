//! Shared foundational types used across the smelt addon pipeline.
//!
//! This crate provides content hashing for document versioning and parsing of
//! comma-separated name lists as accepted by the CLI and plugin options.

#![warn(missing_docs)]

pub mod hash;
pub mod names;

pub use hash::ContentHash;
pub use names::{join_names, split_names, WILDCARD_TARGET};
